pub mod chunker;
pub mod slicer;

use serde::Deserialize;

/// A contiguous run of envelope frames, `left..right`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    pub left: usize,
    pub right: usize,
}

impl Interval {
    pub fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }

    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    /// Sample-index range covered by this interval for the given hop length.
    pub fn sample_range(&self, hop_length: usize, buffer_len: usize) -> std::ops::Range<usize> {
        let start = (self.left * hop_length).min(buffer_len);
        let end = (self.right * hop_length).min(buffer_len);
        start..end.max(start)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SegmentMethod {
    /// Threshold crossings refined to local minima
    #[default]
    Threshold,
    /// Grid search over run-merge thresholds
    Optimal,
}

#[derive(Clone, Copy, Debug)]
pub struct SegmentParams {
    pub method: SegmentMethod,
    /// Negative means "derive from the envelope".
    pub amp_threshold: f32,
    pub min_frames: usize,
    pub max_frames: usize,
    pub grid_size: usize,
}

/// Split an envelope into active intervals with the configured method.
pub fn segment(envelope: &[f32], params: &SegmentParams) -> Vec<Interval> {
    let threshold = resolve_threshold(envelope, params.amp_threshold);
    log::debug!(
        "Segmenting {} frames with {:?} (threshold={:.4}, frames {}..={})",
        envelope.len(),
        params.method,
        threshold,
        params.min_frames,
        params.max_frames
    );

    match params.method {
        SegmentMethod::Threshold => {
            slicer::slice(envelope, threshold, params.min_frames, params.max_frames)
        }
        SegmentMethod::Optimal => {
            let active: Vec<bool> = envelope.iter().map(|&v| v >= threshold).collect();
            chunker::optimal_intervals(
                &active,
                params.min_frames,
                params.max_frames,
                params.grid_size,
            )
        }
    }
}

/// The explicit threshold when non-negative, else `min(1.5 * stdev, 0.5)`.
pub fn resolve_threshold(envelope: &[f32], amp_threshold: f32) -> f32 {
    if amp_threshold >= 0.0 {
        return amp_threshold;
    }
    let values: Vec<f64> = envelope.iter().map(|&v| v as f64).collect();
    (1.5 * crate::stats::std_dev(&values)).min(0.5) as f32
}

/// Whole frames elapsed after `seconds`: `floor(seconds * sr / hop)`.
pub fn seconds_to_frames(seconds: f64, sample_rate: u32, hop_length: usize) -> usize {
    if hop_length == 0 || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate as f64 / hop_length as f64).floor() as usize
}
