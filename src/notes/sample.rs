use serde::Serialize;

use super::pitch::{hz_to_note, split_note};
use crate::audio::analysis::{stft, AnalysisParams};
use crate::audio::decode::AudioBuffer;
use crate::segment::Interval;
use crate::stats::{round_to, weighted_mean};

pub const DEFAULT_ROLLOFF_PERCENT: f32 = 0.85;

/// One detected note-like event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub index: usize,
    pub parent: String,
    pub filename: String,
    /// Milliseconds from the start of the parent recording.
    pub start: i64,
    pub dur: i64,
    pub power: f64,
    pub hz: f64,
    pub note: String,
    pub octave: i32,
    #[serde(skip)]
    pub left: usize,
    #[serde(skip)]
    pub right: usize,
}

impl Sample {
    pub fn end(&self) -> i64 {
        self.start + self.dur
    }
}

/// Builds [`Sample`] records from envelope intervals of one recording.
pub struct SampleBuilder<'a> {
    parent: &'a str,
    audio: &'a AudioBuffer,
    params: AnalysisParams,
    roll_percent: f32,
}

impl<'a> SampleBuilder<'a> {
    pub fn new(
        parent: &'a str,
        audio: &'a AudioBuffer,
        params: AnalysisParams,
        roll_percent: f32,
    ) -> Self {
        Self {
            parent,
            audio,
            params,
            roll_percent,
        }
    }

    pub fn build_all(&self, intervals: &[Interval]) -> Vec<Sample> {
        intervals
            .iter()
            .enumerate()
            .map(|(index, interval)| self.build(index, *interval))
            .collect()
    }

    pub fn build(&self, index: usize, interval: Interval) -> Sample {
        let hop = self.params.hop_length;
        let total = self.audio.samples.len();
        let clip = &self.audio.samples[interval.sample_range(hop, total)];

        let spectrogram = stft(clip, &self.params);
        let energy: Vec<f64> = spectrogram.rms().into_iter().map(f64::from).collect();
        let rolloff: Vec<f64> = spectrogram
            .rolloff(self.audio.sample_rate, self.roll_percent)
            .into_iter()
            .map(f64::from)
            .collect();

        let power = round_to(weighted_mean(&energy), 2);
        let hz = round_to(weighted_mean(&rolloff), 2);
        let (note, octave) = split_note(&hz_to_note(hz).unwrap_or_default());

        let (start, dur) = clip_timing(
            interval.left * hop,
            interval.right * hop,
            total,
            self.audio.duration_secs(),
        );

        Sample {
            index,
            parent: self.parent.to_string(),
            filename: format!("{} {}.wav", self.parent, start),
            start,
            dur,
            power,
            hz,
            note,
            octave,
            left: interval.left,
            right: interval.right,
        }
    }
}

/// Start and duration in whole milliseconds.
///
/// Positions are first taken as fractions of the buffer rounded to five
/// decimals, so timings line up with existing sample catalogues.
pub fn clip_timing(start_sample: usize, end_sample: usize, total_samples: usize, duration_secs: f64) -> (i64, i64) {
    if total_samples == 0 {
        return (0, 0);
    }
    let start = round_to(start_sample as f64 / total_samples as f64, 5);
    let end = round_to(end_sample as f64 / total_samples as f64, 5);
    let duration_ms = duration_secs * 1000.0;

    let start_ms = (start * duration_ms).round() as i64;
    let dur_ms = ((end - start) * duration_ms).round() as i64;
    (start_ms, dur_ms)
}
