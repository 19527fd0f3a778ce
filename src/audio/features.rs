/// Magnitude spectrogram: one row of `fft_size / 2 + 1` bins per analysis frame.
#[derive(Clone, Debug)]
pub struct Spectrogram {
    pub frames: Vec<Vec<f32>>,
    pub fft_size: usize,
    pub hop_length: usize,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// RMS of each frame's magnitude spectrum: `sqrt(mean(|X_k|²))`.
    pub fn rms(&self) -> Vec<f32> {
        self.frames
            .iter()
            .map(|bins| {
                if bins.is_empty() {
                    return 0.0;
                }
                let power: f32 = bins.iter().map(|m| m * m).sum();
                (power / bins.len() as f32).sqrt()
            })
            .collect()
    }

    /// Per-frame rolloff frequency in Hz: the lowest bin frequency below which
    /// `roll_percent` of the frame's spectral magnitude is contained.
    pub fn rolloff(&self, sample_rate: u32, roll_percent: f32) -> Vec<f32> {
        let freq_resolution = sample_rate as f32 / self.fft_size as f32;

        self.frames
            .iter()
            .map(|bins| {
                let total: f32 = bins.iter().sum();
                let threshold = roll_percent * total;
                let mut cumulative = 0.0f32;
                for (k, &mag) in bins.iter().enumerate() {
                    cumulative += mag;
                    if cumulative >= threshold {
                        return k as f32 * freq_resolution;
                    }
                }
                // float drift can leave the sum just under the threshold
                bins.len().saturating_sub(1) as f32 * freq_resolution
            })
            .collect()
    }
}
