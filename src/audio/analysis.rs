use rustfft::{num_complex::Complex, FftPlanner};

use super::features::Spectrogram;
use crate::error::{Error, Result};

pub const DEFAULT_FFT_SIZE: usize = 2048;
pub const DEFAULT_HOP_LENGTH: usize = 512;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalysisParams {
    pub fft_size: usize,
    pub hop_length: usize,
}

impl AnalysisParams {
    /// Frames produced for a buffer of `len` samples: `ceil(len / hop)`.
    pub fn frame_count(&self, len: usize) -> usize {
        if self.hop_length == 0 {
            return 0;
        }
        len.div_ceil(self.hop_length)
    }
}

/// Short-time Fourier magnitudes over centred, reflect-padded Hann frames.
///
/// Frame `i` is centred on sample `i * hop_length`.
pub fn stft(samples: &[f32], params: &AnalysisParams) -> Spectrogram {
    let fft_size = params.fft_size;
    if fft_size == 0 {
        return Spectrogram {
            frames: Vec::new(),
            fft_size,
            hop_length: params.hop_length,
        };
    }
    let num_frames = params.frame_count(samples.len());
    let half = fft_size / 2;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);
    let hann = hann_window(fft_size);

    let mut frames = Vec::with_capacity(num_frames);
    let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); fft_size];

    for frame_idx in 0..num_frames {
        let origin = (frame_idx * params.hop_length) as isize - half as isize;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let sample = reflect_index(origin + i as isize, samples.len())
                .map_or(0.0, |idx| samples[idx]);
            *slot = Complex::new(sample * hann[i], 0.0);
        }
        fft.process(&mut buffer);

        let magnitudes: Vec<f32> = buffer[..=half].iter().map(|c| c.norm()).collect();
        frames.push(magnitudes);
    }

    Spectrogram {
        frames,
        fft_size,
        hop_length: params.hop_length,
    }
}

/// Normalised loudness curve: per-frame RMS scaled to [0, 1] by min/max.
///
/// Returns [`Error::DegenerateSignal`] for empty or constant input.
pub fn energy_envelope(samples: &[f32], params: &AnalysisParams) -> Result<Vec<f32>> {
    let spectrogram = stft(samples, params);
    let raw = spectrogram.rms();

    let min = raw.iter().copied().fold(f32::INFINITY, f32::min);
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if raw.is_empty() || !range.is_finite() || range <= 0.0 {
        return Err(Error::DegenerateSignal);
    }

    log::debug!(
        "Envelope: {} frames (fft={}, hop={})",
        spectrogram.num_frames(),
        spectrogram.fft_size,
        spectrogram.hop_length
    );

    Ok(raw.into_iter().map(|v| (v - min) / range).collect())
}

/// Mirror an out-of-range index back into `0..len` without repeating the edge sample.
fn reflect_index(idx: isize, len: usize) -> Option<usize> {
    let len = len as isize;
    if len == 0 {
        return None;
    }
    let mirrored = if idx < 0 {
        -idx
    } else if idx >= len {
        2 * (len - 1) - idx
    } else {
        idx
    };
    if (0..len).contains(&mirrored) {
        Some(mirrored as usize)
    } else {
        None
    }
}

/// Periodic Hann window.
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()))
        .collect()
}
