use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use super::decode::AudioBuffer;
use crate::error::{Error, Result};

/// Resample mono audio to `target_rate` using rubato. No-op when the rates match.
pub fn resample(buffer: AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if buffer.sample_rate == target_rate || buffer.samples.is_empty() {
        return Ok(AudioBuffer {
            samples: buffer.samples,
            sample_rate: target_rate,
        });
    }

    let from_rate = buffer.sample_rate;
    let fail = |message: String| Error::Resample {
        from: from_rate,
        to: target_rate,
        message,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = target_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0, // max relative ratio
        params,
        buffer.samples.len(),
        1, // mono
    )
    .map_err(|e| fail(e.to_string()))?;

    let input = vec![buffer.samples];
    let output = resampler
        .process(&input, None)
        .map_err(|e| fail(e.to_string()))?;

    log::debug!("Resampled {}Hz -> {}Hz", from_rate, target_rate);

    Ok(AudioBuffer {
        samples: output.into_iter().next().unwrap_or_default(),
        sample_rate: target_rate,
    })
}
