use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Error, Result};

/// Mono audio at a fixed sample rate.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Scale so the peak absolute amplitude is 1.0. Silent buffers are left untouched.
    pub fn normalize(&mut self) {
        normalize_peak(&mut self.samples);
    }
}

pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if peak > 0.0 {
        for s in samples.iter_mut() {
            *s /= peak;
        }
    }
}

pub fn decode_audio(path: &Path) -> Result<AudioBuffer> {
    let file = std::fs::File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|source| Error::Probe {
            path: path.to_path_buf(),
            source,
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTrack {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::UnknownSampleRate {
            path: path.to_path_buf(),
        })?;

    let decode_err = |source: symphonia::core::errors::Error| Error::Decode {
        path: path.to_path_buf(),
        source,
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_err)?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(decode_err(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(decode_err(e)),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        // Downmix to mono
        if channels == 1 {
            all_samples.extend_from_slice(samples);
        } else {
            for frame_samples in samples.chunks(channels) {
                let mono: f32 = frame_samples.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        }
    }

    log::debug!(
        "Decoded {}: {} samples, {}Hz, {:.1}s",
        path.display(),
        all_samples.len(),
        sample_rate,
        all_samples.len() as f32 / sample_rate as f32
    );

    Ok(AudioBuffer {
        samples: all_samples,
        sample_rate,
    })
}
