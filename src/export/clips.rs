//! WAV export of detected samples and phrases.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::decode::normalize_peak;
use crate::error::{Error, Result};

/// Writes peak-normalised 16-bit mono clips into one directory.
pub struct ClipWriter {
    dir: PathBuf,
    overwrite: bool,
}

impl ClipWriter {
    pub fn new(dir: PathBuf, overwrite: bool) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, overwrite })
    }

    /// Write `samples` as `<dir>/<filename>`. Returns `false` when an existing
    /// file was kept.
    pub fn write(&self, filename: &str, samples: &[f32], sample_rate: u32) -> Result<bool> {
        let path = self.dir.join(filename);
        if !self.overwrite && path.is_file() {
            log::debug!("Keeping existing clip {}", path.display());
            return Ok(false);
        }

        let mut clip = samples.to_vec();
        normalize_peak(&mut clip);
        write_wav_file(&path, &clip, sample_rate)?;
        Ok(true)
    }
}

fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let wav_err = |source: hound::Error| Error::Wav {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_err)?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(value).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_normalised_clip() {
        let dir = tempdir().unwrap();
        let writer = ClipWriter::new(dir.path().join("samples"), false).unwrap();
        assert!(writer.write("finch 120.wav", &[0.0, 0.25, -0.5], 22050).unwrap());

        let mut reader = hound::WavReader::open(dir.path().join("samples/finch 120.wav")).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.spec().channels, 1);
        let values: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(values, vec![0, i16::MAX / 2, -i16::MAX]);
    }

    #[test]
    fn existing_clip_is_kept_without_overwrite() {
        let dir = tempdir().unwrap();
        let writer = ClipWriter::new(dir.path().to_path_buf(), false).unwrap();
        assert!(writer.write("a.wav", &[0.5; 10], 8000).unwrap());
        assert!(!writer.write("a.wav", &[0.5; 20], 8000).unwrap());
        let reader = hound::WavReader::open(dir.path().join("a.wav")).unwrap();
        assert_eq!(reader.len(), 10);

        let overwriting = ClipWriter::new(dir.path().to_path_buf(), true).unwrap();
        assert!(overwriting.write("a.wav", &[0.5; 20], 8000).unwrap());
        let reader = hound::WavReader::open(dir.path().join("a.wav")).unwrap();
        assert_eq!(reader.len(), 20);
    }
}
