use clap::Parser;
use std::path::PathBuf;

use crate::export::OutputFormat;
use crate::segment::SegmentMethod;

#[derive(Parser, Debug)]
#[command(
    name = "phrasecut",
    about = "Extract note-like samples and phrases from field recordings"
)]
pub struct Cli {
    /// Input audio files or directories (WAV, MP3, FLAC, OGG)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the sample and phrase catalogues
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Catalogue format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Segmentation method
    #[arg(long, value_enum, default_value_t = SegmentMethod::Threshold)]
    pub method: SegmentMethod,

    /// Amplitude threshold on the normalised envelope (0.0-1.0), -1 to derive it per file
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub amp: f32,

    /// Minimum sample duration in seconds
    #[arg(long, default_value_t = 0.05)]
    pub min_dur: f64,

    /// Maximum sample duration in seconds
    #[arg(long, default_value_t = 1.0)]
    pub max_dur: f64,

    /// Minimum phrase duration in seconds
    #[arg(long, default_value_t = 0.5)]
    pub min_phrase: f64,

    /// Maximum phrase duration in seconds
    #[arg(long, default_value_t = 5.0)]
    pub max_phrase: f64,

    /// Maximum silence between samples of a phrase in seconds
    #[arg(long, default_value_t = 0.25)]
    pub max_silence: f64,

    /// Minimum number of samples per phrase
    #[arg(long, default_value_t = 2)]
    pub min_notes: usize,

    /// FFT window size in samples
    #[arg(long, default_value_t = 2048)]
    pub fft: usize,

    /// Hop length between analysis frames in samples
    #[arg(long, default_value_t = 512)]
    pub hop: usize,

    /// Spectral rolloff percentage used for the pitch estimate
    #[arg(long, default_value_t = 0.85)]
    pub rolloff: f32,

    /// Grid resolution for the optimal method
    #[arg(long, default_value_t = 10)]
    pub grid: usize,

    /// Resample input to this rate before analysis (default: keep native rate)
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Keep only the N loudest samples per file, 0 for all
    #[arg(long, default_value_t = 0)]
    pub max_samples: usize,

    /// Write a WAV clip for every sample and phrase
    #[arg(long)]
    pub save_clips: bool,

    /// Overwrite existing clips
    #[arg(long)]
    pub overwrite: bool,

    /// Worker threads, 0 for one per core
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Config file (default: ./phrasecut.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Reject analysis settings that cannot produce any frames.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fft == 0 {
            anyhow::bail!("FFT size must be greater than zero");
        }
        if self.hop == 0 {
            anyhow::bail!("Hop length must be greater than zero");
        }
        Ok(())
    }
}
