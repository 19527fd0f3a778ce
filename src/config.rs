use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::analysis::{DEFAULT_FFT_SIZE, DEFAULT_HOP_LENGTH};
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::export::OutputFormat;
use crate::notes::phrase::DEFAULT_MIN_NOTES;
use crate::notes::sample::DEFAULT_ROLLOFF_PERCENT;
use crate::segment::chunker::DEFAULT_GRID_SIZE;
use crate::segment::SegmentMethod;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(default)]
    pub phrase: PhraseConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default = "default_rolloff")]
    pub rolloff: f32,
}

#[derive(Debug, Deserialize)]
pub struct SegmentConfig {
    #[serde(default)]
    pub method: SegmentMethod,
    #[serde(default = "default_amp_threshold")]
    pub amp_threshold: f32,
    #[serde(default = "default_min_dur")]
    pub min_dur: f64,
    #[serde(default = "default_max_dur")]
    pub max_dur: f64,
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct PhraseConfig {
    #[serde(default = "default_min_phrase")]
    pub min_dur: f64,
    #[serde(default = "default_max_phrase")]
    pub max_dur: f64,
    #[serde(default = "default_max_silence")]
    pub max_silence: f64,
    #[serde(default = "default_min_notes")]
    pub min_notes: usize,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub max_samples: usize,
    #[serde(default)]
    pub save_clips: bool,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub jobs: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            hop_length: default_hop_length(),
            sample_rate: None,
            rolloff: default_rolloff(),
        }
    }
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            method: SegmentMethod::default(),
            amp_threshold: default_amp_threshold(),
            min_dur: default_min_dur(),
            max_dur: default_max_dur(),
            grid_size: default_grid_size(),
        }
    }
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            min_dur: default_min_phrase(),
            max_dur: default_max_phrase(),
            max_silence: default_max_silence(),
            min_notes: default_min_notes(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
            max_samples: 0,
            save_clips: false,
            overwrite: false,
            jobs: 0,
        }
    }
}

fn default_fft_size() -> usize { DEFAULT_FFT_SIZE }
fn default_hop_length() -> usize { DEFAULT_HOP_LENGTH }
fn default_rolloff() -> f32 { DEFAULT_ROLLOFF_PERCENT }
fn default_amp_threshold() -> f32 { -1.0 }
fn default_min_dur() -> f64 { 0.05 }
fn default_max_dur() -> f64 { 1.0 }
fn default_grid_size() -> usize { DEFAULT_GRID_SIZE }
fn default_min_phrase() -> f64 { 0.5 }
fn default_max_phrase() -> f64 { 5.0 }
fn default_max_silence() -> f64 { 0.25 }
fn default_min_notes() -> usize { DEFAULT_MIN_NOTES }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }

impl Config {
    /// Apply config values wherever the CLI is still at its default.
    pub fn merge_into(self, cli: &mut Cli) {
        if cli.fft == default_fft_size() { cli.fft = self.analysis.fft_size; }
        if cli.hop == default_hop_length() { cli.hop = self.analysis.hop_length; }
        if cli.sample_rate.is_none() { cli.sample_rate = self.analysis.sample_rate; }
        if cli.rolloff == default_rolloff() { cli.rolloff = self.analysis.rolloff; }

        if cli.method == SegmentMethod::default() { cli.method = self.segment.method; }
        if cli.amp == default_amp_threshold() { cli.amp = self.segment.amp_threshold; }
        if cli.min_dur == default_min_dur() { cli.min_dur = self.segment.min_dur; }
        if cli.max_dur == default_max_dur() { cli.max_dur = self.segment.max_dur; }
        if cli.grid == default_grid_size() { cli.grid = self.segment.grid_size; }

        if cli.min_phrase == default_min_phrase() { cli.min_phrase = self.phrase.min_dur; }
        if cli.max_phrase == default_max_phrase() { cli.max_phrase = self.phrase.max_dur; }
        if cli.max_silence == default_max_silence() { cli.max_silence = self.phrase.max_silence; }
        if cli.min_notes == default_min_notes() { cli.min_notes = self.phrase.min_notes; }

        if cli.output_dir == default_output_dir() { cli.output_dir = self.output.dir; }
        if cli.format == OutputFormat::default() { cli.format = self.output.format; }
        if cli.max_samples == 0 { cli.max_samples = self.output.max_samples; }
        if !cli.save_clips { cli.save_clips = self.output.save_clips; }
        if !cli.overwrite { cli.overwrite = self.output.overwrite; }
        if cli.jobs == 0 { cli.jobs = self.output.jobs; }
    }
}

/// Explicit `--config` path, or auto-detect phrasecut.toml / the user config.
pub fn find_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let local = PathBuf::from("phrasecut.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("phrasecut").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("phrasecut").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    })
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
