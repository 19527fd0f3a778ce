pub mod clips;
pub mod csv;
pub mod json;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::notes::phrase::Phrase;
use crate::notes::sample::Sample;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Write `samples.<ext>` and `phrases.<ext>` into `dir`, returning the paths written.
pub fn write_catalogues(
    dir: &Path,
    format: OutputFormat,
    samples: &[Sample],
    phrases: &[Phrase],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let samples_path = dir.join(format!("samples.{}", format.extension()));
    let phrases_path = dir.join(format!("phrases.{}", format.extension()));

    let (sample_rows, phrase_rows) = match format {
        OutputFormat::Csv => (
            self::csv::write_samples(&samples_path, samples)?,
            self::csv::write_phrases(&phrases_path, phrases)?,
        ),
        OutputFormat::Json => (
            json::write_records(&samples_path, samples)?,
            json::write_records(&phrases_path, phrases)?,
        ),
    };

    log::info!("Wrote {} rows to {}", sample_rows, samples_path.display());
    log::info!("Wrote {} rows to {}", phrase_rows, phrases_path.display());

    Ok(vec![samples_path, phrases_path])
}
