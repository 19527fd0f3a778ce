mod audio;
mod cli;
mod config;
mod error;
mod export;
mod notes;
mod pipeline;
mod segment;
mod stats;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use pipeline::ProcessOptions;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::find_config_path(cli.config.clone()) {
        match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg.merge_into(&mut cli);
            }
            Err(e) => log::warn!("{:#}", anyhow::Error::from(e)),
        }
    }

    cli.validate()?;

    let files = pipeline::collect_inputs(&cli.inputs);
    if files.is_empty() {
        anyhow::bail!("No audio files found in the given inputs");
    }

    log::info!("phrasecut - note and phrase extraction");
    log::info!("Inputs: {} audio files", files.len());
    log::info!("Output: {} ({:?})", cli.output_dir.display(), cli.format);
    log::info!(
        "Method: {:?}, threshold {}, samples {}-{}s, phrases {}-{}s",
        cli.method,
        if cli.amp < 0.0 { "auto".to_string() } else { cli.amp.to_string() },
        cli.min_dur,
        cli.max_dur,
        cli.min_phrase,
        cli.max_phrase
    );

    let options = ProcessOptions::from_cli(&cli);
    let batch = pipeline::run_batch(&files, &options, cli.jobs)?;

    for (path, err) in &batch.failures {
        log::warn!("Skipped {}: {}", path.display(), err);
    }

    let samples = batch.samples();
    let phrases = batch.phrases();
    export::write_catalogues(&cli.output_dir, cli.format, &samples, &phrases)
        .with_context(|| format!("Failed to write catalogues to {}", cli.output_dir.display()))?;

    if let Some(dir) = &options.clip_dir {
        log::info!("Wrote {} clips to {}", batch.clips_written(), dir.display());
    }
    log::info!(
        "Done! {} files processed, {} failed, {} samples, {} phrases",
        batch.reports.len(),
        batch.failures.len(),
        samples.len(),
        phrases.len()
    );

    Ok(())
}
