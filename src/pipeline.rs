//! Per-recording extraction and the parallel batch driver.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

use crate::audio::analysis::{energy_envelope, AnalysisParams};
use crate::audio::decode::{decode_audio, AudioBuffer};
use crate::audio::resample::resample;
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::export::clips::ClipWriter;
use crate::notes::phrase::{group_phrases, Phrase, PhraseParams};
use crate::notes::sample::{Sample, SampleBuilder};
use crate::segment::{segment, seconds_to_frames, Interval, SegmentMethod, SegmentParams};

pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a", "aac"];

/// Everything one file needs, resolved from CLI and config.
#[derive(Clone, Debug)]
pub struct ProcessOptions {
    pub analysis: AnalysisParams,
    pub sample_rate: Option<u32>,
    pub roll_percent: f32,
    pub method: SegmentMethod,
    pub amp_threshold: f32,
    /// Sample duration bounds in seconds.
    pub min_dur: f64,
    pub max_dur: f64,
    pub grid_size: usize,
    pub phrase: PhraseParams,
    /// Keep only the loudest N samples, 0 keeps all.
    pub max_samples: usize,
    /// `<output>/clips` when clip export is on.
    pub clip_dir: Option<PathBuf>,
    pub overwrite: bool,
}

impl ProcessOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            analysis: AnalysisParams {
                fft_size: cli.fft,
                hop_length: cli.hop,
            },
            sample_rate: cli.sample_rate,
            roll_percent: cli.rolloff,
            method: cli.method,
            amp_threshold: cli.amp,
            min_dur: cli.min_dur,
            max_dur: cli.max_dur,
            grid_size: cli.grid,
            phrase: PhraseParams::from_seconds(
                cli.min_phrase,
                cli.max_phrase,
                cli.max_silence,
                cli.min_notes,
            ),
            max_samples: cli.max_samples,
            clip_dir: cli.save_clips.then(|| cli.output_dir.join("clips")),
            overwrite: cli.overwrite,
        }
    }

    fn segment_params(&self, sample_rate: u32) -> SegmentParams {
        let hop = self.analysis.hop_length;
        SegmentParams {
            method: self.method,
            amp_threshold: self.amp_threshold,
            min_frames: seconds_to_frames(self.min_dur, sample_rate, hop),
            max_frames: seconds_to_frames(self.max_dur, sample_rate, hop),
            grid_size: self.grid_size,
        }
    }
}

/// Samples and phrases extracted from one recording.
#[derive(Debug, Default)]
pub struct FileReport {
    pub parent: String,
    pub samples: Vec<Sample>,
    pub phrases: Vec<Phrase>,
    pub clips_written: usize,
}

/// Outcome of a whole batch; per-file failures do not abort the run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub reports: Vec<FileReport>,
    pub failures: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    pub fn samples(&self) -> Vec<Sample> {
        self.reports
            .iter()
            .flat_map(|r| r.samples.iter().cloned())
            .collect()
    }

    pub fn phrases(&self) -> Vec<Phrase> {
        self.reports
            .iter()
            .flat_map(|r| r.phrases.iter().cloned())
            .collect()
    }

    pub fn clips_written(&self) -> usize {
        self.reports.iter().map(|r| r.clips_written).sum()
    }
}

/// Recording name used to label its samples: the file name up to the first '.'.
pub fn parent_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand inputs into audio files. Directories are walked recursively and
/// explicitly named files are taken as-is.
pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        log::warn!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            log::warn!("Input not found: {}", input.display());
        }
    }
    files
}

/// Segment an already decoded recording and group its samples into phrases.
///
/// Returns every sample; the loudest-N cap is applied by the caller after
/// grouping so phrases still see the full sequence.
pub fn analyze_buffer(
    parent: &str,
    audio: &AudioBuffer,
    opts: &ProcessOptions,
) -> Result<(Vec<Sample>, Vec<Phrase>)> {
    let envelope = match energy_envelope(&audio.samples, &opts.analysis) {
        Ok(envelope) => envelope,
        Err(Error::DegenerateSignal) => {
            log::debug!("{}: silent recording, nothing to extract", parent);
            return Ok((Vec::new(), Vec::new()));
        }
        Err(e) => return Err(e),
    };

    let intervals = segment(&envelope, &opts.segment_params(audio.sample_rate));
    let samples = SampleBuilder::new(parent, audio, opts.analysis, opts.roll_percent)
        .build_all(&intervals);
    let phrases = group_phrases(&samples, &opts.phrase);

    log::debug!(
        "{}: {} frames, {} samples, {} phrases",
        parent,
        envelope.len(),
        samples.len(),
        phrases.len()
    );
    Ok((samples, phrases))
}

/// Keep the `limit` loudest samples, loudest first. Zero keeps everything in order.
pub fn cap_loudest(mut samples: Vec<Sample>, limit: usize) -> Vec<Sample> {
    if limit == 0 || samples.len() <= limit {
        return samples;
    }
    samples.sort_by(|a, b| b.power.total_cmp(&a.power));
    samples.truncate(limit);
    samples
}

pub fn process_file(path: &Path, opts: &ProcessOptions) -> Result<FileReport> {
    let mut audio = decode_audio(path)?;
    if let Some(rate) = opts.sample_rate {
        audio = resample(audio, rate)?;
    }
    audio.normalize();

    let parent = parent_name(path);
    let (samples, phrases) = analyze_buffer(&parent, &audio, opts)?;
    let samples = cap_loudest(samples, opts.max_samples);

    let clips_written = match &opts.clip_dir {
        Some(dir) => write_clips(dir, opts, &audio, &samples, &phrases)?,
        None => 0,
    };

    Ok(FileReport {
        parent,
        samples,
        phrases,
        clips_written,
    })
}

fn write_clips(
    dir: &Path,
    opts: &ProcessOptions,
    audio: &AudioBuffer,
    samples: &[Sample],
    phrases: &[Phrase],
) -> Result<usize> {
    let hop = opts.analysis.hop_length;
    let total = audio.samples.len();
    let mut written = 0;

    let sample_writer = ClipWriter::new(dir.join("samples"), opts.overwrite)?;
    for sample in samples {
        let range = Interval::new(sample.left, sample.right).sample_range(hop, total);
        if sample_writer.write(&sample.filename, &audio.samples[range], audio.sample_rate)? {
            written += 1;
        }
    }

    let phrase_writer = ClipWriter::new(dir.join("phrases"), opts.overwrite)?;
    for phrase in phrases {
        let range = Interval::new(phrase.left, phrase.right).sample_range(hop, total);
        if phrase_writer.write(&phrase.filename, &audio.samples[range], audio.sample_rate)? {
            written += 1;
        }
    }
    Ok(written)
}

/// Process `files` on a pool of `jobs` threads (0 = one per core).
pub fn run_batch(files: &[PathBuf], opts: &ProcessOptions, jobs: usize) -> anyhow::Result<BatchReport> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    let completed = AtomicUsize::new(0);
    let total = files.len();
    let results: Vec<(PathBuf, Result<FileReport>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let result = process_file(path, opts);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                match &result {
                    Ok(report) => log::debug!(
                        "[{}/{}] {}: {} samples, {} phrases",
                        done,
                        total,
                        report.parent,
                        report.samples.len(),
                        report.phrases.len()
                    ),
                    Err(e) => log::debug!("[{}/{}] {} failed: {}", done, total, path.display(), e),
                }
                pb.inc(1);
                (path.clone(), result)
            })
            .collect()
    });
    pb.finish_and_clear();

    let mut batch = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(report) => batch.reports.push(report),
            Err(e) => batch.failures.push((path, e)),
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    const RATE: u32 = 22050;

    /// Two 1 kHz tones separated by 0.3 s of silence.
    fn two_tones() -> Vec<f32> {
        let secs = |s: f64| (s * RATE as f64) as usize;
        let tone = |n: usize| {
            (0..n)
                .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / RATE as f32).sin() * 0.6)
                .collect::<Vec<f32>>()
        };
        let mut samples = vec![0.0; secs(0.2)];
        samples.extend(tone(secs(0.3)));
        samples.extend(vec![0.0; secs(0.3)]);
        samples.extend(tone(secs(0.3)));
        samples.extend(vec![0.0; secs(0.5)]);
        samples
    }

    fn write_wav(path: &Path, samples: &[f32]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn options(args: &[&str]) -> ProcessOptions {
        let mut argv = vec!["phrasecut", "in.wav", "--max-silence", "0.5"];
        argv.extend_from_slice(args);
        ProcessOptions::from_cli(&Cli::parse_from(argv))
    }

    fn sample(power: f64, start: i64) -> Sample {
        Sample {
            index: 0,
            parent: "p".to_string(),
            filename: format!("p {}.wav", start),
            start,
            dur: 10,
            power,
            hz: 0.0,
            note: String::new(),
            octave: -1,
            left: 0,
            right: 1,
        }
    }

    #[test]
    fn parent_name_stops_at_first_dot() {
        assert_eq!(parent_name(Path::new("/data/robin.wav")), "robin");
        assert_eq!(parent_name(Path::new("dawn.chorus.2024.flac")), "dawn");
        assert_eq!(parent_name(Path::new("noext")), "noext");
    }

    #[test]
    fn extracts_tones_from_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blackbird.take1.wav");
        write_wav(&path, &two_tones());

        let report = process_file(&path, &options(&[])).unwrap();
        assert_eq!(report.parent, "blackbird");
        assert_eq!(report.samples.len(), 2);
        assert!(report.samples[0].start < report.samples[1].start);
        assert!(report.samples.iter().all(|s| s.parent == "blackbird"));
        assert!(report.samples.iter().all(|s| s.filename.starts_with("blackbird ")));
        assert_eq!(report.phrases.len(), 1);
        assert_eq!(report.phrases[0].samples.len(), 2);
        assert_eq!(report.clips_written, 0);
    }

    #[test]
    fn saves_sample_and_phrase_clips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wren.wav");
        write_wav(&path, &two_tones());

        let mut opts = options(&["--save-clips"]);
        opts.clip_dir = Some(dir.path().join("clips"));
        let report = process_file(&path, &opts).unwrap();
        assert_eq!(report.clips_written, 3);

        for sample in &report.samples {
            assert!(dir.path().join("clips/samples").join(&sample.filename).is_file());
        }
        let phrase_clip = dir.path().join("clips/phrases").join(&report.phrases[0].filename);
        assert!(phrase_clip.is_file());

        // second run keeps existing clips
        assert_eq!(process_file(&path, &opts).unwrap().clips_written, 0);
    }

    #[test]
    fn silent_recording_yields_nothing() {
        let audio = AudioBuffer {
            samples: vec![0.0; RATE as usize],
            sample_rate: RATE,
        };
        let (samples, phrases) = analyze_buffer("quiet", &audio, &options(&[])).unwrap();
        assert!(samples.is_empty());
        assert!(phrases.is_empty());
    }

    #[test]
    fn zero_fft_size_yields_nothing_without_panicking() {
        let audio = AudioBuffer {
            samples: two_tones(),
            sample_rate: RATE,
        };
        let mut opts = options(&[]);
        opts.analysis.fft_size = 0;
        let (samples, phrases) = analyze_buffer("wren", &audio, &opts).unwrap();
        assert!(samples.is_empty());
        assert!(phrases.is_empty());
    }

    #[test]
    fn cap_keeps_loudest_first() {
        let samples = vec![sample(0.1, 0), sample(0.9, 100), sample(0.5, 200)];
        let capped = cap_loudest(samples.clone(), 2);
        let powers: Vec<f64> = capped.iter().map(|s| s.power).collect();
        assert_eq!(powers, vec![0.9, 0.5]);
        assert_eq!(cap_loudest(samples.clone(), 0), samples);
        assert_eq!(cap_loudest(samples.clone(), 5), samples);
    }

    #[test]
    fn batch_collects_failures_without_aborting() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.wav");
        let bad = dir.path().join("bad.wav");
        write_wav(&good, &two_tones());
        std::fs::write(&bad, b"definitely not audio").unwrap();

        let batch = run_batch(&[bad.clone(), good], &options(&[]), 2).unwrap();
        assert_eq!(batch.reports.len(), 1);
        assert_eq!(batch.reports[0].parent, "good");
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].0, bad);
        assert_eq!(batch.samples().len(), 2);
        assert_eq!(batch.phrases().len(), 1);
    }

    #[test]
    fn collects_audio_files_recursively() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        for name in ["b.wav", "notes.txt", "sub/a.FLAC", "sub/c.mp3"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let files = collect_inputs(&[dir.path().to_path_buf(), dir.path().join("missing.wav")]);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.wav", "sub/a.FLAC", "sub/c.mp3"]);
    }
}
