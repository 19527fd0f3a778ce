use std::path::Path;

use crate::error::Result;
use crate::notes::phrase::Phrase;
use crate::notes::sample::Sample;

pub const SAMPLE_COLUMNS: [&str; 7] = ["parent", "start", "dur", "power", "hz", "note", "octave"];
pub const PHRASE_COLUMNS: [&str; 4] = ["parent", "start", "dur", "phrase"];

pub fn write_samples(path: &Path, samples: &[Sample]) -> Result<usize> {
    let mut writer = open_writer(path)?;
    writer.write_record(SAMPLE_COLUMNS)?;
    for sample in samples {
        writer.write_record([
            sample.parent.clone(),
            sample.start.to_string(),
            sample.dur.to_string(),
            format_float(sample.power),
            format_float(sample.hz),
            sample.note.clone(),
            sample.octave.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(samples.len())
}

pub fn write_phrases(path: &Path, phrases: &[Phrase]) -> Result<usize> {
    let mut writer = open_writer(path)?;
    writer.write_record(PHRASE_COLUMNS)?;
    for phrase in phrases {
        writer.write_record([
            phrase.parent.clone(),
            phrase.start.to_string(),
            phrase.dur.to_string(),
            phrase_cell(&phrase.samples),
        ])?;
    }
    writer.flush()?;
    Ok(phrases.len())
}

/// CRLF-terminated, minimal quoting, like the catalogues written by Python's `csv` module.
fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    Ok(csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)?)
}

/// `start:dur:power:hz:note:octave` per sample, comma separated.
pub fn phrase_cell(samples: &[Sample]) -> String {
    samples
        .iter()
        .map(|s| {
            format!(
                "{}:{}:{}:{}:{}:{}",
                s.start,
                s.dur,
                format_float(s.power),
                format_float(s.hz),
                s.note,
                s.octave
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Shortest round-trip form, always with a fractional part (`12.0`, `0.37`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(start: i64, dur: i64, power: f64, hz: f64, note: &str, octave: i32) -> Sample {
        Sample {
            index: 0,
            parent: "XC1234".to_string(),
            filename: format!("XC1234 {}.wav", start),
            start,
            dur,
            power,
            hz,
            note: note.to_string(),
            octave,
            left: 0,
            right: 0,
        }
    }

    #[test]
    fn floats_keep_a_fractional_part() {
        assert_eq!(format_float(12.0), "12.0");
        assert_eq!(format_float(0.37), "0.37");
        assert_eq!(format_float(4306.64), "4306.64");
        assert_eq!(format_float(0.0), "0.0");
    }

    #[test]
    fn phrase_cell_joins_samples() {
        let samples = vec![
            sample(0, 93, 0.41, 4306.64, "C#", 8),
            sample(150, 70, 0.2, 3000.0, "F#", 7),
        ];
        assert_eq!(
            phrase_cell(&samples),
            "0:93:0.41:4306.64:C#:8,150:70:0.2:3000.0:F#:7"
        );
    }

    #[test]
    fn writes_samples_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        let rows = write_samples(&path, &[sample(232, 116, 0.5, 2153.32, "C", 7)]).unwrap();
        assert_eq!(rows, 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "parent,start,dur,power,hz,note,octave\r\nXC1234,232,116,0.5,2153.32,C,7\r\n"
        );
    }

    #[test]
    fn phrase_column_is_quoted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("phrases.csv");
        let phrase = Phrase {
            parent: "XC1234".to_string(),
            filename: "XC1234 0.wav".to_string(),
            start: 0,
            dur: 220,
            left: 0,
            right: 10,
            samples: vec![
                sample(0, 93, 0.41, 4306.64, "C#", 8),
                sample(150, 70, 0.2, 3000.0, "F#", 7),
            ],
        };
        write_phrases(&path, &[phrase]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "parent,start,dur,phrase\r\nXC1234,0,220,\"0:93:0.41:4306.64:C#:8,150:70:0.2:3000.0:F#:7\"\r\n"
        );
    }

    #[test]
    fn empty_results_still_get_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        assert_eq!(write_samples(&path, &[]).unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "parent,start,dur,power,hz,note,octave\r\n"
        );
    }
}
