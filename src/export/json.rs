use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Pretty-printed JSON array of records.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::phrase::Phrase;
    use crate::notes::sample::Sample;
    use tempfile::tempdir;

    fn sample(start: i64) -> Sample {
        Sample {
            index: 4,
            parent: "wren".to_string(),
            filename: format!("wren {}.wav", start),
            start,
            dur: 80,
            power: 0.25,
            hz: 5512.5,
            note: "F".to_string(),
            octave: 8,
            left: 3,
            right: 9,
        }
    }

    #[test]
    fn samples_carry_all_public_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("samples.json");
        write_records(&path, &[sample(120)]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let record = &value[0];
        assert_eq!(record["parent"], "wren");
        assert_eq!(record["filename"], "wren 120.wav");
        assert_eq!(record["start"], 120);
        assert_eq!(record["dur"], 80);
        assert_eq!(record["power"], 0.25);
        assert_eq!(record["hz"], 5512.5);
        assert_eq!(record["note"], "F");
        assert_eq!(record["octave"], 8);
        assert_eq!(record["index"], 4);
        assert!(record.get("left").is_none());
    }

    #[test]
    fn phrases_embed_samples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("phrases.json");
        let phrase = Phrase {
            parent: "wren".to_string(),
            filename: "wren 0.wav".to_string(),
            start: 0,
            dur: 300,
            left: 0,
            right: 20,
            samples: vec![sample(0), sample(220)],
        };
        assert_eq!(write_records(&path, &[phrase]).unwrap(), 1);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["dur"], 300);
        assert_eq!(value[0]["samples"].as_array().map(Vec::len), Some(2));
        assert_eq!(value[0]["samples"][1]["start"], 220);
    }
}
