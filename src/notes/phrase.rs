use serde::Serialize;

use super::sample::Sample;

pub const DEFAULT_MIN_NOTES: usize = 2;

/// Consecutive samples of one recording separated by short silences.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Phrase {
    pub parent: String,
    pub filename: String,
    pub start: i64,
    pub dur: i64,
    #[serde(skip)]
    pub left: usize,
    #[serde(skip)]
    pub right: usize,
    pub samples: Vec<Sample>,
}

/// Grouping bounds, all in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhraseParams {
    pub min_len: f64,
    pub max_len: f64,
    pub max_silence: f64,
    pub min_notes: usize,
}

impl PhraseParams {
    pub fn from_seconds(min_len: f64, max_len: f64, max_silence: f64, min_notes: usize) -> Self {
        Self {
            min_len: min_len * 1000.0,
            max_len: max_len * 1000.0,
            max_silence: max_silence * 1000.0,
            min_notes,
        }
    }
}

/// Split chronologically ordered samples into phrases.
///
/// A sample starting more than `max_silence` after the end of the previous
/// sample begins a new phrase. Phrases with fewer than `min_notes` samples or
/// a total duration outside `min_len..=max_len` are dropped.
pub fn group_phrases(samples: &[Sample], params: &PhraseParams) -> Vec<Phrase> {
    let mut groups: Vec<Vec<Sample>> = Vec::new();
    let mut current: Vec<Sample> = Vec::new();
    let mut prev_end: Option<i64> = None;

    for sample in samples {
        if let Some(end) = prev_end {
            if (sample.start - end) as f64 > params.max_silence {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(sample.clone());
        // measured from the last sample even across a phrase break
        prev_end = Some(sample.end());
    }
    groups.push(current);

    groups
        .into_iter()
        .filter(|group| !group.is_empty() && group.len() >= params.min_notes)
        .filter_map(build_phrase)
        .filter(|phrase| (params.min_len..=params.max_len).contains(&(phrase.dur as f64)))
        .collect()
}

fn build_phrase(samples: Vec<Sample>) -> Option<Phrase> {
    let first = samples.first()?;
    let last = samples.last()?;
    let start = first.start;
    let dur = last.end() - first.start;

    Some(Phrase {
        parent: first.parent.clone(),
        filename: format!("{} {}.wav", first.parent, start),
        start,
        dur,
        left: first.left,
        right: last.right,
        samples,
    })
}
