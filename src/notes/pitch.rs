use regex::Regex;
use std::sync::OnceLock;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave reported when a note string has no parsable octave.
pub const UNKNOWN_OCTAVE: i32 = -1;

/// Equal-tempered note name for a frequency (A4 = 440 Hz), e.g. `"C#5"` or `"A-1"`.
///
/// `None` for zero, negative or non-finite input.
pub fn hz_to_note(hz: f64) -> Option<String> {
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    let midi = 12.0 * (hz.log2() - 440f64.log2()) + 69.0;
    let number = midi.round_ties_even() as i64;
    let name = NOTE_NAMES[number.rem_euclid(12) as usize];
    let octave = number.div_euclid(12) - 1;
    Some(format!("{name}{octave}"))
}

fn note_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Z]#?b?)(-?[0-9]+)").expect("note regex must compile"))
}

/// Split `"G#3"` into `("G#", 3)`. Unparsable input comes back whole with [`UNKNOWN_OCTAVE`].
pub fn split_note(note: &str) -> (String, i32) {
    note_pattern()
        .captures(note)
        .and_then(|caps| {
            let octave = caps[2].parse::<i32>().ok()?;
            Some((caps[1].to_string(), octave))
        })
        .unwrap_or_else(|| (note.to_string(), UNKNOWN_OCTAVE))
}
