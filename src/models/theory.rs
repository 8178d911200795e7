//! Pitch helpers: note names to midi, standard tuning

use super::note::Midi;
use crate::error::{Result, TabError};

/// Standard guitar tuning, highest string first
pub const STANDARD_TUNING: [&str; 6] = ["E4", "B3", "G3", "D3", "A2", "E2"];

/// Standard tuning as midi pitches (64 59 55 50 45 40)
pub fn default_tuning() -> Vec<Midi> {
    // Literal names always parse
    STANDARD_TUNING
        .iter()
        .filter_map(|name| note_to_midi(name).ok())
        .collect()
}

/// Convert a scientific pitch name ("C4", "F#3", "Bb2", "Ebb5") to midi
///
/// C4 is midi 60. Octaves may be negative ("C-1" is 0).
pub fn note_to_midi(name: &str) -> Result<Midi> {
    let invalid = || TabError::InvalidNoteName(name.to_string());
    let mut chars = name.trim().chars().peekable();

    let letter = chars.next().ok_or_else(invalid)?;
    let base: i64 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(invalid()),
    };

    let mut accidental: i64 = 0;
    while let Some(&ch) = chars.peek() {
        match ch {
            '#' => accidental += 1,
            'b' => accidental -= 1,
            _ => break,
        }
        chars.next();
    }

    let octave: String = chars.collect();
    let octave: i64 = octave.parse().map_err(|_| invalid())?;

    let value = octave
        .checked_add(1)
        .and_then(|octave| octave.checked_mul(12))
        .and_then(|value| value.checked_add(base + accidental))
        .ok_or_else(invalid)?;
    Midi::try_from(value).map_err(|_| invalid())
}
