//! Error types for the tablature core
//!
//! Most editing calls never fail: invalid note writes are ignored and
//! overlapping annotations are refused with `None`. The variants below cover
//! the cases that must be reported: malformed serialized input, unguarded
//! indices and shifts that would move time before the start of the document.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, TabError>;

/// Top-level error type for tablature operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TabError {
    /// Position is negative, not finite, or not on the 1/128 grid
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Value does not name a supported note spacing
    #[error("Invalid spacing: {0}")]
    InvalidSpacing(String),

    /// Pitch outside 0..=127
    #[error("Invalid midi pitch: {0}")]
    InvalidMidi(i64),

    /// Note name could not be parsed (e.g. "H2")
    #[error("Invalid note name: {0}")]
    InvalidNoteName(String),

    /// A shift would move content at `position` before the start of the document
    #[error("Shifting {position} by {amount} would move it before the start of the document")]
    ShiftBeforeStart { position: String, amount: String },

    /// Instrument setup that cannot describe a guitar (e.g. tuning/string count mismatch)
    #[error("Invalid guitar config: {0}")]
    InvalidConfig(String),

    /// Chord index outside the chord list
    #[error("Chord index {index} out of bounds (len: {len})")]
    ChordIndexOutOfRange { index: usize, len: usize },

    /// Serialized document could not be parsed or failed validation
    #[error("Malformed tab data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for TabError {
    fn from(err: serde_json::Error) -> Self {
        TabError::Malformed(err.to_string())
    }
}
