//! Notes and note stacks
//!
//! A stack is every note sounding at one position, keyed by string index.
//! The string index lives only in the key, never inside the note itself.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::position::Position;
use crate::error::{Result, TabError};

/// A midi pitch in 0..=127
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Midi(u8);

impl Midi {
    pub fn new(value: u8) -> Result<Self> {
        if value < 128 {
            Ok(Midi(value))
        } else {
            Err(TabError::InvalidMidi(i64::from(value)))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Pitch class, 0 = C
    pub fn chroma(self) -> u8 {
        self.0 % 12
    }

    /// Pitch raised by `semitones`, if still in range (fretting a string)
    pub fn transposed(self, semitones: i32) -> Option<Midi> {
        let value = i32::from(self.0) + semitones;
        u8::try_from(value).ok().and_then(|v| Midi::new(v).ok())
    }
}

impl TryFrom<i64> for Midi {
    type Error = TabError;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v < 128)
            .map(Midi)
            .ok_or(TabError::InvalidMidi(value))
    }
}

impl From<Midi> for u8 {
    fn from(midi: Midi) -> u8 {
        midi.0
    }
}

impl fmt::Display for Midi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a string plays at a position: a pitch, or a muted (dead) note
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Note {
    Midi(Midi),
    Muted,
}

impl Note {
    /// The sounding pitch, `None` for muted notes
    pub fn midi(self) -> Option<Midi> {
        match self {
            Note::Midi(midi) => Some(midi),
            Note::Muted => None,
        }
    }

    pub fn is_muted(self) -> bool {
        matches!(self, Note::Muted)
    }
}

impl From<Midi> for Note {
    fn from(midi: Midi) -> Self {
        Note::Midi(midi)
    }
}

const MUTED: &str = "muted";

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Note::Midi(midi) => serializer.serialize_u8(midi.value()),
            Note::Muted => serializer.serialize_str(MUTED),
        }
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NoteRepr {
            Midi(i64),
            Label(String),
        }

        match NoteRepr::deserialize(deserializer)? {
            NoteRepr::Midi(value) => Midi::try_from(value).map(Note::Midi).map_err(de::Error::custom),
            NoteRepr::Label(label) if label == MUTED => Ok(Note::Muted),
            NoteRepr::Label(label) => Err(de::Error::custom(format!(
                "expected a midi number or \"{}\", got \"{}\"",
                MUTED, label
            ))),
        }
    }
}

/// A note on one string at one position
///
/// `slide` and `bend` are display hints only; the editing algorithms ignore them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuitarNote {
    pub note: Note,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub slide: bool,

    /// Bend label text (e.g. "full", "1/2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bend: Option<String>,
}

impl GuitarNote {
    pub fn new(note: impl Into<Note>) -> Self {
        Self {
            note: note.into(),
            slide: false,
            bend: None,
        }
    }

    pub fn muted() -> Self {
        Self::new(Note::Muted)
    }
}

/// Notes at one position, keyed by string index
pub type Stack = BTreeMap<usize, GuitarNote>;

/// Sparse position -> stack mapping; every stored stack is non-empty
pub type StackMap = BTreeMap<Position, Stack>;
