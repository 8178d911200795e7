//! Chord diagrams: named stacks with no position

use serde::{Deserialize, Serialize};

use super::note::{Midi, Stack};
use super::serde_helpers::entries;
use super::theory::default_tuning;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    #[serde(default)]
    pub title: String,
    #[serde(with = "entries")]
    pub notes: Stack,
}

impl Chord {
    /// A chord with no title and no notes
    pub fn blank() -> Self {
        Self::default()
    }
}

/// The chord list and the single tuning shared by every chord in it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChordsData {
    pub tuning: Vec<Midi>,
    pub chords: Vec<Chord>,
}

impl Default for ChordsData {
    fn default() -> Self {
        Self {
            tuning: default_tuning(),
            chords: vec![Chord::blank()],
        }
    }
}
