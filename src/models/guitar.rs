//! Guitar view data: instrument setup, notes and articulations

use serde::{Deserialize, Serialize};

use super::articulation::TieMap;
use super::note::{Midi, StackMap};
use super::serde_helpers::nested_entries;
use super::theory::default_tuning;
use crate::error::{Result, TabError};

/// Instrument setup used when creating a guitar view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuitarConfig {
    /// Open-string pitches, highest string first
    pub tuning: Vec<Midi>,
    pub strings: usize,
    pub frets: u32,
}

impl Default for GuitarConfig {
    fn default() -> Self {
        Self {
            tuning: default_tuning(),
            strings: 6,
            frets: 24,
        }
    }
}

/// Everything the guitar view stores
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuitarData {
    pub(crate) strings: usize,
    pub(crate) tuning: Vec<Midi>,
    pub(crate) frets: u32,
    #[serde(with = "nested_entries")]
    pub(crate) stacks: StackMap,
    #[serde(default, with = "nested_entries")]
    pub(crate) ties: TieMap,
}

impl GuitarData {
    /// An empty guitar view
    pub fn new(config: GuitarConfig) -> Self {
        Self {
            strings: config.strings,
            tuning: config.tuning,
            frets: config.frets,
            stacks: StackMap::new(),
            ties: TieMap::new(),
        }
    }

    pub fn strings(&self) -> usize {
        self.strings
    }

    pub fn tuning(&self) -> &[Midi] {
        &self.tuning
    }

    pub fn frets(&self) -> u32 {
        self.frets
    }

    pub fn stacks(&self) -> &StackMap {
        &self.stacks
    }

    pub fn ties(&self) -> &TieMap {
        &self.ties
    }

    /// Check the invariants the stores rely on, for data that came from outside
    pub(crate) fn validate(&self) -> Result<()> {
        if self.tuning.len() != self.strings {
            return Err(TabError::Malformed(format!(
                "tuning has {} pitches for {} strings",
                self.tuning.len(),
                self.strings
            )));
        }
        for (position, stack) in &self.stacks {
            if stack.is_empty() {
                return Err(TabError::Malformed(format!("empty stack at {}", position)));
            }
            if let Some(string) = stack.keys().find(|s| **s >= self.strings) {
                return Err(TabError::Malformed(format!(
                    "note on string {} at {} (strings: {})",
                    string, position, self.strings
                )));
            }
        }
        if let Some(string) = self.ties.keys().find(|s| **s >= self.strings) {
            return Err(TabError::Malformed(format!(
                "articulation on string {} (strings: {})",
                string, self.strings
            )));
        }
        Ok(())
    }
}
