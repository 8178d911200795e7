//! The tab document: header fields plus every store's data
//!
//! `TabDocument` owns all editable state. Stores are handed out as borrowed
//! views (`guitar()`, `annotations()`, `chords()`), so edits land directly in
//! the document that gets serialized.
//!
//! ## Serialized form
//!
//! JSON with camelCase field names. Keyed containers are written as
//! `{"_entries": [[key, value], ...]}` and sets as `{"_svalues": [...]}` so
//! fractional position keys survive the round trip exactly:
//!
//! ```text
//! {
//!   "title": "new tab", "beatsPerBar": 4, "beatSize": 1.0,
//!   "guitarData": {
//!     "strings": 6, "tuning": [64, 59, 55, 50, 45, 40], "frets": 24,
//!     "stacks": {"_entries": [[2.5, {"_entries": [[0, {"note": 64}]]}]]},
//!     "ties": {"_entries": [[0, {"_entries": [[2.5, {"type": "tie", "kind": "hammer", "to": 3.0}]]}]]}
//!   },
//!   "annotations": {"_entries": [[0, [{"start": 0.0, "end": 4.0, "title": "intro"}]]]},
//!   "chordsData": {"tuning": [...], "chords": [{"title": "", "notes": {"_entries": []}}]},
//!   "lineBreaks": {"_svalues": []}
//! }
//! ```

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabError};
use crate::models::serde_helpers::{entries, svalues};
use crate::models::{
    AnnotationRows, ChordsData, GuitarConfig, GuitarData, Position, Spacing,
};
use crate::store::{AnnotationStore, ChordStore, GuitarStore};

const DEFAULT_TITLE: &str = "new tab";
const DEFAULT_BEATS_PER_BAR: u32 = 4;

/// Header overrides applied on top of the defaults
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabOptions {
    pub title: Option<String>,
    pub beats_per_bar: Option<NonZeroU32>,
    pub beat_size: Option<Spacing>,
    pub chords_data: Option<ChordsData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDocument {
    pub title: String,
    pub beats_per_bar: NonZeroU32,
    pub beat_size: Spacing,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    guitar_data: Option<GuitarData>,

    #[serde(default, with = "entries")]
    annotations: AnnotationRows,

    #[serde(default)]
    chords_data: ChordsData,

    /// Positions where the rendered tab starts a new line
    #[serde(default, with = "svalues")]
    pub line_breaks: BTreeSet<Position>,
}

impl Default for TabDocument {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            beats_per_bar: NonZeroU32::new(DEFAULT_BEATS_PER_BAR).unwrap_or(NonZeroU32::MIN),
            beat_size: Spacing::Quarter,
            guitar_data: None,
            annotations: AnnotationRows::new(),
            chords_data: ChordsData::default(),
            line_breaks: BTreeSet::new(),
        }
    }
}

impl TabDocument {
    /// A blank document with the default header and one blank chord
    pub fn new() -> Self {
        Self::default()
    }

    /// A blank document with `options` merged over the defaults
    pub fn with_options(options: TabOptions) -> Self {
        let defaults = Self::default();
        Self {
            title: options.title.unwrap_or(defaults.title),
            beats_per_bar: options.beats_per_bar.unwrap_or(defaults.beats_per_bar),
            beat_size: options.beat_size.unwrap_or(defaults.beat_size),
            chords_data: options.chords_data.unwrap_or(defaults.chords_data),
            ..defaults
        }
    }

    /// Install a fresh, empty guitar view, replacing any existing one
    pub fn create_guitar_tab(&mut self, config: GuitarConfig) -> Result<GuitarStore<'_>> {
        if config.strings == 0 || config.tuning.len() != config.strings {
            return Err(TabError::InvalidConfig(format!(
                "{} tuning pitches for {} strings",
                config.tuning.len(),
                config.strings
            )));
        }
        log::info!(
            "Creating guitar tab: {} strings, {} frets",
            config.strings,
            config.frets
        );
        let data = self.guitar_data.insert(GuitarData::new(config));
        Ok(GuitarStore::new(data))
    }

    /// The guitar view, if one has been created
    pub fn guitar(&mut self) -> Option<GuitarStore<'_>> {
        self.guitar_data.as_mut().map(GuitarStore::new)
    }

    pub fn guitar_data(&self) -> Option<&GuitarData> {
        self.guitar_data.as_ref()
    }

    pub fn annotations(&mut self) -> AnnotationStore<'_> {
        AnnotationStore::new(&mut self.annotations)
    }

    pub fn annotation_rows(&self) -> &AnnotationRows {
        &self.annotations
    }

    pub fn chords(&mut self) -> ChordStore<'_> {
        ChordStore::new(&mut self.chords_data)
    }

    pub fn chords_data(&self) -> &ChordsData {
        &self.chords_data
    }

    /// Length of one bar in quarter notes, `None` if it does not fit a position
    pub fn bar_length(&self) -> Option<crate::models::Rational> {
        let beat = self.beat_size.value();
        let numer = i64::from(*beat.numer()) * i64::from(self.beats_per_bar.get());
        let numer = i32::try_from(numer).ok()?;
        Some(crate::models::Rational::new(numer, *beat.denom()))
    }

    /// Add a line break at `position`, or remove it if present.
    /// Returns whether a break is now set there.
    pub fn toggle_line_break(&mut self, position: Position) -> bool {
        if self.line_breaks.remove(&position) {
            false
        } else {
            self.line_breaks.insert(position)
        }
    }

    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a serialized document, rejecting anything the stores could not
    /// have produced
    pub fn deserialize(blob: &str) -> Result<Self> {
        let document: TabDocument = serde_json::from_str(blob)?;
        document.validate()?;
        log::info!(
            "Loaded tab '{}': {} stacks, {} annotation rows, {} chords",
            document.title,
            document.guitar_data.as_ref().map_or(0, |g| g.stacks().len()),
            document.annotations.len(),
            document.chords_data.chords.len()
        );
        Ok(document)
    }

    fn validate(&self) -> Result<()> {
        if let Some(guitar) = &self.guitar_data {
            guitar.validate()?;
        }
        for (row, annotations) in &self.annotations {
            for (i, annotation) in annotations.iter().enumerate() {
                if !annotation.is_valid() {
                    return Err(TabError::Malformed(format!(
                        "empty annotation [{}, {}) on row {}",
                        annotation.start, annotation.end, row
                    )));
                }
                if annotations[..i].iter().any(|other| other.overlaps(annotation)) {
                    return Err(TabError::Malformed(format!(
                        "overlapping annotation [{}, {}) on row {}",
                        annotation.start, annotation.end, row
                    )));
                }
            }
        }
        let chord_strings = self.chords_data.tuning.len();
        for chord in &self.chords_data.chords {
            if let Some(string) = chord.notes.keys().find(|s| **s >= chord_strings) {
                return Err(TabError::Malformed(format!(
                    "chord '{}' uses string {} (strings: {})",
                    chord.title, string, chord_strings
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuitarNote, Midi};

    #[test]
    fn test_defaults() {
        let doc = TabDocument::new();
        assert_eq!(doc.title, "new tab");
        assert_eq!(doc.beats_per_bar.get(), 4);
        assert_eq!(doc.beat_size, Spacing::Quarter);
        assert!(doc.guitar_data().is_none());
        assert_eq!(doc.chords_data().chords.len(), 1);
        assert_eq!(doc.chords_data().tuning.len(), 6);
        assert_eq!(doc.bar_length(), Some(crate::models::Rational::from_integer(4)));
    }

    #[test]
    fn test_bar_length() {
        let mut doc = TabDocument::new();
        doc.beat_size = Spacing::Eighth;
        doc.beats_per_bar = std::num::NonZeroU32::new(7).unwrap();
        assert_eq!(doc.bar_length(), Some(crate::models::Rational::new(7, 2)));

        doc.beat_size = Spacing::Whole;
        doc.beats_per_bar = std::num::NonZeroU32::MAX;
        assert_eq!(doc.bar_length(), None);
    }

    #[test]
    fn test_options_merge_over_defaults() {
        let doc = TabDocument::with_options(TabOptions {
            title: Some("Blackbird".to_string()),
            beat_size: Some(Spacing::Eighth),
            ..Default::default()
        });
        assert_eq!(doc.title, "Blackbird");
        assert_eq!(doc.beat_size, Spacing::Eighth);
        assert_eq!(doc.beats_per_bar.get(), 4);
    }

    #[test]
    fn test_create_guitar_tab_replaces_previous() {
        let mut doc = TabDocument::new();
        {
            let mut guitar = doc.create_guitar_tab(GuitarConfig::default()).unwrap();
            guitar.set_note(Position::zero(), 0, GuitarNote::new(Midi::new(64).unwrap()));
        }
        assert_eq!(doc.guitar_data().map(|g| g.stacks().len()), Some(1));

        doc.create_guitar_tab(GuitarConfig::default()).unwrap();
        assert_eq!(doc.guitar_data().map(|g| g.stacks().len()), Some(0));
    }

    #[test]
    fn test_create_guitar_tab_rejects_mismatched_tuning() {
        let mut doc = TabDocument::new();
        let config = GuitarConfig {
            strings: 7,
            ..GuitarConfig::default()
        };
        assert!(doc.create_guitar_tab(config).is_err());
        assert!(doc.guitar().is_none());
    }

    #[test]
    fn test_store_writes_are_visible_through_document() {
        let mut doc = TabDocument::new();
        doc.create_guitar_tab(GuitarConfig::default()).unwrap();
        if let Some(mut guitar) = doc.guitar() {
            guitar.set_note(Position::from_quarters(3), 1, GuitarNote::muted());
        }
        let stacks = doc.guitar_data().map(|g| g.stacks().clone()).unwrap_or_default();
        assert!(stacks.contains_key(&Position::from_quarters(3)));
    }

    #[test]
    fn test_toggle_line_break() {
        let mut doc = TabDocument::new();
        let bar = Position::from_quarters(16);
        assert!(doc.toggle_line_break(bar));
        assert!(doc.line_breaks.contains(&bar));
        assert!(!doc.toggle_line_break(bar));
        assert!(doc.line_breaks.is_empty());
    }
}
