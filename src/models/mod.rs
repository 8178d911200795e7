//! Models module for the tablature editor
//!
//! This module contains the plain data types the stores operate on:
//! positions, notes and stacks, articulations, annotations and chords.

pub mod annotation;
pub mod articulation;
pub mod chord;
pub mod guitar;
pub mod note;
pub mod position;
pub mod serde_helpers;
pub mod theory;

// Re-export commonly used types
pub use annotation::{Annotation, AnnotationRows};
pub use articulation::{
    Articulation, BendData, BendView, ReleaseType, StringTies, TieData, TieDirection, TieKind,
    TieMap, TieView,
};
pub use chord::{Chord, ChordsData};
pub use guitar::{GuitarConfig, GuitarData};
pub use note::{GuitarNote, Midi, Note, Stack, StackMap};
pub use position::{Position, Rational, Spacing};
pub use theory::{default_tuning, note_to_midi};
