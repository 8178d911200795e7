//! Editing stores
//!
//! Each store is a borrowed view over data owned by a [`TabDocument`]: it
//! holds `&mut` to the live maps, never a copy, so a write through a store is
//! what the document serializes next. The borrow checker makes the
//! single-writer rule explicit.
//!
//! ## Modules
//!
//! - `stacks`: sparse position -> stack storage and time shifting
//! - `ties`: ties and bends between notes on one string
//! - `annotations`: non-overlapping titled intervals per row
//! - `chords`: the chord diagram list
//! - `guitar`: the guitar-level facade tying notes and articulations together
//!
//! [`TabDocument`]: crate::document::TabDocument

pub mod annotations;
pub mod chords;
pub mod guitar;
pub mod stacks;
pub mod ties;

pub use annotations::AnnotationStore;
pub use chords::ChordStore;
pub use guitar::GuitarStore;
pub use stacks::StackStore;
pub use ties::TieStore;
