//! Tab editor WASM API
//!
//! This module provides the JavaScript-facing API for the tab editor.
//!
//! # Module Structure
//!
//! - `helpers`: logging macros, serialization across the boundary, session access
//! - `tab`: document, note, articulation, annotation and chord operations

pub mod helpers;
pub mod tab;

pub use tab::*;
