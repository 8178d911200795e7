//! Guitar Tab Editor WASM Module
//!
//! Document model and editing engine for guitar tablature: sparse note
//! stacks on an exact rational time grid, ties and bends between notes,
//! annotation rows and chord diagrams. The core is plain Rust; the `api`
//! module exposes it to JavaScript.

pub mod api;
pub mod document;
pub mod error;
pub mod models;
pub mod persist;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use document::{TabDocument, TabOptions};
pub use error::{Result, TabError};
pub use models::*;
pub use session::{Change, TabSession};
pub use store::{AnnotationStore, ChordStore, GuitarStore, StackStore, TieStore};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"[WASM] logger already initialized".into());
    }

    log::info!("Tab editor WASM module initialized");
}
