//! Saving and loading serialized tabs
//!
//! Storage itself lives outside the crate (browser storage, a server, a
//! file). Callers implement [`BlobStore`] for their backend; the helpers here
//! take care of turning documents into blobs and back.

use std::collections::HashMap;

use crate::document::TabDocument;
use crate::error::Result;

/// Key/value storage for serialized tabs
///
/// Different implementations can use different backends (memory,
/// localStorage, IndexedDB, HTTP).
pub trait BlobStore {
    /// Store `blob` under `id`, replacing anything already there
    fn put(&mut self, id: &str, blob: String);

    /// Fetch the blob stored under `id`
    fn get(&self, id: &str) -> Option<String>;
}

/// In-memory store, mostly useful for tests and scratch sessions
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, id: &str, blob: String) {
        self.blobs.insert(id.to_string(), blob);
    }

    fn get(&self, id: &str) -> Option<String> {
        self.blobs.get(id).cloned()
    }
}

/// Serialize `document` into `store` under `id`
pub fn save_tab(store: &mut impl BlobStore, id: &str, document: &TabDocument) -> Result<()> {
    let blob = document.serialize()?;
    log::debug!("Saving tab {} ({} bytes)", id, blob.len());
    store.put(id, blob);
    Ok(())
}

/// Load the tab stored under `id`; `Ok(None)` when nothing is stored there
pub fn load_tab(store: &impl BlobStore, id: &str) -> Result<Option<TabDocument>> {
    match store.get(id) {
        Some(blob) => TabDocument::deserialize(&blob).map(Some),
        None => {
            log::debug!("No tab stored under {}", id);
            Ok(None)
        }
    }
}

/// A fresh random identifier for a new tab
#[cfg(feature = "uuid")]
pub fn new_tab_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabError;
    use crate::models::{GuitarConfig, GuitarNote, Position};

    #[test]
    fn test_save_then_load() {
        let mut doc = TabDocument::new();
        doc.title = "Saved".to_string();
        doc.create_guitar_tab(GuitarConfig::default())
            .unwrap()
            .set_note(Position::from_quarters(2), 4, GuitarNote::muted());

        let mut store = MemoryBlobStore::new();
        save_tab(&mut store, "tab-1", &doc).unwrap();
        assert_eq!(store.len(), 1);

        let loaded = load_tab(&store, "tab-1").unwrap();
        assert_eq!(loaded, Some(doc));
    }

    #[test]
    fn test_missing_and_corrupt_blobs() {
        let mut store = MemoryBlobStore::new();
        assert_eq!(load_tab(&store, "nope").unwrap(), None);

        store.put("bad", "{\"title\": 3".to_string());
        assert!(matches!(load_tab(&store, "bad"), Err(TabError::Malformed(_))));
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn test_new_tab_ids_are_distinct() {
        assert_ne!(new_tab_id(), new_tab_id());
    }
}
