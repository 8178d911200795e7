//! Editing session: a document plus change notification
//!
//! Views subscribe to a session and are told which part of the document an
//! edit touched, so they can redraw only that part. Every notified edit bumps
//! the revision counter.

use serde::{Deserialize, Serialize};

use crate::document::TabDocument;
use crate::error::Result;

/// Which part of the document an edit touched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    /// The whole document was replaced
    Document,
    /// Title, meter or line breaks
    Header,
    /// A guitar view was created
    Guitar,
    Notes,
    Ties,
    Annotations,
    Chords,
}

pub type Listener = Box<dyn FnMut(&Change) + Send>;

/// Handle returned by [`TabSession::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

pub struct TabSession {
    document: TabDocument,
    revision: u64,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: usize,
}

impl std::fmt::Debug for TabSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabSession")
            .field("document", &self.document)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for TabSession {
    fn default() -> Self {
        Self::new(TabDocument::default())
    }
}

impl TabSession {
    pub fn new(document: TabDocument) -> Self {
        Self {
            document,
            revision: 0,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn document(&self) -> &TabDocument {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Drop a listener; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Run `mutation` against the document, then notify listeners of `change`
    pub fn edit<R>(&mut self, change: Change, mutation: impl FnOnce(&mut TabDocument) -> R) -> R {
        let result = mutation(&mut self.document);
        self.notify(change);
        result
    }

    /// Like [`edit`](Self::edit), but listeners hear nothing when the
    /// mutation fails
    pub fn try_edit<R>(
        &mut self,
        change: Change,
        mutation: impl FnOnce(&mut TabDocument) -> Result<R>,
    ) -> Result<R> {
        let result = mutation(&mut self.document)?;
        self.notify(change);
        Ok(result)
    }

    /// Like [`edit`](Self::edit), for edits that may turn out to be no-ops:
    /// listeners are only notified when `mutation` returns `Some`
    pub fn edit_if<R>(
        &mut self,
        change: Change,
        mutation: impl FnOnce(&mut TabDocument) -> Option<R>,
    ) -> Option<R> {
        let result = mutation(&mut self.document)?;
        self.notify(change);
        Some(result)
    }

    /// Run a query that needs a store view but changes nothing; listeners
    /// are not notified and the revision stays put
    pub fn query<R>(&mut self, read: impl FnOnce(&mut TabDocument) -> R) -> R {
        read(&mut self.document)
    }

    /// Swap in a new document and return the old one
    pub fn replace_document(&mut self, document: TabDocument) -> TabDocument {
        let previous = std::mem::replace(&mut self.document, document);
        self.notify(Change::Document);
        previous
    }

    pub fn into_document(self) -> TabDocument {
        self.document
    }

    fn notify(&mut self, change: Change) {
        self.revision += 1;
        log::trace!("revision {}: {:?} changed", self.revision, change);
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }
}
