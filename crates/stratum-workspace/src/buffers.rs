//! Shared buffer storage for open documents
//!
//! Buffers hold the in-memory content of open files. The session manages
//! their lifecycle while [`crate::OverlayFileSystem`] reads through them,
//! so open-editor content wins over disk everywhere file content is
//! consumed.

use std::sync::Arc;

use dashmap::DashMap;
use url::Url;

use crate::document::TextDocument;

/// Shared storage of open documents, keyed by URL.
///
/// Clones share the same underlying map, which is what lets the overlay
/// file system observe the session's buffers without back-references.
#[derive(Clone, Debug, Default)]
pub struct Buffers {
    inner: Arc<DashMap<Url, TextDocument>>,
}

impl Buffers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, url: Url, document: TextDocument) {
        self.inner.insert(url, document);
    }

    pub fn update(&self, url: Url, document: TextDocument) {
        self.inner.insert(url, document);
    }

    #[must_use]
    pub fn close(&self, url: &Url) -> Option<TextDocument> {
        self.inner.remove(url).map(|(_, doc)| doc)
    }

    #[must_use]
    pub fn get(&self, url: &Url) -> Option<TextDocument> {
        self.inner.get(url).map(|entry| entry.clone())
    }

    #[must_use]
    pub fn contains(&self, url: &Url) -> bool {
        self.inner.contains_key(url)
    }
}
