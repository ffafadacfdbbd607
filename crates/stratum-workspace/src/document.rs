//! Open-document representation with pre-computed line indexing.

use stratum_source::LineIndex;
use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

/// In-memory content of an open editor document.
///
/// Carries the LSP version for synchronization and a [`LineIndex`] so
/// position lookups don't rescan the text.
#[derive(Clone, Debug)]
pub struct TextDocument {
    content: String,
    version: i32,
    line_index: LineIndex,
}

impl TextDocument {
    #[must_use]
    pub fn new(content: String, version: i32) -> Self {
        let line_index = LineIndex::new(&content);
        Self {
            content,
            version,
            line_index,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Apply LSP content changes. Only full-document replacement is
    /// supported; ranged changes replace the whole buffer with their text.
    pub fn update(&mut self, changes: Vec<TextDocumentContentChangeEvent>, version: i32) {
        for change in changes {
            self.content = change.text;
            self.line_index = LineIndex::new(&self.content);
        }
        self.version = version;
    }
}
