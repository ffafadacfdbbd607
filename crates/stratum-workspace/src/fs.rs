//! File system capability
//!
//! All filesystem access in the core goes through the async [`FileSystem`]
//! trait: stat, exists, read. Missing paths are absent results, never
//! errors. The overlay implementation layers open-editor buffers over a
//! disk fallback.

use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8Path;
use camino::Utf8PathBuf;

use crate::buffers::Buffers;
use crate::collections::FxDashMap;
use crate::paths::normalize_path;
use crate::paths::path_to_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Stat a path, absent when it does not exist.
    async fn stat(&self, path: &Utf8Path) -> Option<FileType>;

    /// Read the entire contents of a file, absent when missing or unreadable.
    async fn read_to_string(&self, path: &Utf8Path) -> Option<String>;

    async fn exists(&self, path: &Utf8Path) -> bool {
        self.stat(path).await.is_some()
    }
}

/// Standard file system backed by `tokio::fs`.
pub struct OsFileSystem;

#[async_trait]
impl FileSystem for OsFileSystem {
    async fn stat(&self, path: &Utf8Path) -> Option<FileType> {
        let metadata = tokio::fs::metadata(path.as_std_path()).await.ok()?;
        if metadata.is_dir() {
            Some(FileType::Directory)
        } else {
            Some(FileType::File)
        }
    }

    async fn read_to_string(&self, path: &Utf8Path) -> Option<String> {
        tokio::fs::read_to_string(path.as_std_path()).await.ok()
    }
}

/// File system that serves open-buffer content before falling back to disk.
///
/// Buffers are never directories, so stat only consults them for the
/// `File` case.
pub struct OverlayFileSystem {
    buffers: Buffers,
    disk: Arc<dyn FileSystem>,
}

impl OverlayFileSystem {
    #[must_use]
    pub fn new(buffers: Buffers, disk: Arc<dyn FileSystem>) -> Self {
        Self { buffers, disk }
    }

    fn buffered(&self, path: &Utf8Path) -> Option<String> {
        let url = path_to_url(path)?;
        self.buffers.get(&url).map(|doc| doc.content().to_string())
    }
}

#[async_trait]
impl FileSystem for OverlayFileSystem {
    async fn stat(&self, path: &Utf8Path) -> Option<FileType> {
        if self.buffered(path).is_some() {
            return Some(FileType::File);
        }
        self.disk.stat(path).await
    }

    async fn read_to_string(&self, path: &Utf8Path) -> Option<String> {
        if let Some(content) = self.buffered(path) {
            return Some(content);
        }
        self.disk.read_to_string(path).await
    }
}

/// In-memory file system for tests and fixtures.
///
/// Directories are implied: any strict prefix of a stored file path stats
/// as a directory.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: FxDashMap<Utf8PathBuf, String>,
}

impl MemoryFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Utf8Path>, content: impl Into<String>) {
        self.files
            .insert(normalize_path(path.as_ref()), content.into());
    }

    pub fn remove_file(&self, path: &Utf8Path) {
        self.files.remove(&normalize_path(path));
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn stat(&self, path: &Utf8Path) -> Option<FileType> {
        let path = normalize_path(path);
        if self.files.contains_key(&path) {
            return Some(FileType::File);
        }

        let prefix = format!("{path}/");
        if self
            .files
            .iter()
            .any(|entry| entry.key().as_str().starts_with(&prefix))
        {
            return Some(FileType::Directory);
        }

        None
    }

    async fn read_to_string(&self, path: &Utf8Path) -> Option<String> {
        self.files
            .get(&normalize_path(path))
            .map(|entry| entry.value().clone())
    }
}
