use camino::Utf8Path;
use camino::Utf8PathBuf;
use url::Url;

use crate::collections::FxDashMap;
use crate::paths::normalize_path;
use crate::paths::url_to_path;

/// A file-keyed map addressable by normalized path and by `file://` URL.
///
/// One canonical path-keyed store; URL lookups go through the same
/// normalization as path lookups, so the two views can never diverge.
#[derive(Debug)]
pub struct PathMap<V> {
    inner: FxDashMap<Utf8PathBuf, V>,
}

impl<V> PathMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FxDashMap::default(),
        }
    }

    pub fn insert(&self, path: &Utf8Path, value: V) {
        self.inner.insert(normalize_path(path), value);
    }

    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.inner.contains_key(&normalize_path(path))
    }

    #[must_use]
    pub fn contains_url(&self, url: &Url) -> bool {
        url_to_path(url).is_some_and(|path| self.inner.contains_key(&path))
    }

    pub fn remove(&self, path: &Utf8Path) -> Option<V> {
        self.inner.remove(&normalize_path(path)).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<Utf8PathBuf> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl<V: Clone> PathMap<V> {
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<V> {
        self.inner
            .get(&normalize_path(path))
            .map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn get_by_url(&self, url: &Url) -> Option<V> {
        let path = url_to_path(url)?;
        self.inner.get(&path).map(|entry| entry.value().clone())
    }

    /// Insert-if-absent returning the winning value, so concurrent callers
    /// racing on the same key observe the same entry.
    pub fn get_or_insert_with(&self, path: &Utf8Path, make: impl FnOnce() -> V) -> V {
        self.inner
            .entry(normalize_path(path))
            .or_insert_with(make)
            .value()
            .clone()
    }

    #[must_use]
    pub fn values(&self) -> Vec<V> {
        self.inner
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl<V> Default for PathMap<V> {
    fn default() -> Self {
        Self::new()
    }
}
