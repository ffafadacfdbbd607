use camino::Utf8PathBuf;
use rustc_hash::FxHashMap;
use stratum_source::SnapshotId;

use crate::VirtualFile;

/// Per-file-name version counters for virtual files.
///
/// A version is bumped only when the file's snapshot identity changes,
/// which gives downstream consumers a cheap "did this change" check
/// without diffing content.
#[derive(Debug, Default)]
pub struct VersionTracker {
    versions: FxHashMap<Utf8PathBuf, (SnapshotId, u64)>,
}

impl VersionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version of `file`, bumping it first if the snapshot
    /// identity moved since the last call. Counting starts at one: the
    /// first observation of a file name is already version 1.
    pub fn version_of(&mut self, file: &VirtualFile) -> u64 {
        let id = file.snapshot.id();
        match self.versions.get_mut(&file.file_name) {
            Some((seen, version)) => {
                if *seen != id {
                    *seen = id;
                    *version += 1;
                }
                *version
            }
            None => {
                self.versions.insert(file.file_name.clone(), (id, 1));
                1
            }
        }
    }
}
