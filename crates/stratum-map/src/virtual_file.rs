use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Serialize;
use stratum_source::Snapshot;
use stratum_source::TextRange;

use crate::CapabilitySet;
use crate::SourceMap;

/// Classification of a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    /// Exists only for analysis, never written to disk.
    Embedded,
    /// May be persisted next to the host sources on request.
    HostPersistable,
}

/// One generated file, owning its nested embedded files.
///
/// The tree root corresponds 1:1 to one host source file. The root's map
/// translates host-source offsets to the root's generated offsets; each
/// embedded file's map translates its immediate parent's generated offsets
/// to its own. Trees are rebuilt wholesale whenever the host snapshot
/// changes, never patched.
#[derive(Debug, Clone)]
pub struct VirtualFile {
    pub file_name: Utf8PathBuf,
    pub kind: FileKind,
    pub capabilities: CapabilitySet,
    pub snapshot: Snapshot,
    /// Mappings relative to the immediate parent (the host source for the
    /// tree root).
    pub map: SourceMap,
    /// Opaque per-file generation traces supplied by the engine that
    /// produced this file; forwarded verbatim to inspection consumers.
    pub debug_trace: Vec<serde_json::Value>,
    pub embedded: Vec<VirtualFile>,
}

impl VirtualFile {
    #[must_use]
    pub fn new(
        file_name: impl Into<Utf8PathBuf>,
        kind: FileKind,
        capabilities: CapabilitySet,
        snapshot: Snapshot,
        map: SourceMap,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            capabilities,
            snapshot,
            map,
            debug_trace: Vec::new(),
            embedded: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_embedded(mut self, embedded: Vec<VirtualFile>) -> Self {
        self.embedded = embedded;
        self
    }

    #[must_use]
    pub fn with_debug_trace(mut self, debug_trace: Vec<serde_json::Value>) -> Self {
        self.debug_trace = debug_trace;
        self
    }

    /// Find a file in this tree by name.
    #[must_use]
    pub fn find(&self, file_name: &Utf8Path) -> Option<&VirtualFile> {
        let mut found = None;
        for_each_embedded(self, &mut |file| {
            if found.is_none() && file.file_name == file_name {
                found = Some(file);
            }
        });
        found
    }

    /// Translate a host-source offset into every generated position in the
    /// tree whose mapping capabilities satisfy `filter`.
    ///
    /// Composition is layerwise: a source point with no counterpart at
    /// layer k has none at layer k+1, so a layer yielding zero results
    /// truncates that branch. Sibling embedded files claiming overlapping
    /// source ranges are all explored; callers merge among the results.
    #[must_use]
    pub fn mapped_offsets<'a, F>(&'a self, source_offset: u32, filter: &F) -> Vec<MappedOffset<'a>>
    where
        F: Fn(&CapabilitySet) -> bool,
    {
        let mut results = Vec::new();
        collect_mapped(self, &[source_offset], &[], filter, &mut results);
        results
    }
}

/// A generated position produced by [`VirtualFile::mapped_offsets`],
/// carrying the explicit stack of maps traversed so the result can be
/// translated back without re-walking the tree.
pub struct MappedOffset<'a> {
    pub file: &'a VirtualFile,
    pub offset: u32,
    /// Maps from this file up to the tree root, leaf first.
    stack: Vec<&'a SourceMap>,
}

impl MappedOffset<'_> {
    /// Translate a range in this file's coordinates back to host-source
    /// coordinates, concatenating `to_source_range` bottom-up.
    #[must_use]
    pub fn to_source_range(&self, range: TextRange) -> Option<TextRange> {
        self.stack
            .iter()
            .try_fold(range, |range, map| map.to_source_range(range))
    }
}

fn collect_mapped<'a, F>(
    file: &'a VirtualFile,
    parent_offsets: &[u32],
    parent_stack: &[&'a SourceMap],
    filter: &F,
    results: &mut Vec<MappedOffset<'a>>,
) where
    F: Fn(&CapabilitySet) -> bool,
{
    let mut stack = vec![&file.map];
    stack.extend_from_slice(parent_stack);

    let mut offsets = Vec::new();
    for &parent_offset in parent_offsets {
        for (offset, _) in file.map.to_generated_offsets(parent_offset, filter) {
            offsets.push(offset);
        }
    }

    if offsets.is_empty() {
        return;
    }

    for child in &file.embedded {
        collect_mapped(child, &offsets, &stack, filter, results);
    }

    for offset in offsets {
        results.push(MappedOffset {
            file,
            offset,
            stack: stack.clone(),
        });
    }
}

/// Depth-first traversal over a virtual file tree, visiting the root first.
pub fn for_each_embedded<'a>(file: &'a VirtualFile, visitor: &mut dyn FnMut(&'a VirtualFile)) {
    visitor(file);
    for child in &file.embedded {
        for_each_embedded(child, visitor);
    }
}
