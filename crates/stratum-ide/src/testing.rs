//! Shared fixtures for dispatcher tests: one host file deriving a root
//! generated file with two embedded layers.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use stratum_conf::Settings;
use stratum_map::CapabilitySet;
use stratum_map::FileKind;
use stratum_map::Mapping;
use stratum_map::RenameCapability;
use stratum_map::SourceMap;
use stratum_map::VirtualFile;
use stratum_source::Snapshot;
use stratum_source::TextRange;
use stratum_workspace::CancellationToken;
use stratum_workspace::LanguageService;
use stratum_workspace::LanguageServiceFactory;
use stratum_workspace::MemoryFileSystem;
use stratum_workspace::ProjectContext;
use stratum_workspace::ServiceError;
use stratum_workspace::Workspaces;

#[derive(Default, Clone)]
pub(crate) struct CallLog {
    calls: Arc<Mutex<Vec<Utf8PathBuf>>>,
}

impl CallLog {
    pub(crate) fn record(&self, file_name: &Utf8Path) {
        self.calls.lock().unwrap().push(file_name.to_path_buf());
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<Utf8PathBuf> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

fn layer_mapping(source: (u32, u32), generated: (u32, u32), caps: CapabilitySet) -> Mapping {
    Mapping::new(
        TextRange::new(source.0, source.1),
        TextRange::new(generated.0, generated.1),
        caps,
    )
}

/// host [0,10) -> root [100,110); root -> l1 [200,210) (rename disabled for
/// preparation) and l2 [300,310) (fully capable).
fn fixture_tree() -> Arc<VirtualFile> {
    let mut l1_caps = CapabilitySet::full();
    l1_caps.rename = Some(RenameCapability::WithNormalization { normalize: false });

    let l1 = VirtualFile::new(
        "/proj/src/a.ts.l1",
        FileKind::Embedded,
        l1_caps,
        Snapshot::new(""),
        SourceMap::new(vec![layer_mapping((100, 110), (200, 210), l1_caps)]),
    );
    let l2 = VirtualFile::new(
        "/proj/src/a.ts.l2",
        FileKind::Embedded,
        CapabilitySet::full(),
        Snapshot::new(""),
        SourceMap::new(vec![layer_mapping(
            (100, 110),
            (300, 310),
            CapabilitySet::full(),
        )]),
    );
    let root = VirtualFile::new(
        "/proj/src/a.ts.root",
        FileKind::Embedded,
        CapabilitySet::full(),
        Snapshot::new(""),
        SourceMap::new(vec![layer_mapping(
            (0, 10),
            (100, 110),
            CapabilitySet::full(),
        )]),
    )
    .with_embedded(vec![l1, l2]);

    Arc::new(root)
}

struct StubService {
    tree: Arc<VirtualFile>,
}

#[async_trait]
impl LanguageService for StubService {
    fn script_file_names(&self) -> Vec<Utf8PathBuf> {
        vec![Utf8PathBuf::from("/proj/src/a.ts")]
    }

    fn virtual_root(&self, source: &Utf8Path) -> Option<Arc<VirtualFile>> {
        (source == "/proj/src/a.ts").then(|| self.tree.clone())
    }

    async fn provide_rename_range(
        &self,
        file_name: &Utf8Path,
        offset: u32,
        _token: &CancellationToken,
    ) -> Option<Result<TextRange, ServiceError>> {
        // Only the second embedded layer knows how to answer.
        (file_name == "/proj/src/a.ts.l2").then(|| Ok(TextRange::new(offset + 1, offset + 3)))
    }
}

struct StubFactory;

#[async_trait]
impl LanguageServiceFactory for StubFactory {
    async fn create(&self, _context: ProjectContext) -> Arc<dyn LanguageService> {
        Arc::new(StubService {
            tree: fixture_tree(),
        })
    }
}

/// A workspace rooted at `/proj` whose config lists `src/a.ts`, backed by
/// the stub engine above.
pub(crate) fn fixture_workspaces() -> Workspaces {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/proj/tsconfig.json", r#"{ "files": ["src/a.ts"] }"#);

    let workspaces = Workspaces::new(fs, Arc::new(StubFactory), Arc::new(Settings::default()));
    workspaces.add_root(Utf8Path::new("/proj"));
    workspaces
}
