//! Per-connection server state.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use camino::Utf8PathBuf;
use stratum_conf::Settings;
use stratum_map::VersionTracker;
use stratum_map::VirtualFile;
use stratum_workspace::Buffers;
use stratum_workspace::LanguageServiceFactory;
use stratum_workspace::OsFileSystem;
use stratum_workspace::OverlayFileSystem;
use stratum_workspace::Workspaces;

/// Everything the server holds for one client connection.
///
/// Workspaces come into existence at `initialize`, once the client has
/// told us its roots; before that, document notifications only touch the
/// open buffers.
pub struct Session {
    settings: Arc<Settings>,
    buffers: Buffers,
    factory: Arc<dyn LanguageServiceFactory>,
    workspaces: Option<Arc<Workspaces>>,
    versions: Mutex<VersionTracker>,
}

impl Session {
    #[must_use]
    pub fn new(factory: Arc<dyn LanguageServiceFactory>) -> Self {
        Self {
            settings: Arc::new(Settings::default()),
            buffers: Buffers::new(),
            factory,
            workspaces: None,
            versions: Mutex::new(VersionTracker::new()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    #[must_use]
    pub fn buffers(&self) -> &Buffers {
        &self.buffers
    }

    #[must_use]
    pub fn workspaces(&self) -> Option<Arc<Workspaces>> {
        self.workspaces.clone()
    }

    /// Stand up the workspace set for the client's roots.
    ///
    /// All file reads go through an overlay over the open buffers, so
    /// unsaved edits are visible to config parsing and the engine alike.
    pub fn open_workspaces(&mut self, roots: &[Utf8PathBuf], settings: Settings) {
        self.settings = Arc::new(settings);

        let disk = Arc::new(OsFileSystem);
        let fs = Arc::new(OverlayFileSystem::new(self.buffers.clone(), disk));
        let workspaces = Arc::new(Workspaces::new(
            fs,
            self.factory.clone(),
            self.settings.clone(),
        ));
        for root in roots {
            workspaces.add_root(root);
        }
        self.workspaces = Some(workspaces);
    }

    /// Current version of a virtual file, bumped when its snapshot
    /// identity moved since the last query.
    pub fn version_of(&self, file: &VirtualFile) -> u64 {
        self.versions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .version_of(file)
    }
}
