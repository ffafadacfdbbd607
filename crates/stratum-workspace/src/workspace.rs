//! One workspace root: the set of projects discovered under it, the
//! inferred-project singleton, and watched-file routing.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use stratum_conf::Settings;
use tracing::info;

use crate::collections::FxDashSet;
use crate::engine::LanguageServiceFactory;
use crate::fs::FileSystem;
use crate::path_map::PathMap;
use crate::paths::normalize_path;
use crate::project::Project;

/// Candidate config file names, in tie-break priority order.
pub const ROOT_CONFIG_NAMES: [&str; 2] = ["tsconfig.json", "jsconfig.json"];

/// A discrete watched-file notification, already filtered to one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    Created,
    Changed,
    Deleted,
}

pub struct Workspace {
    root: Utf8PathBuf,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) factory: Arc<dyn LanguageServiceFactory>,
    pub(crate) settings: Arc<Settings>,
    pub(crate) projects: PathMap<Arc<Project>>,
    inferred: Mutex<Option<Arc<Project>>>,
    /// Root-level config candidates discovered by ancestor walks and
    /// watch events.
    pub(crate) root_configs: FxDashSet<Utf8PathBuf>,
    /// Directories already walked, so repeat resolutions skip the stat
    /// probes.
    pub(crate) searched_dirs: FxDashSet<Utf8PathBuf>,
}

impl Workspace {
    #[must_use]
    pub fn new(
        root: Utf8PathBuf,
        fs: Arc<dyn FileSystem>,
        factory: Arc<dyn LanguageServiceFactory>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            root: normalize_path(&root),
            fs,
            factory,
            settings,
            projects: PathMap::new(),
            inferred: Mutex::new(None),
            root_configs: FxDashSet::default(),
            searched_dirs: FxDashSet::default(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn projects(&self) -> Vec<Arc<Project>> {
        self.projects.values()
    }

    /// Resolve the governing config for a file and return its project,
    /// falling back to the inferred project when nothing matches.
    ///
    /// A resolved file is recorded in the project's asked-files set so
    /// later indirect-membership checks short-circuit.
    pub async fn get_project_and_config(
        &self,
        file: &Utf8Path,
    ) -> (Option<Utf8PathBuf>, Arc<Project>) {
        if let Some(config) = self.find_match_config(file).await {
            let project = self.get_or_create_project(&config);
            project.mark_asked(file);
            (Some(config), project)
        } else {
            (None, self.inferred_project())
        }
    }

    pub(crate) fn get_or_create_project(&self, config: &Utf8Path) -> Arc<Project> {
        self.projects.get_or_insert_with(config, || {
            let root = config
                .parent()
                .map_or_else(|| self.root.clone(), Utf8Path::to_path_buf);
            Arc::new(Project::new(
                root,
                normalize_path(config),
                self.fs.clone(),
                self.factory.clone(),
            ))
        })
    }

    /// The inferred-project singleton, created lazily at most once per
    /// workspace. The entry is written before any await point, so a
    /// competing request observes the same project.
    pub fn inferred_project(&self) -> Arc<Project> {
        let mut guard = self
            .inferred
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .get_or_insert_with(|| {
                Arc::new(Project::inferred(
                    self.root.clone(),
                    self.settings.inferred_options.clone(),
                    self.fs.clone(),
                    self.factory.clone(),
                ))
            })
            .clone()
    }

    #[must_use]
    pub fn inferred_project_dont_create(&self) -> Option<Arc<Project>> {
        self.inferred
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Route one watched-file notification.
    ///
    /// Only root-config files are interesting: a creation under this root
    /// becomes a candidate, a change or deletion disposes the affected
    /// project before any queued request can resolve against it.
    pub fn handle_file_change(&self, path: &Utf8Path, change: FileChange) {
        let Some(name) = path.file_name() else {
            return;
        };
        if !ROOT_CONFIG_NAMES.contains(&name) {
            return;
        }

        let path = normalize_path(path);
        match change {
            FileChange::Created => {
                if path.starts_with(&self.root) {
                    self.root_configs.insert(path);
                }
            }
            FileChange::Changed | FileChange::Deleted => {
                if change == FileChange::Deleted {
                    self.root_configs.remove(&path);
                }
                if let Some(project) = self.projects.remove(&path) {
                    project.dispose();
                }
            }
        }
    }

    /// Dispose and forget every project, including the inferred one.
    /// Discovered config candidates survive; they are re-validated on the
    /// next resolution.
    pub fn reload(&self) {
        info!("reloading workspace {}", self.root);
        for project in self.projects.values() {
            project.dispose();
        }
        self.projects.clear();

        let mut guard = self
            .inferred
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(inferred) = guard.take() {
            inferred.dispose();
        }
    }

    pub fn dispose(&self) {
        self.reload();
    }
}
