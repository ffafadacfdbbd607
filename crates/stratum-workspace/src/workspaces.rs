//! All workspace roots served by one session.

use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use stratum_conf::Settings;
use url::Url;

use crate::engine::LanguageServiceFactory;
use crate::fs::FileSystem;
use crate::path_map::PathMap;
use crate::paths::url_to_path;
use crate::project::Project;
use crate::workspace::FileChange;
use crate::workspace::Workspace;

/// The project serving one resolved file.
#[derive(Clone)]
pub struct ResolvedProject {
    pub workspace: Arc<Workspace>,
    pub config_path: Option<Utf8PathBuf>,
    pub project: Arc<Project>,
}

pub struct Workspaces {
    fs: Arc<dyn FileSystem>,
    factory: Arc<dyn LanguageServiceFactory>,
    settings: Arc<Settings>,
    workspaces: PathMap<Arc<Workspace>>,
}

impl Workspaces {
    #[must_use]
    pub fn new(
        fs: Arc<dyn FileSystem>,
        factory: Arc<dyn LanguageServiceFactory>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            fs,
            factory,
            settings,
            workspaces: PathMap::new(),
        }
    }

    pub fn add_root(&self, root: &Utf8Path) -> Arc<Workspace> {
        self.workspaces.get_or_insert_with(root, || {
            Arc::new(Workspace::new(
                root.to_path_buf(),
                self.fs.clone(),
                self.factory.clone(),
                self.settings.clone(),
            ))
        })
    }

    #[must_use]
    pub fn all(&self) -> Vec<Arc<Workspace>> {
        self.workspaces.values()
    }

    #[must_use]
    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// The workspace serving a file: the deepest root containing it, or
    /// any workspace as a last resort so out-of-root files still reach an
    /// inferred project.
    #[must_use]
    pub fn workspace_for(&self, file: &Utf8Path) -> Option<Arc<Workspace>> {
        let mut candidates: Vec<Arc<Workspace>> = self
            .workspaces
            .values()
            .into_iter()
            .filter(|ws| file.starts_with(ws.root()))
            .collect();
        candidates.sort_by_key(|ws| std::cmp::Reverse(ws.root().as_str().len()));

        candidates
            .into_iter()
            .next()
            .or_else(|| self.workspaces.values().into_iter().next())
    }

    /// Resolve the project for a file across all roots.
    pub async fn get_project(&self, file: &Utf8Path) -> Option<ResolvedProject> {
        let workspace = self.workspace_for(file)?;
        let (config_path, project) = workspace.get_project_and_config(file).await;
        Some(ResolvedProject {
            workspace,
            config_path,
            project,
        })
    }

    /// Resolve by URL, the protocol-boundary entry point.
    pub async fn get_project_by_url(&self, url: &Url) -> Option<ResolvedProject> {
        let path = url_to_path(url)?;
        self.get_project(&path).await
    }

    /// Fan a watched-file notification out to every workspace; each one
    /// decides whether the path concerns it.
    pub fn handle_file_change(&self, path: &Utf8Path, change: FileChange) {
        for workspace in self.workspaces.values() {
            workspace.handle_file_change(path, change);
        }
    }

    /// Dispose and recreate every project in every workspace.
    pub fn reload_all(&self) {
        for workspace in self.workspaces.values() {
            workspace.reload();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NullLanguageServiceFactory;
    use crate::fs::MemoryFileSystem;

    fn workspaces(fs: Arc<MemoryFileSystem>) -> Workspaces {
        Workspaces::new(
            fs,
            Arc::new(NullLanguageServiceFactory),
            Arc::new(Settings::default()),
        )
    }

    #[tokio::test]
    async fn deepest_root_wins() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/proj/tsconfig.json", r#"{ "files": ["a.ts"] }"#);
        fs.add_file("/proj/nested/tsconfig.json", r#"{ "files": ["b.ts"] }"#);
        fs.add_file("/proj/nested/b.ts", "");

        let all = workspaces(fs);
        all.add_root(Utf8Path::new("/proj"));
        let nested = all.add_root(Utf8Path::new("/proj/nested"));

        let chosen = all.workspace_for(Utf8Path::new("/proj/nested/b.ts")).unwrap();
        assert!(Arc::ptr_eq(&chosen, &nested));
    }

    #[tokio::test]
    async fn out_of_root_file_still_gets_a_workspace() {
        let fs = Arc::new(MemoryFileSystem::new());
        let all = workspaces(fs);
        all.add_root(Utf8Path::new("/proj"));

        let resolved = all.get_project(Utf8Path::new("/elsewhere/x.ts")).await;
        assert!(resolved.is_some_and(|r| r.project.is_inferred()));
    }

    #[tokio::test]
    async fn add_root_is_idempotent() {
        let fs = Arc::new(MemoryFileSystem::new());
        let all = workspaces(fs);
        let first = all.add_root(Utf8Path::new("/proj"));
        let second = all.add_root(Utf8Path::new("/proj"));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn reload_all_covers_every_root() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_file("/a/tsconfig.json", r#"{ "files": ["x.ts"] }"#);
        fs.add_file("/a/x.ts", "");
        fs.add_file("/b/tsconfig.json", r#"{ "files": ["y.ts"] }"#);
        fs.add_file("/b/y.ts", "");

        let all = workspaces(fs);
        all.add_root(Utf8Path::new("/a"));
        all.add_root(Utf8Path::new("/b"));

        let first = all.get_project(Utf8Path::new("/a/x.ts")).await.unwrap();
        let second = all.get_project(Utf8Path::new("/b/y.ts")).await.unwrap();

        all.reload_all();
        assert!(first.project.is_disposed());
        assert!(second.project.is_disposed());
    }
}
