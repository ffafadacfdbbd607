//! Custom `stratum/*` requests: project introspection and virtual-file
//! inspection, consumed by the editor-side tree views.

use std::collections::HashMap;
use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Deserialize;
use serde::Serialize;
use stratum_map::for_each_embedded;
use stratum_map::CapabilitySet;
use stratum_map::FileKind;
use stratum_map::Mapping;
use stratum_map::VirtualFile;
use stratum_workspace::LanguageService;
use stratum_workspace::Project;
use stratum_workspace::Workspace;
use stratum_workspace::Workspaces;
use tower_lsp_server::jsonrpc::Result as LspResult;
use tracing::debug;
use url::Url;

use crate::server::StratumLanguageServer;
use crate::session::Session;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfigParams {
    pub uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfigResult {
    pub config_path: Utf8PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsParams {
    /// When present, marks the project currently serving this file as
    /// selected.
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub root_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<Utf8PathBuf>,
    pub is_inferred: bool,
    /// Whether the analysis handle has actually been created yet.
    pub created: bool,
    pub is_selected: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilesParams {
    pub root: Utf8PathBuf,
    #[serde(default)]
    pub config_path: Option<Utf8PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualFilesParams {
    pub uri: String,
}

/// One node of the pruned virtual-file tree: structure, capabilities and
/// versions without content or mappings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualFileNode {
    pub file_name: Utf8PathBuf,
    pub kind: FileKind,
    pub capabilities: CapabilitySet,
    pub version: u64,
    pub embedded: Vec<VirtualFileNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualFileParams {
    pub uri: String,
    pub file_name: Utf8PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualFileContent {
    pub content: String,
    /// Mappings grouped by the document they translate from: the host
    /// source for a tree root, the parent generated file otherwise.
    pub mappings: HashMap<Utf8PathBuf, Vec<Mapping>>,
    /// Per-file generation traces forwarded verbatim from the engine.
    pub debug_trace: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteVirtualFilesParams {
    pub uri: String,
}

fn parse_uri(uri: &str) -> Option<Utf8PathBuf> {
    let url = Url::parse(uri).ok()?;
    stratum_workspace::url_to_path(&url)
}

fn project_root_uri(root: &Utf8Path) -> String {
    stratum_workspace::path_to_url(root).map_or_else(|| root.to_string(), |url| url.to_string())
}

/// One entry per resolved project, plus one inferred slot per workspace
/// whether or not that slot has been populated yet.
fn collect_project_infos(
    workspaces: &Workspaces,
    selected: Option<&Arc<Project>>,
) -> Vec<ProjectInfo> {
    let is_selected =
        |project: &Arc<Project>| selected.is_some_and(|selected| Arc::ptr_eq(selected, project));

    let mut infos = Vec::new();
    for workspace in workspaces.all() {
        for project in workspace.projects() {
            infos.push(ProjectInfo {
                root_uri: project_root_uri(project.root()),
                config_path: project.config_path().map(Utf8Path::to_path_buf),
                is_inferred: false,
                created: project.language_service_dont_create().is_some(),
                is_selected: is_selected(&project),
            });
        }
        let inferred = workspace.inferred_project_dont_create();
        infos.push(ProjectInfo {
            root_uri: project_root_uri(workspace.root()),
            config_path: None,
            is_inferred: true,
            created: inferred.is_some(),
            is_selected: inferred.as_ref().is_some_and(is_selected),
        });
    }
    infos
}

fn prune_tree(file: &VirtualFile, version_of: &mut impl FnMut(&VirtualFile) -> u64) -> VirtualFileNode {
    VirtualFileNode {
        file_name: file.file_name.clone(),
        kind: file.kind,
        capabilities: file.capabilities,
        version: version_of(file),
        embedded: file
            .embedded
            .iter()
            .map(|child| prune_tree(child, version_of))
            .collect(),
    }
}

/// Locate a file in a tree along with the name of the document its map
/// translates from.
fn find_with_parent<'a>(
    file: &'a VirtualFile,
    parent: &Utf8Path,
    target: &Utf8Path,
) -> Option<(&'a VirtualFile, Utf8PathBuf)> {
    if file.file_name == target {
        return Some((file, parent.to_path_buf()));
    }
    file.embedded
        .iter()
        .find_map(|child| find_with_parent(child, &file.file_name, target))
}

fn generated_document(
    root: &VirtualFile,
    source: &Utf8Path,
    file_name: &Utf8Path,
) -> Option<VirtualFileContent> {
    let (file, parent) = find_with_parent(root, source, file_name)?;
    let mut mappings = HashMap::new();
    mappings.insert(parent, file.map.mappings().to_vec());
    Some(VirtualFileContent {
        content: file.snapshot.text().to_string(),
        mappings,
        debug_trace: file.debug_trace.clone(),
    })
}

/// Every host-persistable generated file under the project root, across
/// all of the engine's current sources.
fn persistable_files(
    service: &dyn LanguageService,
    project_root: &Utf8Path,
) -> Vec<(Utf8PathBuf, String)> {
    let mut files = Vec::new();
    for source in service.script_file_names() {
        let Some(root) = service.virtual_root(&source) else {
            continue;
        };
        for_each_embedded(&root, &mut |file| {
            if file.kind != FileKind::HostPersistable {
                return;
            }
            if !file.file_name.starts_with(project_root) {
                debug!("skipping {} outside project root", file.file_name);
                return;
            }
            files.push((file.file_name.clone(), file.snapshot.text().to_string()));
        });
    }
    files
}

impl StratumLanguageServer {
    async fn workspaces(&self) -> Option<Arc<Workspaces>> {
        self.with_session(Session::workspaces).await
    }

    /// `stratum/matchConfig`: the governing config file for a source file.
    pub async fn match_config(
        &self,
        params: MatchConfigParams,
    ) -> LspResult<Option<MatchConfigResult>> {
        let Some(workspaces) = self.workspaces().await else {
            return Ok(None);
        };
        let Some(path) = parse_uri(&params.uri) else {
            return Ok(None);
        };

        let resolved = workspaces.get_project(&path).await;
        Ok(resolved
            .and_then(|resolved| resolved.config_path)
            .map(|config_path| MatchConfigResult { config_path }))
    }

    /// `stratum/projects`: every project in every workspace.
    pub async fn projects(&self, params: ProjectsParams) -> LspResult<Vec<ProjectInfo>> {
        let Some(workspaces) = self.workspaces().await else {
            return Ok(Vec::new());
        };

        let selected = match params.uri.as_deref().and_then(parse_uri) {
            Some(path) => workspaces.get_project(&path).await.map(|r| r.project),
            None => None,
        };
        Ok(collect_project_infos(&workspaces, selected.as_ref()))
    }

    /// `stratum/projectFiles`: the engine's current file list for one
    /// project, identified by workspace root and config path.
    pub async fn project_files(&self, params: ProjectFilesParams) -> LspResult<Vec<Utf8PathBuf>> {
        let Some(workspaces) = self.workspaces().await else {
            return Ok(Vec::new());
        };
        let Some(workspace) = workspaces
            .all()
            .into_iter()
            .find(|workspace: &Arc<Workspace>| workspace.root() == params.root)
        else {
            return Ok(Vec::new());
        };

        let project = match &params.config_path {
            Some(config_path) => workspace
                .projects()
                .into_iter()
                .find(|project| project.config_path() == Some(config_path.as_path())),
            None => workspace.inferred_project_dont_create(),
        };
        let Some(project) = project else {
            return Ok(Vec::new());
        };

        Ok(project.language_service().await.script_file_names())
    }

    /// `stratum/virtualFiles`: the pruned virtual-file tree derived from
    /// one host source file.
    pub async fn virtual_files(
        &self,
        params: VirtualFilesParams,
    ) -> LspResult<Option<VirtualFileNode>> {
        let Some(source) = parse_uri(&params.uri) else {
            return Ok(None);
        };
        let Some(workspaces) = self.workspaces().await else {
            return Ok(None);
        };
        let Some(resolved) = workspaces.get_project(&source).await else {
            return Ok(None);
        };
        let service = resolved.project.language_service().await;
        let Some(root) = service.virtual_root(&source) else {
            return Ok(None);
        };

        let session = self.session.read().await;
        Ok(Some(prune_tree(&root, &mut |file| session.version_of(file))))
    }

    /// `stratum/virtualFile`: content, mappings and generation traces of
    /// one generated file.
    pub async fn virtual_file(
        &self,
        params: VirtualFileParams,
    ) -> LspResult<Option<VirtualFileContent>> {
        let Some(source) = parse_uri(&params.uri) else {
            return Ok(None);
        };
        let Some(workspaces) = self.workspaces().await else {
            return Ok(None);
        };
        let Some(resolved) = workspaces.get_project(&source).await else {
            return Ok(None);
        };
        let service = resolved.project.language_service().await;
        let Some(root) = service.virtual_root(&source) else {
            return Ok(None);
        };

        Ok(generated_document(&root, &source, &params.file_name))
    }

    /// `stratum/reloadProjects`: dispose and recreate every project.
    pub async fn reload_projects(&self) -> LspResult<()> {
        if let Some(workspaces) = self.workspaces().await {
            workspaces.reload_all();
        }
        Ok(())
    }

    /// `stratum/writeVirtualFiles`: persist every host-persistable
    /// generated file of the selected project to disk, best effort. The
    /// uri only picks the project; all of its sources are walked.
    pub async fn write_virtual_files(&self, params: WriteVirtualFilesParams) -> LspResult<()> {
        let Some(source) = parse_uri(&params.uri) else {
            return Ok(());
        };
        let Some(workspaces) = self.workspaces().await else {
            return Ok(());
        };
        let Some(resolved) = workspaces.get_project(&source).await else {
            return Ok(());
        };
        let Some(service) = resolved.project.language_service_dont_create() else {
            return Ok(());
        };

        for (path, content) in persistable_files(service.as_ref(), resolved.project.root()) {
            tokio::spawn(async move {
                if let Err(err) = tokio::fs::write(path.as_std_path(), content).await {
                    debug!("failed to write {path}: {err}");
                }
            });
        }
        Ok(())
    }
}
