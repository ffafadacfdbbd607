use std::sync::Arc;

use camino::Utf8PathBuf;
use stratum_conf::Settings;
use stratum_ide::prepare_rename;
use stratum_ide::CancellationToken;
use stratum_source::LineIndex;
use stratum_workspace::lsp_uri_to_path;
use stratum_workspace::FileChange;
use stratum_workspace::FileSystem;
use stratum_workspace::LanguageServiceFactory;
use stratum_workspace::TextDocument;
use tokio::sync::RwLock;
use tower_lsp_server::jsonrpc;
use tower_lsp_server::jsonrpc::Result as LspResult;
use tower_lsp_server::ls_types::DidChangeTextDocumentParams;
use tower_lsp_server::ls_types::DidChangeWatchedFilesParams;
use tower_lsp_server::ls_types::DidCloseTextDocumentParams;
use tower_lsp_server::ls_types::DidOpenTextDocumentParams;
use tower_lsp_server::ls_types::FileChangeType;
use tower_lsp_server::ls_types::InitializeParams;
use tower_lsp_server::ls_types::InitializeResult;
use tower_lsp_server::ls_types::InitializedParams;
use tower_lsp_server::ls_types::MessageType;
use tower_lsp_server::ls_types::OneOf;
use tower_lsp_server::ls_types::PrepareRenameResponse;
use tower_lsp_server::ls_types::Range;
use tower_lsp_server::ls_types::RenameOptions;
use tower_lsp_server::ls_types::ServerCapabilities;
use tower_lsp_server::ls_types::ServerInfo;
use tower_lsp_server::ls_types::TextDocumentPositionParams;
use tower_lsp_server::ls_types::TextDocumentSyncCapability;
use tower_lsp_server::ls_types::TextDocumentSyncKind;
use tower_lsp_server::ls_types::WorkDoneProgressOptions;
use tower_lsp_server::ls_types::WorkspaceFoldersServerCapabilities;
use tower_lsp_server::ls_types::WorkspaceServerCapabilities;
use tower_lsp_server::Client;
use tower_lsp_server::LanguageServer;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use url::Url;

use crate::session::Session;

const SERVER_NAME: &str = "Stratum Language Server";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct StratumLanguageServer {
    pub(crate) client: Client,
    pub(crate) session: Arc<RwLock<Session>>,
    _log_guard: WorkerGuard,
}

impl StratumLanguageServer {
    #[must_use]
    pub fn new(
        client: Client,
        factory: Arc<dyn LanguageServiceFactory>,
        log_guard: WorkerGuard,
    ) -> Self {
        Self {
            client,
            session: Arc::new(RwLock::new(Session::new(factory))),
            _log_guard: log_guard,
        }
    }

    pub(crate) async fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.session.read().await;
        f(&session)
    }

    pub(crate) async fn with_session_mut<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.session.write().await;
        f(&mut session)
    }

    /// Line index for a file: from the open buffer when there is one,
    /// otherwise from whatever the workspace file system reads.
    pub(crate) async fn line_index_for(&self, path: &camino::Utf8Path) -> Option<LineIndex> {
        let (buffered, workspaces) = self
            .with_session(|session| {
                let buffered = stratum_workspace::path_to_url(path)
                    .and_then(|url| session.buffers().get(&url));
                (buffered, session.workspaces())
            })
            .await;

        if let Some(document) = buffered {
            return Some(document.line_index().clone());
        }

        let content = workspaces?.fs().read_to_string(path).await?;
        Some(LineIndex::new(&content))
    }
}

impl LanguageServer for StratumLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        let mut roots: Vec<Utf8PathBuf> = params
            .workspace_folders
            .unwrap_or_default()
            .iter()
            .filter_map(|folder| lsp_uri_to_path(&folder.uri))
            .collect();
        if roots.is_empty() {
            if let Some(cwd) = std::env::current_dir()
                .ok()
                .and_then(|cwd| Utf8PathBuf::from_path_buf(cwd).ok())
            {
                roots.push(cwd);
            }
        }

        let settings = roots
            .first()
            .map(|root| {
                Settings::new(root.as_std_path()).unwrap_or_else(|err| {
                    warn!("failed to load settings: {err}");
                    Settings::default()
                })
            })
            .unwrap_or_default();

        if settings.debug {
            info!("loaded settings: {settings:?}");
        }
        info!("initializing with {} workspace root(s)", roots.len());
        self.with_session_mut(|session| session.open_workspaces(&roots, settings))
            .await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                })),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(SERVER_VERSION.to_string()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "stratum server ready")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let Ok(url) = Url::parse(params.text_document.uri.as_str()) else {
            return;
        };
        let document = TextDocument::new(params.text_document.text, params.text_document.version);
        self.with_session(|session| session.buffers().open(url, document))
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Ok(url) = Url::parse(params.text_document.uri.as_str()) else {
            return;
        };
        self.with_session(|session| {
            if let Some(mut document) = session.buffers().get(&url) {
                document.update(params.content_changes, params.text_document.version);
                session.buffers().update(url, document);
            }
        })
        .await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let Ok(url) = Url::parse(params.text_document.uri.as_str()) else {
            return;
        };
        self.with_session(|session| {
            let _ = session.buffers().close(&url);
        })
        .await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let workspaces = self.with_session(Session::workspaces).await;
        let Some(workspaces) = workspaces else {
            return;
        };

        for event in params.changes {
            let Some(path) = lsp_uri_to_path(&event.uri) else {
                continue;
            };
            let change = match event.typ {
                FileChangeType::CREATED => FileChange::Created,
                FileChangeType::DELETED => FileChange::Deleted,
                _ => FileChange::Changed,
            };
            workspaces.handle_file_change(&path, change);
        }
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> LspResult<Option<PrepareRenameResponse>> {
        let Some(path) = lsp_uri_to_path(&params.text_document.uri) else {
            return Ok(None);
        };
        let Some(workspaces) = self.with_session(Session::workspaces).await else {
            return Ok(None);
        };
        let Some(line_index) = self.line_index_for(&path).await else {
            return Ok(None);
        };
        let Some(offset) = line_index.offset(params.position) else {
            return Ok(None);
        };

        let token = CancellationToken::new();
        match prepare_rename(&workspaces, &path, offset, &token).await {
            None => Ok(None),
            Some(Ok(range)) => Ok(Some(PrepareRenameResponse::Range(Range {
                start: line_index.position(range.start),
                end: line_index.position(range.end),
            }))),
            Some(Err(err)) => {
                warn!("rename preparation failed: {err}");
                let mut error = jsonrpc::Error::internal_error();
                error.message = err.message.into();
                Err(error)
            }
        }
    }
}
