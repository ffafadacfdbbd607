//! Analysis-engine collaborator traits
//!
//! The language-analysis engine that computes feature results on generated
//! documents lives outside this core. Projects hold a handle to it through
//! [`LanguageService`]; a [`LanguageServiceFactory`] creates one handle per
//! project, lazily.

use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use stratum_map::VirtualFile;
use stratum_source::TextRange;
use thiserror::Error;

use crate::config::ParsedConfig;
use crate::fs::FileSystem;
use crate::CancellationToken;

/// Failure surfaced by the external engine for one feature call.
///
/// Propagated upward as the operation's error result; the dispatcher's
/// merge policy decides whether a succeeding sibling layer masks it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
}

impl ServiceError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything a factory needs to stand up an analysis handle for one
/// project.
pub struct ProjectContext {
    pub root: Utf8PathBuf,
    pub config: Option<Arc<ParsedConfig>>,
    /// Heuristic compiler options for the inferred project; absent when a
    /// real config governs.
    pub inferred_options: Option<serde_json::Value>,
    pub fs: Arc<dyn FileSystem>,
}

/// Opaque handle to the external analysis engine, scoped to one project.
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Every source file the engine currently serves for this project.
    fn script_file_names(&self) -> Vec<Utf8PathBuf>;

    /// The virtual file tree derived from one host source file, absent
    /// when the engine produces nothing for it.
    fn virtual_root(&self, source: &Utf8Path) -> Option<Arc<VirtualFile>>;

    /// Compute the rename range for a position in a generated document.
    ///
    /// Absent means the engine has no answer there; an error is the
    /// engine's own failure, not a protocol problem.
    async fn provide_rename_range(
        &self,
        _file_name: &Utf8Path,
        _offset: u32,
        _token: &CancellationToken,
    ) -> Option<Result<TextRange, ServiceError>> {
        None
    }
}

#[async_trait]
pub trait LanguageServiceFactory: Send + Sync {
    async fn create(&self, context: ProjectContext) -> Arc<dyn LanguageService>;
}

/// Default engine used when no real analyzer is plugged in: serves the
/// config's file list and derives nothing.
pub struct NullLanguageServiceFactory;

struct NullLanguageService {
    file_names: Vec<Utf8PathBuf>,
}

#[async_trait]
impl LanguageService for NullLanguageService {
    fn script_file_names(&self) -> Vec<Utf8PathBuf> {
        self.file_names.clone()
    }

    fn virtual_root(&self, _source: &Utf8Path) -> Option<Arc<VirtualFile>> {
        None
    }
}

#[async_trait]
impl LanguageServiceFactory for NullLanguageServiceFactory {
    async fn create(&self, context: ProjectContext) -> Arc<dyn LanguageService> {
        Arc::new(NullLanguageService {
            file_names: context
                .config
                .map(|config| config.file_names.clone())
                .unwrap_or_default(),
        })
    }
}
