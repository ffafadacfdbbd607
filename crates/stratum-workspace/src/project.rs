//! One project: a config (or the inferred fallback) bound to a lazily
//! created analysis handle.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use tokio::sync::OnceCell;
use tracing::debug;
use tracing::warn;

use crate::config::parse_config;
use crate::config::ParsedConfig;
use crate::engine::LanguageService;
use crate::engine::LanguageServiceFactory;
use crate::engine::ProjectContext;
use crate::fs::FileSystem;
use crate::path_map::PathMap;

/// A project is cheap to construct; the expensive pieces (config parse,
/// analysis handle) live behind async once-cells so that two requests
/// racing on the same project trigger at most one parse and one creation.
pub struct Project {
    root: Utf8PathBuf,
    config_path: Option<Utf8PathBuf>,
    fs: Arc<dyn FileSystem>,
    factory: Arc<dyn LanguageServiceFactory>,
    inferred_options: Option<serde_json::Value>,
    parsed: OnceCell<Option<Arc<ParsedConfig>>>,
    service: OnceCell<Arc<dyn LanguageService>>,
    /// Source files resolved as indirectly belonging to this project via
    /// the reference-chain membership test; consulted to short-circuit
    /// future indirect lookups.
    asked_files: PathMap<()>,
    disposed: AtomicBool,
}

impl Project {
    #[must_use]
    pub fn new(
        root: Utf8PathBuf,
        config_path: Utf8PathBuf,
        fs: Arc<dyn FileSystem>,
        factory: Arc<dyn LanguageServiceFactory>,
    ) -> Self {
        Self {
            root,
            config_path: Some(config_path),
            fs,
            factory,
            inferred_options: None,
            parsed: OnceCell::new(),
            service: OnceCell::new(),
            asked_files: PathMap::new(),
            disposed: AtomicBool::new(false),
        }
    }

    /// The inferred project has no config file; its compiler options come
    /// from settings (or heuristics) instead.
    #[must_use]
    pub fn inferred(
        root: Utf8PathBuf,
        inferred_options: Option<serde_json::Value>,
        fs: Arc<dyn FileSystem>,
        factory: Arc<dyn LanguageServiceFactory>,
    ) -> Self {
        Self {
            root,
            config_path: None,
            fs,
            factory,
            inferred_options,
            parsed: OnceCell::new(),
            service: OnceCell::new(),
            asked_files: PathMap::new(),
            disposed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn config_path(&self) -> Option<&Utf8Path> {
        self.config_path.as_deref()
    }

    #[must_use]
    pub fn is_inferred(&self) -> bool {
        self.config_path.is_none()
    }

    /// Memoized config parse. Absent for the inferred project and for
    /// configs that fail to parse; a failure here never propagates, it
    /// only isolates this project.
    pub async fn parsed_config(&self) -> Option<Arc<ParsedConfig>> {
        self.parsed
            .get_or_init(|| async {
                let config_path = self.config_path.as_deref()?;
                match parse_config(self.fs.as_ref(), config_path).await {
                    Ok(parsed) => Some(Arc::new(parsed)),
                    Err(err) => {
                        warn!("failed to parse config {config_path}: {err}");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Lazily create the analysis handle; concurrent callers share the
    /// same in-flight creation.
    pub async fn language_service(&self) -> Arc<dyn LanguageService> {
        self.service
            .get_or_init(|| async {
                debug!("creating language service for {}", self.root);
                let config = self.parsed_config().await;
                self.factory
                    .create(ProjectContext {
                        root: self.root.clone(),
                        config,
                        inferred_options: self.inferred_options.clone(),
                        fs: self.fs.clone(),
                    })
                    .await
            })
            .await
            .clone()
    }

    /// Non-forcing peek at the analysis handle; never triggers creation.
    #[must_use]
    pub fn language_service_dont_create(&self) -> Option<Arc<dyn LanguageService>> {
        if self.is_disposed() {
            return None;
        }
        self.service.get().cloned()
    }

    #[must_use]
    pub fn inferred_options(&self) -> Option<&serde_json::Value> {
        self.inferred_options.as_ref()
    }

    pub fn mark_asked(&self, file: &Utf8Path) {
        self.asked_files.insert(file, ());
    }

    #[must_use]
    pub fn was_asked(&self, file: &Utf8Path) -> bool {
        self.asked_files.contains(file)
    }

    /// Release the analysis handle and derived caches. Idempotent: a
    /// second call observes the flag and does nothing.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            debug!(
                "disposing project {}",
                self.config_path.as_deref().unwrap_or(&self.root)
            );
            self.asked_files.clear();
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
