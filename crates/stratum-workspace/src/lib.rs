mod buffers;
mod cancel;
mod collections;
mod config;
mod document;
mod engine;
mod fs;
mod path_map;
mod paths;
mod project;
mod resolver;
mod workspace;
mod workspaces;

pub use buffers::Buffers;
pub use cancel::CancellationToken;
pub use config::parse_config;
pub use config::ConfigError;
pub use config::ParsedConfig;
pub use document::TextDocument;
pub use engine::LanguageService;
pub use engine::LanguageServiceFactory;
pub use engine::NullLanguageServiceFactory;
pub use engine::ProjectContext;
pub use engine::ServiceError;
pub use fs::FileSystem;
pub use fs::FileType;
pub use fs::MemoryFileSystem;
pub use fs::OsFileSystem;
pub use fs::OverlayFileSystem;
pub use path_map::PathMap;
pub use paths::lsp_uri_to_path;
pub use paths::normalize_path;
pub use paths::path_to_url;
pub use paths::url_to_path;
pub use project::Project;
pub use resolver::sort_configs;
pub use workspace::FileChange;
pub use workspace::Workspace;
pub use workspace::ROOT_CONFIG_NAMES;
pub use workspaces::ResolvedProject;
pub use workspaces::Workspaces;
