use std::path::Path;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
}

/// Server settings, layered from the user config dir and the workspace
/// root (`.stratum.toml`, then `stratum.toml`, later sources winning).
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    /// Reverse the project-reference chain order before the indirect
    /// config search. Caller-supplied policy, off by default.
    pub reverse_config_file_priority: bool,
    /// Compiler options applied to the inferred project.
    pub inferred_options: Option<serde_json::Value>,
}

impl Settings {
    pub fn new(workspace_root: &Path) -> Result<Self, SettingsError> {
        let user_config_file = ProjectDirs::from("dev", "stratum", "stratum")
            .map(|proj_dirs| proj_dirs.config_dir().join("stratum.toml"));

        Self::load_from_paths(workspace_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        workspace_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            File::from(workspace_root.join(".stratum.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(workspace_root.join("stratum.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }
}
