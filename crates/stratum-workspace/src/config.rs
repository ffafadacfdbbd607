//! Parsed compiler configuration (`tsconfig.json` / `jsconfig.json`)
//!
//! Configs are read-only from the core's perspective and immutable once
//! parsed; a watch event on the config file disposes the owning project,
//! which re-parses on next use.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Deserialize;
use thiserror::Error;

use crate::fs::FileSystem;
use crate::paths::normalize_path;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(Utf8PathBuf),
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

/// One parsed config file: compiler options, the resolved file list, and
/// the ordered project references.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    pub config_path: Utf8PathBuf,
    pub compiler_options: serde_json::Value,
    pub file_names: Vec<Utf8PathBuf>,
    pub project_references: Vec<Utf8PathBuf>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    compiler_options: serde_json::Value,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    references: Vec<RawReference>,
}

#[derive(Deserialize)]
struct RawReference {
    path: String,
}

/// Parse a config file through the [`FileSystem`] capability.
///
/// Relative `files` and `references[].path` entries resolve against the
/// config's directory. A parse failure is scoped to this config; callers
/// continue resolution against sibling configs.
pub async fn parse_config(
    fs: &dyn FileSystem,
    config_path: &Utf8Path,
) -> Result<ParsedConfig, ConfigError> {
    let config_path = normalize_path(config_path);
    let content = fs
        .read_to_string(&config_path)
        .await
        .ok_or_else(|| ConfigError::NotFound(config_path.clone()))?;

    let raw: RawConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path.clone(),
        source,
    })?;

    let dir = config_path
        .parent()
        .map_or_else(|| Utf8PathBuf::from("/"), Utf8Path::to_path_buf);

    let file_names = raw
        .files
        .iter()
        .map(|file| resolve_relative(&dir, file))
        .collect();

    let project_references = raw
        .references
        .iter()
        .map(|reference| resolve_relative(&dir, &reference.path))
        .collect();

    Ok(ParsedConfig {
        config_path,
        compiler_options: raw.compiler_options,
        file_names,
        project_references,
    })
}

fn resolve_relative(dir: &Utf8Path, entry: &str) -> Utf8PathBuf {
    let entry = Utf8Path::new(entry);
    if entry.is_absolute() {
        normalize_path(entry)
    } else {
        normalize_path(&dir.join(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;

    #[tokio::test]
    async fn parses_files_and_references_relative_to_config_dir() {
        let fs = MemoryFileSystem::new();
        fs.add_file(
            "/proj/tsconfig.json",
            r#"{
                "compilerOptions": { "strict": true },
                "files": ["src/a.ts", "/abs/b.ts"],
                "references": [{ "path": "pkgA" }, { "path": "../other/tsconfig.json" }]
            }"#,
        );

        let parsed = parse_config(&fs, Utf8Path::new("/proj/tsconfig.json"))
            .await
            .unwrap();

        assert_eq!(parsed.compiler_options["strict"], serde_json::json!(true));
        assert_eq!(
            parsed.file_names,
            vec![
                Utf8PathBuf::from("/proj/src/a.ts"),
                Utf8PathBuf::from("/abs/b.ts")
            ]
        );
        assert_eq!(
            parsed.project_references,
            vec![
                Utf8PathBuf::from("/proj/pkgA"),
                Utf8PathBuf::from("/other/tsconfig.json")
            ]
        );
    }

    #[tokio::test]
    async fn missing_config_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = parse_config(&fs, Utf8Path::new("/proj/tsconfig.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/proj/tsconfig.json", "{ not json");
        let err = parse_config(&fs, Utf8Path::new("/proj/tsconfig.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn empty_object_parses_to_empty_lists() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/proj/jsconfig.json", "{}");
        let parsed = parse_config(&fs, Utf8Path::new("/proj/jsconfig.json"))
            .await
            .unwrap();
        assert!(parsed.file_names.is_empty());
        assert!(parsed.project_references.is_empty());
    }
}
