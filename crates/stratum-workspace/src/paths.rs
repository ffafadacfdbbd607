//! Path and URL conversion utilities
//!
//! Every file-keyed cache in the subsystem is keyed by normalized
//! filesystem path; URIs are funneled through [`url_to_path`] at lookup
//! boundaries so there is exactly one source of truth for file identity.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use tower_lsp_server::ls_types as lsp_types;
use url::Url;

/// Normalize a path for use as a cache key: forward slashes, collapsed
/// `.`/`..` segments, no trailing separator.
#[must_use]
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let replaced = path.as_str().replace('\\', "/");
    let absolute = replaced.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in replaced.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            part => parts.push(part),
        }
    }

    let joined = parts.join("/");
    let normalized = if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    };
    Utf8PathBuf::from(normalized)
}

/// Convert a `file://` URL to a normalized [`Utf8PathBuf`].
///
/// Handles percent-encoding and platform-specific path formats (e.g.
/// Windows drives).
#[must_use]
pub fn url_to_path(url: &Url) -> Option<Utf8PathBuf> {
    if url.scheme() != "file" {
        return None;
    }

    let path = percent_encoding::percent_decode_str(url.path())
        .decode_utf8()
        .ok()?;

    #[cfg(windows)]
    let path = path.strip_prefix('/').unwrap_or(&path);

    Some(normalize_path(Utf8Path::new(path.as_ref())))
}

/// Convert an LSP URI to a normalized [`Utf8PathBuf`].
#[must_use]
pub fn lsp_uri_to_path(lsp_uri: &lsp_types::Uri) -> Option<Utf8PathBuf> {
    let url = Url::parse(lsp_uri.as_str()).ok()?;
    url_to_path(&url)
}

/// Convert a path to a `file://` URL.
#[must_use]
pub fn path_to_url(path: &Utf8Path) -> Option<Url> {
    Url::from_file_path(path.as_std_path()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_to_path_basic() {
        let url = Url::parse("file:///home/user/file.ts").unwrap();
        assert_eq!(
            url_to_path(&url),
            Some(Utf8PathBuf::from("/home/user/file.ts"))
        );
    }

    #[test]
    fn url_to_path_decodes_percent_encoding() {
        let url = Url::parse("file:///home/user/my%20file.ts").unwrap();
        assert_eq!(
            url_to_path(&url),
            Some(Utf8PathBuf::from("/home/user/my file.ts"))
        );
    }

    #[test]
    fn url_to_path_rejects_non_file_scheme() {
        let url = Url::parse("https://example.com/file.ts").unwrap();
        assert!(url_to_path(&url).is_none());
    }

    #[test]
    fn normalize_strips_trailing_slash_and_backslashes() {
        assert_eq!(
            normalize_path(Utf8Path::new("/proj/src/")),
            Utf8PathBuf::from("/proj/src")
        );
        assert_eq!(
            normalize_path(Utf8Path::new("C:\\proj\\src")),
            Utf8PathBuf::from("C:/proj/src")
        );
        assert_eq!(normalize_path(Utf8Path::new("/")), Utf8PathBuf::from("/"));
    }

    #[test]
    fn normalize_collapses_dot_segments() {
        assert_eq!(
            normalize_path(Utf8Path::new("/proj/pkgA/../pkgB/./tsconfig.json")),
            Utf8PathBuf::from("/proj/pkgB/tsconfig.json")
        );
    }

    #[test]
    fn round_trip_through_url() {
        let path = Utf8PathBuf::from("/home/user/test file.ts");
        let url = path_to_url(&path).unwrap();
        assert_eq!(url_to_path(&url), Some(path));
    }
}
