//! Generic single-file feature dispatch.
//!
//! A feature request names a host source file and an offset. The dispatcher
//! resolves the owning project, fans the offset out through every generated
//! layer whose mapping capabilities admit the feature, invokes the external
//! engine once per generated position, maps concrete results back to host
//! coordinates, and merges.

use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8Path;
use stratum_map::CapabilitySet;
use stratum_map::MappedOffset;
use stratum_map::VirtualFile;
use stratum_source::TextRange;
use stratum_workspace::CancellationToken;
use stratum_workspace::LanguageService;
use stratum_workspace::ServiceError;
use stratum_workspace::Workspaces;
use tracing::trace;

/// A feature result that can be translated from generated coordinates back
/// to host-source coordinates. Results with no host counterpart are
/// dropped, not surfaced.
pub trait MapBack: Sized {
    fn map_back(self, mapped: &MappedOffset<'_>) -> Option<Self>;
}

impl MapBack for TextRange {
    fn map_back(self, mapped: &MappedOffset<'_>) -> Option<Self> {
        mapped.to_source_range(self)
    }
}

/// One feature, described by the mappings it may use and the engine call it
/// performs at each generated position.
#[async_trait]
pub trait FeatureProvider: Send + Sync {
    type Output: MapBack + Send;

    /// Which mappings are eligible for this feature.
    fn capability_filter(&self, capabilities: &CapabilitySet) -> bool;

    /// Invoke the external engine at one generated position.
    async fn provide(
        &self,
        service: &Arc<dyn LanguageService>,
        file: &VirtualFile,
        offset: u32,
        token: &CancellationToken,
    ) -> Option<Result<Self::Output, ServiceError>>;
}

/// Run one feature request end to end.
///
/// Absent when no project serves the file, when the engine derives no
/// virtual tree for it, when every layer comes back empty, or when the
/// token is cancelled. Cancellation is checked before every engine call;
/// once observed, no further calls are issued and nothing partial is
/// returned.
pub async fn dispatch<P: FeatureProvider>(
    workspaces: &Workspaces,
    source: &Utf8Path,
    offset: u32,
    provider: &P,
    token: &CancellationToken,
) -> Option<Result<P::Output, ServiceError>> {
    let resolved = workspaces.get_project(source).await?;
    let service = resolved.project.language_service().await;
    let root = service.virtual_root(source)?;

    let mapped = root.mapped_offsets(offset, &|capabilities| {
        provider.capability_filter(capabilities)
    });
    trace!(
        "dispatching over {} generated position(s) for {source}",
        mapped.len()
    );

    let mut results = Vec::new();
    for position in &mapped {
        if token.is_cancelled() {
            return None;
        }
        let Some(result) = provider
            .provide(&service, position.file, position.offset, token)
            .await
        else {
            continue;
        };
        match result {
            Ok(value) => {
                if let Some(value) = value.map_back(position) {
                    results.push(Ok(value));
                }
            }
            Err(err) => results.push(Err(err)),
        }
    }

    merge_first_valid(results)
}

/// Default merge policy: the first valid result wins and suppresses every
/// error; with no valid result the first error surfaces; with nothing at
/// all the merge is absent.
#[must_use]
pub fn merge_first_valid<T>(
    results: Vec<Result<T, ServiceError>>,
) -> Option<Result<T, ServiceError>> {
    let mut first_err = None;
    for result in results {
        match result {
            Ok(value) => return Some(Ok(value)),
            Err(err) => {
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
    }
    first_err.map(Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_workspaces;
    use crate::testing::CallLog;
    use camino::Utf8PathBuf;

    struct EchoRange {
        log: CallLog,
        cancel_after_first: Option<CancellationToken>,
    }

    #[async_trait]
    impl FeatureProvider for EchoRange {
        type Output = TextRange;

        fn capability_filter(&self, _capabilities: &CapabilitySet) -> bool {
            true
        }

        async fn provide(
            &self,
            _service: &Arc<dyn LanguageService>,
            file: &VirtualFile,
            offset: u32,
            _token: &CancellationToken,
        ) -> Option<Result<TextRange, ServiceError>> {
            self.log.record(&file.file_name);
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
            match file.file_name.as_str() {
                "/proj/src/a.ts.l1" => Some(Err(ServiceError::new("layer one broke"))),
                _ => Some(Ok(TextRange::new(offset + 1, offset + 3))),
            }
        }
    }

    #[tokio::test]
    async fn fan_out_merges_first_valid_over_errors() {
        let workspaces = fixture_workspaces();
        let log = CallLog::default();
        let provider = EchoRange {
            log: log.clone(),
            cancel_after_first: None,
        };
        let token = CancellationToken::new();

        let result = dispatch(
            &workspaces,
            Utf8Path::new("/proj/src/a.ts"),
            3,
            &provider,
            &token,
        )
        .await;

        // host 3 -> l1 203 (errors), l2 303 and root 103 both answer; the
        // first valid answer maps back to host [4,6)
        assert_eq!(result, Some(Ok(TextRange::new(4, 6))));
        assert_eq!(log.count(), 3);
    }

    #[tokio::test]
    async fn cancellation_stops_fan_out_and_yields_absent() {
        let workspaces = fixture_workspaces();
        let log = CallLog::default();
        let token = CancellationToken::new();
        let provider = EchoRange {
            log: log.clone(),
            cancel_after_first: Some(token.clone()),
        };

        let result = dispatch(
            &workspaces,
            Utf8Path::new("/proj/src/a.ts"),
            3,
            &provider,
            &token,
        )
        .await;

        assert_eq!(result, None);
        assert_eq!(log.count(), 1);
    }

    #[tokio::test]
    async fn unknown_file_is_absent() {
        let workspaces = fixture_workspaces();
        let provider = EchoRange {
            log: CallLog::default(),
            cancel_after_first: None,
        };
        let token = CancellationToken::new();

        let result = dispatch(
            &workspaces,
            Utf8Path::new("/proj/src/missing.ts"),
            3,
            &provider,
            &token,
        )
        .await;
        assert_eq!(result, None);
    }

    #[test]
    fn merge_surfaces_first_error_when_nothing_valid() {
        let results: Vec<Result<TextRange, ServiceError>> = vec![
            Err(ServiceError::new("first")),
            Err(ServiceError::new("second")),
        ];
        assert_eq!(
            merge_first_valid(results),
            Some(Err(ServiceError::new("first")))
        );

        let empty: Vec<Result<TextRange, ServiceError>> = Vec::new();
        assert_eq!(merge_first_valid(empty), None);
    }

    #[test]
    fn merge_prefers_valid_regardless_of_order() {
        let results = vec![
            Err(ServiceError::new("broken")),
            Ok(TextRange::new(1, 2)),
            Ok(TextRange::new(3, 4)),
        ];
        assert_eq!(merge_first_valid(results), Some(Ok(TextRange::new(1, 2))));
    }

    #[tokio::test]
    async fn capability_filter_limits_fan_out() {
        struct RenameOnly {
            log: CallLog,
        }

        #[async_trait]
        impl FeatureProvider for RenameOnly {
            type Output = TextRange;

            fn capability_filter(&self, capabilities: &CapabilitySet) -> bool {
                capabilities.supports_rename_prepare()
            }

            async fn provide(
                &self,
                _service: &Arc<dyn LanguageService>,
                file: &VirtualFile,
                offset: u32,
                _token: &CancellationToken,
            ) -> Option<Result<TextRange, ServiceError>> {
                self.log.record(&file.file_name);
                Some(Ok(TextRange::new(offset, offset + 1)))
            }
        }

        let workspaces = fixture_workspaces();
        let log = CallLog::default();
        let provider = RenameOnly { log: log.clone() };
        let token = CancellationToken::new();

        let result = dispatch(
            &workspaces,
            Utf8Path::new("/proj/src/a.ts"),
            3,
            &provider,
            &token,
        )
        .await;

        // l1's mapping disables rename, so only the root and l2 are called.
        assert!(result.is_some());
        assert_eq!(
            log.calls(),
            vec![
                Utf8PathBuf::from("/proj/src/a.ts.l2"),
                Utf8PathBuf::from("/proj/src/a.ts.root"),
            ]
        );
    }
}
