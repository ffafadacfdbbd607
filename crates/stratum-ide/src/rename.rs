//! Rename preparation: the range the editor should highlight before asking
//! for a new name.

use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8Path;
use stratum_map::CapabilitySet;
use stratum_map::VirtualFile;
use stratum_source::TextRange;
use stratum_workspace::CancellationToken;
use stratum_workspace::LanguageService;
use stratum_workspace::ServiceError;
use stratum_workspace::Workspaces;

use crate::dispatch::dispatch;
use crate::dispatch::FeatureProvider;

struct RenamePrepare;

#[async_trait]
impl FeatureProvider for RenamePrepare {
    type Output = TextRange;

    fn capability_filter(&self, capabilities: &CapabilitySet) -> bool {
        capabilities.supports_rename_prepare()
    }

    async fn provide(
        &self,
        service: &Arc<dyn LanguageService>,
        file: &VirtualFile,
        offset: u32,
        token: &CancellationToken,
    ) -> Option<Result<TextRange, ServiceError>> {
        service
            .provide_rename_range(&file.file_name, offset, token)
            .await
    }
}

/// Compute the host-source range eligible for rename at `offset`, absent
/// when no renameable mapping covers the position.
pub async fn prepare_rename(
    workspaces: &Workspaces,
    source: &Utf8Path,
    offset: u32,
    token: &CancellationToken,
) -> Option<Result<TextRange, ServiceError>> {
    dispatch(workspaces, source, offset, &RenamePrepare, token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_workspaces;

    #[tokio::test]
    async fn prepare_rename_maps_back_to_host_source() {
        let workspaces = fixture_workspaces();
        let token = CancellationToken::new();

        // l2 is the only layer answering: host 3 -> l2 303, the engine
        // answers [304,306), which maps back to host [4,6).
        let result = prepare_rename(
            &workspaces,
            Utf8Path::new("/proj/src/a.ts"),
            3,
            &token,
        )
        .await;
        assert_eq!(result, Some(Ok(TextRange::new(4, 6))));
    }

    #[tokio::test]
    async fn prepare_rename_outside_mapped_region_is_absent() {
        let workspaces = fixture_workspaces();
        let token = CancellationToken::new();

        let result = prepare_rename(
            &workspaces,
            Utf8Path::new("/proj/src/a.ts"),
            50,
            &token,
        )
        .await;
        assert_eq!(result, None);
    }
}
