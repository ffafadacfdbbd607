use serde::Deserialize;
use serde::Serialize;

/// Rename validity for one mapping.
///
/// The plain form marks a mapping renameable as-is; the normalized form
/// additionally records whether the generated identifier must go through
/// name normalization before the rename is offered. A mapping carrying
/// `WithNormalization { normalize: false }` still participates in rename
/// edits but is excluded from rename preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenameCapability {
    Enabled,
    WithNormalization { normalize: bool },
}

/// Per-mapping (and per-virtual-file) flags describing which classes of
/// language feature may validly use the mapping.
///
/// Keeping the flags per mapping rather than per file lets one generated
/// file serve different feature kinds with different validity subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilitySet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenameCapability>,
    pub diagnostics: bool,
    pub completion: bool,
    pub hover: bool,
    pub definition: bool,
    pub references: bool,
}

impl CapabilitySet {
    /// Everything enabled, rename without normalization requirements.
    #[must_use]
    pub fn full() -> Self {
        Self {
            rename: Some(RenameCapability::Enabled),
            diagnostics: true,
            completion: true,
            hover: true,
            definition: true,
            references: true,
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether rename preparation may use this mapping: plain rename always
    /// qualifies, the object form only when it asks for normalization.
    #[must_use]
    pub fn supports_rename_prepare(&self) -> bool {
        match self.rename {
            Some(RenameCapability::Enabled) => true,
            Some(RenameCapability::WithNormalization { normalize }) => normalize,
            None => false,
        }
    }
}
