use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a [`Snapshot`], assigned once at creation.
///
/// Two snapshots with the same text still carry distinct ids; change
/// detection downstream compares ids, never content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(u64);

/// An immutable text buffer with a stable identity.
///
/// Cloning a snapshot shares both the text and the id, so a clone is "the
/// same snapshot" for version-bump purposes. A rebuilt buffer gets a fresh
/// id even when the text is unchanged.
#[derive(Debug, Clone)]
pub struct Snapshot {
    text: Arc<str>,
    id: SnapshotId,
}

impl Snapshot {
    #[must_use]
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            id: SnapshotId(NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn id(&self) -> SnapshotId {
        self.id
    }

    /// UTF-16 code-unit length of the buffer.
    #[must_use]
    pub fn len_utf16(&self) -> u32 {
        self.text
            .chars()
            .map(|c| u32::try_from(c.len_utf16()).unwrap_or(0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let snapshot = Snapshot::new("hello");
        let clone = snapshot.clone();
        assert_eq!(snapshot.id(), clone.id());
    }

    #[test]
    fn rebuilds_get_fresh_identity() {
        let a = Snapshot::new("hello");
        let b = Snapshot::new("hello");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.text(), b.text());
    }

    #[test]
    fn utf16_length_counts_code_units() {
        assert_eq!(Snapshot::new("abc").len_utf16(), 3);
        // astral characters take two code units
        assert_eq!(Snapshot::new("a\u{1F600}b").len_utf16(), 4);
    }
}
