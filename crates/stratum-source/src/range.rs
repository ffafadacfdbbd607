use serde::Deserialize;
use serde::Serialize;

/// A half-open `[start, end)` range measured in UTF-16 code units.
///
/// All offsets inside the mapping core use UTF-16 code units uniformly;
/// conversion to line/column happens at the protocol boundary via
/// [`crate::LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn empty(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `offset` falls inside this range. Half-open, so an offset
    /// equal to `end` is outside, except for empty ranges which contain
    /// exactly their own position.
    #[must_use]
    pub fn contains(&self, offset: u32) -> bool {
        if self.is_empty() {
            offset == self.start
        } else {
            offset >= self.start && offset < self.end
        }
    }

    /// Whether `other` lies entirely within this range.
    #[must_use]
    pub fn contains_range(&self, other: TextRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let range = TextRange::new(2, 5);
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }

    #[test]
    fn empty_range_contains_own_position() {
        let range = TextRange::empty(3);
        assert!(range.contains(3));
        assert!(!range.contains(2));
        assert!(!range.contains(4));
    }

    #[test]
    fn contains_range_requires_full_containment() {
        let outer = TextRange::new(0, 10);
        assert!(outer.contains_range(TextRange::new(0, 10)));
        assert!(outer.contains_range(TextRange::new(3, 7)));
        assert!(!outer.contains_range(TextRange::new(5, 11)));
    }
}
