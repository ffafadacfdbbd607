use serde::Serialize;
use stratum_source::TextRange;

use crate::CapabilitySet;

/// One correspondence between a source range and a generated range,
/// tagged with the capabilities the mapping is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub source: TextRange,
    pub generated: TextRange,
    pub capabilities: CapabilitySet,
}

impl Mapping {
    #[must_use]
    pub fn new(source: TextRange, generated: TextRange, capabilities: CapabilitySet) -> Self {
        Self {
            source,
            generated,
            capabilities,
        }
    }
}

/// An ordered list of [`Mapping`]s between one source document and one
/// generated document.
///
/// A source map is created whenever a generated file is (re)produced and
/// replaced wholesale on any source edit; it is never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    mappings: Vec<Mapping>,
}

impl SourceMap {
    #[must_use]
    pub fn new(mappings: Vec<Mapping>) -> Self {
        Self { mappings }
    }

    #[must_use]
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Translate a source offset into generated offsets.
    ///
    /// Scans mappings whose source range contains the offset and whose
    /// capabilities satisfy `filter`. A single source position can fan out
    /// into several generated positions when a construct expands into
    /// multiple generated occurrences; the returned iterator is finite and
    /// restartable.
    pub fn to_generated_offsets<'a, F>(
        &'a self,
        offset: u32,
        filter: F,
    ) -> impl Iterator<Item = (u32, &'a Mapping)> + 'a
    where
        F: Fn(&CapabilitySet) -> bool + 'a,
    {
        self.mappings
            .iter()
            .filter(move |mapping| mapping.source.contains(offset) && filter(&mapping.capabilities))
            .map(move |mapping| (mapping.generated.start + (offset - mapping.source.start), mapping))
    }

    /// Translate a generated range back to its source range.
    ///
    /// The first mapping (in mapping order) whose generated range contains
    /// the query wins, which keeps the translation deterministic when
    /// several mappings could apply.
    #[must_use]
    pub fn to_source_range(&self, range: TextRange) -> Option<TextRange> {
        self.mappings
            .iter()
            .find(|mapping| mapping.generated.contains_range(range))
            .map(|mapping| {
                let delta_start = range.start - mapping.generated.start;
                let delta_end = range.end - mapping.generated.start;
                TextRange::new(
                    mapping.source.start + delta_start,
                    mapping.source.start + delta_end,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(source: (u32, u32), generated: (u32, u32)) -> Mapping {
        Mapping::new(
            TextRange::new(source.0, source.1),
            TextRange::new(generated.0, generated.1),
            CapabilitySet::full(),
        )
    }

    #[test]
    fn round_trips_every_mapping() {
        let map = SourceMap::new(vec![mapping((0, 4), (10, 14)), mapping((8, 12), (20, 24))]);

        for m in map.mappings() {
            assert_eq!(map.to_source_range(m.generated), Some(m.source));

            let generated: Vec<u32> = map
                .to_generated_offsets(m.source.start, |_| true)
                .map(|(offset, _)| offset)
                .collect();
            assert!(generated.contains(&m.generated.start));
        }
    }

    #[test]
    fn offsets_translate_by_delta() {
        let map = SourceMap::new(vec![mapping((5, 10), (100, 105))]);

        let hits: Vec<u32> = map
            .to_generated_offsets(7, |_| true)
            .map(|(offset, _)| offset)
            .collect();
        assert_eq!(hits, vec![102]);

        assert_eq!(
            map.to_source_range(TextRange::new(101, 103)),
            Some(TextRange::new(6, 8))
        );
    }

    #[test]
    fn fans_out_to_multiple_generated_positions() {
        let map = SourceMap::new(vec![mapping((0, 3), (10, 13)), mapping((0, 3), (30, 33))]);

        let hits: Vec<u32> = map
            .to_generated_offsets(1, |_| true)
            .map(|(offset, _)| offset)
            .collect();
        assert_eq!(hits, vec![11, 31]);
    }

    #[test]
    fn capability_filter_excludes_mappings() {
        let renameable = mapping((0, 3), (10, 13));
        let mut diagnostics_only = mapping((0, 3), (30, 33));
        diagnostics_only.capabilities = CapabilitySet {
            diagnostics: true,
            ..CapabilitySet::none()
        };

        let map = SourceMap::new(vec![renameable, diagnostics_only]);
        let hits: Vec<u32> = map
            .to_generated_offsets(0, CapabilitySet::supports_rename_prepare)
            .map(|(offset, _)| offset)
            .collect();
        assert_eq!(hits, vec![10]);
    }

    #[test]
    fn first_mapping_wins_on_overlapping_generated_ranges() {
        let map = SourceMap::new(vec![mapping((0, 10), (50, 60)), mapping((20, 30), (50, 60))]);
        assert_eq!(
            map.to_source_range(TextRange::new(52, 55)),
            Some(TextRange::new(2, 5))
        );
    }

    #[test]
    fn unmapped_range_is_absent() {
        let map = SourceMap::new(vec![mapping((0, 4), (10, 14))]);
        assert_eq!(map.to_source_range(TextRange::new(0, 4)), None);
    }
}
