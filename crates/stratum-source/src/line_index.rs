use tower_lsp_server::ls_types::Position;

/// Pre-computed line starts for converting between LSP line/character
/// positions and flat UTF-16 code-unit offsets.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    length: u32,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut pos = 0u32;

        for c in text.chars() {
            pos += u32::try_from(c.len_utf16()).unwrap_or(0);
            if c == '\n' {
                line_starts.push(pos);
            }
        }

        Self {
            line_starts,
            length: pos,
        }
    }

    /// Convert an LSP position to a UTF-16 code-unit offset.
    ///
    /// Returns `None` for lines beyond the end of the document. Characters
    /// past the end of a line clamp to the end of that line (before its
    /// newline), matching the LSP spec's lenient position handling.
    #[must_use]
    pub fn offset(&self, position: Position) -> Option<u32> {
        let line_start = *self.line_starts.get(position.line as usize)?;
        // a next line start sits one past this line's newline
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .map_or(self.length, |next| next - 1);

        Some((line_start + position.character).min(line_end))
    }

    /// Convert a UTF-16 code-unit offset back to an LSP position.
    #[must_use]
    pub fn position(&self, offset: u32) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        };

        let line_start = self.line_starts[line];
        Position::new(u32::try_from(line).unwrap_or(0), offset - line_start)
    }

    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_position_round_trip() {
        let index = LineIndex::new("ab\ncdef\ng");

        for (line, character, offset) in [(0, 0, 0), (0, 2, 2), (1, 0, 3), (1, 3, 6), (2, 0, 8)] {
            let position = Position::new(line, character);
            assert_eq!(index.offset(position), Some(offset));
            assert_eq!(index.position(offset), position);
        }
    }

    #[test]
    fn offset_clamps_past_end_of_line() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset(Position::new(0, 99)), Some(2));
        assert_eq!(index.offset(Position::new(1, 99)), Some(5));
    }

    #[test]
    fn clamped_offset_stays_on_addressed_line() {
        let index = LineIndex::new("ab\ncd\nef");
        for line in 0..3 {
            let offset = index.offset(Position::new(line, 99)).unwrap();
            assert_eq!(index.position(offset).line, line);
        }
    }

    #[test]
    fn offset_rejects_missing_line() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset(Position::new(5, 0)), None);
    }

    #[test]
    fn counts_utf16_units_not_bytes() {
        // U+1F600 is one char, four UTF-8 bytes, two UTF-16 code units
        let index = LineIndex::new("\u{1F600}x\ny");
        assert_eq!(index.offset(Position::new(0, 2)), Some(2));
        assert_eq!(index.offset(Position::new(1, 0)), Some(4));
    }
}
