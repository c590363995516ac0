//! Text utilities for position conversion.
//!
//! Offsets and columns are counted in UTF-16 code units. That is the unit the
//! checking service reports offsets in and the default LSP position encoding,
//! so checker offsets never need converting before they are published.

use tower_lsp::lsp_types::{Position, Range};

/// Pre-computed line index for position lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// UTF-16 offset where each line starts.
    line_starts: Vec<usize>,
    /// UTF-16 length of each line, excluding the line break.
    line_lengths: Vec<usize>,
}

impl LineIndex {
    /// Build a line index from source text.
    ///
    /// Lines are split on `\n` only; a `\r` before it counts as part of the line.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut line_lengths = Vec::new();
        let mut length = 0;

        for c in source.chars() {
            if c == '\n' {
                let start = line_starts[line_starts.len() - 1];
                line_lengths.push(length);
                line_starts.push(start + length + 1);
                length = 0;
            } else {
                length += c.len_utf16();
            }
        }
        line_lengths.push(length);

        Self {
            line_starts,
            line_lengths,
        }
    }

    /// Number of lines. An empty text has one empty line.
    pub fn line_count(&self) -> usize {
        self.line_lengths.len()
    }

    /// Length of a line in UTF-16 code units, or `None` past the last line.
    pub fn line_length(&self, row: usize) -> Option<usize> {
        self.line_lengths.get(row).copied()
    }

    /// Total length of the text in UTF-16 code units.
    pub fn len(&self) -> usize {
        let last = self.line_count() - 1;
        self.line_starts[last] + self.line_lengths[last]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position just after the last character.
    pub fn end_position(&self) -> Position {
        let last = self.line_count() - 1;
        Position::new(last as u32, self.line_lengths[last] as u32)
    }

    /// Convert an offset to a position.
    ///
    /// The offset of a line break maps to the end of its own line; the offset
    /// right after it maps to column 0 of the next line. Offsets past the end
    /// of the text clamp to [`LineIndex::end_position`].
    pub fn offset_to_position(&self, offset: usize) -> Position {
        self.checked_position(offset)
            .unwrap_or_else(|| self.end_position())
    }

    /// Convert an offset to a position, or `None` if it lies past the end.
    pub fn checked_position(&self, offset: usize) -> Option<Position> {
        if offset > self.len() {
            return None;
        }

        // Binary search to find the line
        let row = match self.line_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(row) => row.saturating_sub(1),
        };
        let column = offset - self.line_starts[row];

        Some(Position::new(row as u32, column as u32))
    }

    /// Convert a position back to an offset.
    ///
    /// Returns `None` for rows past the last line. Columns past the end of
    /// the line clamp to the line end.
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let row = position.line as usize;
        let length = self.line_length(row)?;
        let column = (position.character as usize).min(length);
        Some(self.line_starts[row] + column)
    }

    /// Convert an `(offset, length)` span to a range.
    ///
    /// Returns `None` when either end of the span lies past the end of the text.
    pub fn span_to_range(&self, offset: usize, length: usize) -> Option<Range> {
        let start = self.checked_position(offset)?;
        let end = self.checked_position(offset.checked_add(length)?)?;
        Some(Range::new(start, end))
    }
}

/// Streaming offset-to-position walk over a [`LineIndex`].
///
/// Mapping a run of ascending offsets reuses the cursor instead of starting
/// over, so a whole batch costs one pass over the lines. A target below the
/// cursor's current offset rewinds it to the start of the text.
#[derive(Debug, Clone)]
pub struct PositionCursor<'a> {
    index: &'a LineIndex,
    row: usize,
    column: usize,
    consumed: usize,
}

impl<'a> PositionCursor<'a> {
    pub fn new(index: &'a LineIndex) -> Self {
        Self {
            index,
            row: 0,
            column: 0,
            consumed: 0,
        }
    }

    /// Rewind to offset 0.
    pub fn reset(&mut self) {
        self.row = 0;
        self.column = 0;
        self.consumed = 0;
    }

    /// Offset the cursor currently sits on.
    pub fn offset(&self) -> usize {
        self.consumed
    }

    /// Advance to `target` and return its position.
    ///
    /// Returns `None` when the lines run out before `target` is reached. The
    /// cursor then stays exhausted until a lower target rewinds it.
    pub fn advance_to(&mut self, target: usize) -> Option<Position> {
        if target < self.consumed {
            self.reset();
        }

        let line_count = self.index.line_count();
        while self.consumed < target && self.row < line_count {
            let remaining = self.index.line_lengths[self.row] - self.column;
            let distance = target - self.consumed;
            if distance > remaining {
                // rest of the line plus its line break
                self.consumed += remaining + 1;
                self.row += 1;
                self.column = 0;
            } else {
                self.column += distance;
                self.consumed += distance;
            }
        }

        if self.consumed == target && self.row < line_count {
            Some(Position::new(self.row as u32, self.column as u32))
        } else {
            None
        }
    }
}

/// Maps checker spans to ranges with a shared [`PositionCursor`].
///
/// Spans should arrive sorted by offset; out-of-order spans still map
/// correctly but rescan from the start.
#[derive(Debug, Clone)]
pub struct SpanMapper<'a> {
    cursor: PositionCursor<'a>,
}

impl<'a> SpanMapper<'a> {
    pub fn new(index: &'a LineIndex) -> Self {
        Self {
            cursor: PositionCursor::new(index),
        }
    }

    /// Map `[offset, offset + length)` to a range.
    ///
    /// Returns `None` when the span runs past the end of the text; callers
    /// drop such spans instead of rendering a bogus range.
    pub fn map(&mut self, offset: usize, length: usize) -> Option<Range> {
        let start = self.cursor.advance_to(offset)?;
        let end = self.cursor.advance_to(offset.checked_add(length)?)?;
        Some(Range::new(start, end))
    }
}
