use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Zero-based line/column pair. Columns count Unicode scalar values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Source range with both endpoints inclusive.
///
/// `indentation` is the column of the first non-blank character on the line
/// where the range starts; the parser uses it for layout decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
    pub indentation: usize,
}

impl Range {
    /// Builds a range, swapping the endpoints when they are given in reverse.
    pub fn new(start: Position, end: Position) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
                indentation: 0,
            }
        } else {
            Self {
                start,
                end,
                indentation: 0,
            }
        }
    }

    /// A range covering `len` characters on a single line. `len` of zero is
    /// treated as one character so the range stays well formed.
    pub fn single_line(line: usize, column: usize, len: usize) -> Self {
        Self::new(
            Position::new(line, column),
            Position::new(line, column + len.max(1) - 1),
        )
    }

    pub fn with_indentation(mut self, indentation: usize) -> Self {
        self.indentation = indentation;
        self
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn contains_range(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when this range starts strictly after `previous` ends.
    pub fn is_after(&self, previous: &Range) -> bool {
        self.start > previous.end
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Character count of a single-line range, zero for multi-line ranges.
    pub fn single_line_length(&self) -> usize {
        if self.is_single_line() {
            self.end.column - self.start.column + 1
        } else {
            0
        }
    }

    /// Size key used to pick the most specific node: line span first, then
    /// the column distance between the endpoints.
    pub fn size(&self) -> (usize, i64) {
        (
            self.end.line - self.start.line,
            self.end.column as i64 - self.start.column as i64,
        )
    }

    pub fn smaller_than(&self, other: &Range) -> bool {
        self.size() < other.size()
    }

    pub fn compare_size(&self, other: &Range) -> Ordering {
        self.size().cmp(&other.size())
    }

    /// Spans from the smaller start to the larger end of both ranges.
    pub fn combine_inclusive(&self, other: &Range) -> Range {
        let indentation = if other.start < self.start {
            other.indentation
        } else {
            self.indentation
        };
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            indentation,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentUri(Arc<str>);

impl DocumentUri {
    pub fn new(uri: impl AsRef<str>) -> Self {
        Self(Arc::from(uri.as_ref()))
    }

    pub fn from_path(path: &Path) -> Self {
        let display = path.display().to_string();
        if display.starts_with('/') {
            Self::new(format!("file://{display}"))
        } else {
            Self::new(format!("file:///{display}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentUri {
    fn default() -> Self {
        Self::new("memory:///untitled.fen")
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DocumentUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceFileReference {
    pub range: Range,
    pub document: DocumentUri,
}

impl SourceFileReference {
    pub fn new(range: Range, document: DocumentUri) -> Self {
        Self { range, document }
    }

    /// Combines two references of the same document; the arguments may be
    /// given in either order.
    pub fn make_inclusive(a: &SourceFileReference, b: &SourceFileReference) -> Self {
        Self {
            range: a.range.combine_inclusive(&b.range),
            document: a.document.clone(),
        }
    }

    pub fn contains_position(&self, position: Position) -> bool {
        self.range.contains(position)
    }
}

impl fmt::Display for SourceFileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.document, self.range)
    }
}

pub trait HasRange {
    fn range(&self) -> Range;
}

impl HasRange for SourceFileReference {
    fn range(&self) -> Range {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_contains_is_inclusive_on_both_ends() {
        let range = Range::new(Position::new(1, 4), Position::new(2, 2));
        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(1, 90)));
        assert!(range.contains(Position::new(2, 2)));
        assert!(!range.contains(Position::new(2, 3)));
        assert!(!range.contains(Position::new(1, 3)));
    }

    #[test]
    fn inclusive_reference_flips_reversed_arguments() {
        let document = DocumentUri::new("file:///a.fen");
        let late = SourceFileReference::new(Range::single_line(3, 2, 4), document.clone());
        let early = SourceFileReference::new(Range::single_line(1, 0, 3), document);
        let combined = SourceFileReference::make_inclusive(&late, &early);
        assert_eq!(combined.range.start, Position::new(1, 0));
        assert_eq!(combined.range.end, Position::new(3, 5));
    }

    #[test]
    fn smaller_ranges_sort_first() {
        let word = Range::single_line(0, 4, 3);
        let line = Range::single_line(0, 0, 20);
        let block = Range::new(Position::new(0, 0), Position::new(3, 0));
        assert!(word.smaller_than(&line));
        assert!(line.smaller_than(&block));
        assert!(!block.smaller_than(&word));
    }

    #[test]
    fn is_after_requires_a_gap_past_the_previous_end() {
        let first = Range::single_line(0, 0, 3);
        assert!(Range::single_line(0, 3, 1).is_after(&first));
        assert!(!Range::single_line(0, 2, 1).is_after(&first));
        assert!(Range::single_line(1, 0, 1).is_after(&first));
    }
}
