//! Source position and span types for diagnostics.
//!
//! Every token and AST node carries a [`Span`] so that errors and tooling
//! queries can point back at the exact text they came from.

use std::fmt;

/// Represents a position in source code.
///
/// All fields are zero-based. `offset` is the absolute byte offset from the
/// start of the file and only ever increases while lexing.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition::new(150, 10, 5);
///
/// assert_eq!(pos.line, 10);
/// assert_eq!(pos.column, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourcePosition {
    /// Byte offset from the start of the source file
    pub offset: usize,
    /// Line number (0-indexed)
    pub line: u32,
    /// Column number (0-indexed, counted in characters)
    pub column: u32,
}

impl SourcePosition {
    /// Create a position from its offset, line and column
    pub const fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Humans count from one.
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// An inclusive range of source text.
///
/// `end` is the position of the last character covered, not one past it, so
/// a single-character token has `start == end`.
///
/// # Examples
///
/// ```
/// use core_types::{SourcePosition, Span};
///
/// let span = Span::new(SourcePosition::new(0, 0, 0), SourcePosition::new(2, 0, 2));
/// assert!(span.contains_offset(2));
/// assert!(!span.contains_offset(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First position covered by the span
    pub start: SourcePosition,
    /// Last position covered by the span
    pub end: SourcePosition,
}

impl Span {
    /// Create a span between two positions
    pub const fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    /// Zero-width span sitting on a single position
    pub const fn at(position: SourcePosition) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Span running from the start of `self` to the end of `other`
    pub const fn to(self, other: Span) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }

    /// Whether the byte offset falls inside the span (both ends inclusive)
    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start.offset && offset <= self.end.offset
    }

    /// Whether the line/column pair falls inside the span (both ends inclusive)
    pub fn contains_line_column(&self, line: u32, column: u32) -> bool {
        let after_start =
            line > self.start.line || (line == self.start.line && column >= self.start.column);
        let before_end = line < self.end.line || (line == self.end.line && column <= self.end.column);
        after_start && before_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_position_creation() {
        let pos = SourcePosition::new(150, 10, 5);
        assert_eq!(pos.line, 10);
        assert_eq!(pos.column, 5);
        assert_eq!(pos.offset, 150);
    }

    #[test]
    fn test_source_position_display_is_one_based() {
        assert_eq!(SourcePosition::new(0, 0, 0).to_string(), "1:1");
    }

    #[test]
    fn test_span_to_joins_outer_bounds() {
        let a = Span::new(SourcePosition::new(0, 0, 0), SourcePosition::new(1, 0, 1));
        let b = Span::new(SourcePosition::new(5, 0, 5), SourcePosition::new(7, 0, 7));
        let joined = a.to(b);
        assert_eq!(joined.start.offset, 0);
        assert_eq!(joined.end.offset, 7);
    }

    #[test]
    fn test_span_contains_line_column_across_lines() {
        let span = Span::new(SourcePosition::new(4, 0, 4), SourcePosition::new(12, 2, 1));
        assert!(span.contains_line_column(1, 30));
        assert!(span.contains_line_column(2, 1));
        assert!(!span.contains_line_column(2, 2));
        assert!(!span.contains_line_column(0, 3));
    }
}
