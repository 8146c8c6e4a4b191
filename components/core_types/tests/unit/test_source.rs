//! Unit tests for SourcePosition and Span

use core_types::{SourcePosition, Span};

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_source_position_zero_values() {
        let pos = SourcePosition::default();

        assert_eq!(pos.line, 0);
        assert_eq!(pos.column, 0);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_source_position_is_copy() {
        let pos1 = SourcePosition::new(1000, 42, 7);
        let pos2 = pos1;

        assert_eq!(pos1, pos2);
    }

    #[test]
    fn test_source_position_display() {
        assert_eq!(SourcePosition::new(30, 2, 9).to_string(), "3:10");
    }
}

#[cfg(test)]
mod span_tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(
            SourcePosition::new(start, 0, start as u32),
            SourcePosition::new(end, 0, end as u32),
        )
    }

    #[test]
    fn test_span_contains_offset_is_inclusive() {
        let s = span(3, 5);

        assert!(!s.contains_offset(2));
        assert!(s.contains_offset(3));
        assert!(s.contains_offset(5));
        assert!(!s.contains_offset(6));
    }

    #[test]
    fn test_zero_width_span() {
        let s = Span::at(SourcePosition::new(4, 0, 4));

        assert_eq!(s.start, s.end);
        assert!(s.contains_offset(4));
        assert!(s.contains_line_column(0, 4));
    }

    #[test]
    fn test_span_to() {
        let joined = span(1, 2).to(span(8, 9));

        assert_eq!(joined, span(1, 9));
    }
}
