//! Compile error types.
//!
//! Every stage of the pipeline fails with exactly one [`CompileError`]; there
//! is no recovery and no accumulation of multiple errors.

use crate::{SourcePosition, Span};
use thiserror::Error;

/// An error raised while lexing, parsing or transpiling.
///
/// # Examples
///
/// ```
/// use core_types::{CompileError, SourcePosition, Span};
///
/// let error = CompileError::Parsing {
///     reason: "expected an expression".to_string(),
///     span: Span::at(SourcePosition::new(3, 0, 3)),
/// };
///
/// assert_eq!(error.reason(), "expected an expression");
/// assert_eq!(error.kind_label(), "Parser");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Malformed token: unterminated string, bad escape, unknown character
    #[error("LexerError: {reason}")]
    Lexing {
        /// Human-readable reason
        reason: String,
        /// Offending position
        position: SourcePosition,
    },

    /// Unexpected token for the current grammar position
    #[error("ParserError: {reason}")]
    Parsing {
        /// Human-readable reason
        reason: String,
        /// Span of the offending token or node
        span: Span,
    },

    /// Construct that parsed but cannot be emitted
    #[error("TranspilerError: {reason}")]
    Transpiling {
        /// Human-readable reason
        reason: String,
        /// Span of the offending node
        span: Span,
    },
}

impl CompileError {
    /// The human-readable reason, without the kind prefix
    pub fn reason(&self) -> &str {
        match self {
            CompileError::Lexing { reason, .. }
            | CompileError::Parsing { reason, .. }
            | CompileError::Transpiling { reason, .. } => reason,
        }
    }

    /// Span of the error. A lexing error is a zero-width span at its position.
    pub fn span(&self) -> Span {
        match self {
            CompileError::Lexing { position, .. } => Span::at(*position),
            CompileError::Parsing { span, .. } | CompileError::Transpiling { span, .. } => *span,
        }
    }

    /// Stage name used in diagnostic headers
    pub fn kind_label(&self) -> &'static str {
        match self {
            CompileError::Lexing { .. } => "Lexer",
            CompileError::Parsing { .. } => "Parser",
            CompileError::Transpiling { .. } => "Transpiler",
        }
    }
}

/// Result type for every compiler stage
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexing_error_span_is_zero_width() {
        let position = SourcePosition::new(7, 1, 2);
        let error = CompileError::Lexing {
            reason: "unexpected character '$'".to_string(),
            position,
        };
        assert_eq!(error.span(), Span::at(position));
        assert_eq!(error.kind_label(), "Lexer");
    }

    #[test]
    fn test_display_includes_kind() {
        let error = CompileError::Transpiling {
            reason: "can't export this type of expression".to_string(),
            span: Span::default(),
        };
        assert_eq!(
            error.to_string(),
            "TranspilerError: can't export this type of expression"
        );
    }
}
