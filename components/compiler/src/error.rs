//! Compiler error helpers

use crate::lexer::{Token, TokenKind};
use core_types::{CompileError, SourcePosition, Span};

/// Create a lexing error at a given position
pub fn lexing_error(reason: impl Into<String>, position: SourcePosition) -> CompileError {
    CompileError::Lexing {
        reason: reason.into(),
        position,
    }
}

/// Create a parsing error covering `span`
pub fn parsing_error(reason: impl Into<String>, span: Span) -> CompileError {
    CompileError::Parsing {
        reason: reason.into(),
        span,
    }
}

/// Create an unexpected token error reported at the offending token
pub fn unexpected_token(got: &Token, expected: TokenKind, value: Option<&str>) -> CompileError {
    let reason = match value {
        Some(value) => format!(
            "unexpected token {}, expected '{}' ({})",
            got.kind, value, expected
        ),
        None => format!("unexpected token {}, expected {}", got.kind, expected),
    };
    parsing_error(reason, got.span)
}

/// Create the error raised when no expression can start at `got`
pub fn expected_expression(got: &Token) -> CompileError {
    parsing_error("expected an expression", got.span)
}

/// Create a transpiling error covering `span`
pub fn transpiling_error(reason: impl Into<String>, span: Span) -> CompileError {
    CompileError::Transpiling {
        reason: reason.into(),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, text: &str) -> Token {
        let pos = SourcePosition::new(3, 0, 3);
        Token {
            kind,
            text: text.to_string(),
            span: Span::at(pos),
        }
    }

    #[test]
    fn test_lexing_error() {
        let err = lexing_error("unclosed string literal", SourcePosition::new(1, 0, 1));
        assert!(matches!(err, CompileError::Lexing { .. }));
        assert_eq!(err.reason(), "unclosed string literal");
    }

    #[test]
    fn test_unexpected_token_without_value() {
        let err = unexpected_token(&token(TokenKind::Number, "1"), TokenKind::Identifier, None);
        assert_eq!(err.reason(), "unexpected token NUMBER, expected IDENTIFIER");
        assert_eq!(err.span().start.offset, 3);
    }

    #[test]
    fn test_unexpected_token_with_value() {
        let err = unexpected_token(
            &token(TokenKind::Eof, ""),
            TokenKind::Delimiter,
            Some(")"),
        );
        assert_eq!(err.reason(), "unexpected token EOF, expected ')' (DELIMITER)");
    }

    #[test]
    fn test_expected_expression() {
        let err = expected_expression(&token(TokenKind::Equals, "="));
        assert!(matches!(err, CompileError::Parsing { .. }));
        assert_eq!(err.reason(), "expected an expression");
    }
}
