//! Unit tests for CompileError

use core_types::{CompileError, SourcePosition, Span};

#[test]
fn test_reason_is_returned_for_every_kind() {
    let position = SourcePosition::new(0, 0, 0);
    let errors = [
        CompileError::Lexing {
            reason: "a".to_string(),
            position,
        },
        CompileError::Parsing {
            reason: "b".to_string(),
            span: Span::at(position),
        },
        CompileError::Transpiling {
            reason: "c".to_string(),
            span: Span::at(position),
        },
    ];

    let reasons: Vec<&str> = errors.iter().map(|e| e.reason()).collect();
    assert_eq!(reasons, vec!["a", "b", "c"]);
}

#[test]
fn test_kind_labels() {
    let span = Span::default();
    let parsing = CompileError::Parsing {
        reason: String::new(),
        span,
    };
    let transpiling = CompileError::Transpiling {
        reason: String::new(),
        span,
    };

    assert_eq!(parsing.kind_label(), "Parser");
    assert_eq!(transpiling.kind_label(), "Transpiler");
}

#[test]
fn test_parsing_error_keeps_full_span() {
    let span = Span::new(SourcePosition::new(2, 0, 2), SourcePosition::new(9, 1, 3));
    let error = CompileError::Parsing {
        reason: "unexpected token".to_string(),
        span,
    };

    assert_eq!(error.span(), span);
}

#[test]
fn test_compile_error_is_std_error() {
    let error: Box<dyn std::error::Error> = Box::new(CompileError::Lexing {
        reason: "unexpected character '@'".to_string(),
        position: SourcePosition::default(),
    });

    assert_eq!(error.to_string(), "LexerError: unexpected character '@'");
}
