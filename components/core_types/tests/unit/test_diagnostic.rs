//! Unit tests for the diagnostic renderer

use core_types::{format_diagnostic, CompileError, SourcePosition, Span};

#[test]
fn test_header_uses_one_based_location() {
    let error = CompileError::Parsing {
        reason: "expected an expression".to_string(),
        span: Span::at(SourcePosition::new(6, 1, 2)),
    };

    let out = format_diagnostic(&error, "x = 1\ny =", "game.ka");
    let header = out.lines().next().unwrap_or_default();

    assert!(header.ends_with("ParserError at game.ka:2:3"));
}

#[test]
fn test_shows_offending_line_only() {
    let error = CompileError::Transpiling {
        reason: "can't export this type of expression".to_string(),
        span: Span::new(SourcePosition::new(6, 1, 0), SourcePosition::new(15, 1, 9)),
    };

    let out = format_diagnostic(&error, "a = 1\nexport f()\nb = 2", "m.ka");

    assert!(out.contains(" 2 │ export f()"));
    assert!(out.contains("   │ ^^^^^^^^^^"));
    assert!(!out.contains("a = 1"));
    assert!(!out.contains("b = 2"));
}

#[test]
fn test_crlf_sources_render_like_lf() {
    let error = CompileError::Lexing {
        reason: "unexpected character '@'".to_string(),
        position: SourcePosition::new(5, 1, 1),
    };

    let lf = format_diagnostic(&error, "abc\n@@", "f");
    let crlf = format_diagnostic(&error, "abc\r\n@@", "f");

    assert_eq!(lf, crlf);
}

#[test]
fn test_line_number_gutter_widens() {
    let source = "\n".repeat(11) + "oops";
    let error = CompileError::Lexing {
        reason: "bad".to_string(),
        position: SourcePosition::new(11, 11, 0),
    };

    let out = format_diagnostic(&error, &source, "f");

    assert!(out.contains(" 12 │ oops"));
    assert!(out.contains("    │ ^"));
}
