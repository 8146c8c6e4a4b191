//! Contract tests for the compiler API
//!
//! These tests verify the compiler component implements its contract correctly.

use ka_compiler::ast::{BinaryOperator, Expression, Statement};
use ka_compiler::{
    format_diagnostic, parse_source, transpile_source_text, CompileError, Lexer, Parser,
    Resolver, Token, TokenKind, TranspileOptions, Transpiler,
};

// =============================================================================
// Lexer Contract Tests
// =============================================================================

#[test]
fn test_lexer_next_token_returns_result() {
    let mut lexer = Lexer::new("x = 42");
    let result: Result<Token, CompileError> = lexer.next_token();
    assert!(result.is_ok());
}

#[test]
fn test_lexer_ends_with_eof_sentinel() {
    let tokens = Lexer::new("a b").lex_all().unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[2].kind, TokenKind::Eof);
    assert_eq!(tokens[2].span.start.offset, 3);
}

#[test]
fn test_range_lexes_as_three_tokens() {
    let tokens = Lexer::new("0..10").lex_all().unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Number,
            TokenKind::Operator,
            TokenKind::Number,
            TokenKind::Eof
        ]
    );
    assert_eq!(tokens[1].text, "..");
}

#[test]
fn test_unterminated_string_points_at_end_of_input() {
    let err = Lexer::new("\"abc").lex_all().unwrap_err();
    match err {
        CompileError::Lexing { position, .. } => {
            assert_eq!(position.offset, 4);
            assert_eq!(position.column, 4);
        }
        other => panic!("expected lexing error, got {:?}", other),
    }
}

// =============================================================================
// Parser Contract Tests
// =============================================================================

#[test]
fn test_parser_consumes_token_list() {
    let tokens = Lexer::new("main()").lex_all().unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_parser_tolerates_missing_eof() {
    let mut tokens = Lexer::new("a = 1").lex_all().unwrap();
    tokens.pop();
    let program = Parser::new(tokens).parse().unwrap();
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_assignability_contract() {
    assert!(parse_source("a = 1").is_ok());
    assert!(parse_source("a.b = 1").is_ok());
    assert!(matches!(
        parse_source("1 = 1"),
        Err(CompileError::Parsing { .. })
    ));
    assert!(matches!(
        parse_source("a() = 1"),
        Err(CompileError::Parsing { .. })
    ));
}

#[test]
fn test_for_range_parses_as_binary_range() {
    let program = parse_source("for i in 0..10 do console.log(i) end").unwrap();
    match &program.body[0] {
        Statement::For { iterable, .. } => assert!(matches!(
            iterable,
            Expression::Binary {
                operator: BinaryOperator::Range,
                ..
            }
        )),
        other => panic!("expected for statement, got {:?}", other),
    }
}

// =============================================================================
// Resolver Contract Tests
// =============================================================================

#[test]
fn test_resolver_lookups_after_run() {
    let program = parse_source("a = 1\nfunction f do\n  b = 2\nend").unwrap();
    let mut resolver = Resolver::new(&program);
    resolver.run();

    let by_offset = resolver.lookup_by_offset(22).map(|s| s.id);
    let by_line = resolver.lookup_by_line_column(2, 2).map(|s| s.id);
    assert!(by_offset.is_some());
    assert_eq!(by_offset, by_line);
    assert_ne!(by_offset, Some(0));
}

// =============================================================================
// Transpiler Contract Tests
// =============================================================================

#[test]
fn test_transpile_output_order() {
    let js = transpile_source_text("if true then x = 1 end", None, None).unwrap();
    let helper = js.find("function __kaGetRange").unwrap();
    let table = js.find("const __kaOperators").unwrap();
    let hoisted = js.find("let x;").unwrap();
    let body = js.find("if (true)").unwrap();
    assert!(helper < table && table < hoisted && hoisted < body);
}

#[test]
fn test_transpiler_is_rerunnable() {
    let program = parse_source("x = 1").unwrap();
    let mut transpiler = Transpiler::new(&program).with_options(TranspileOptions::default());
    let first = transpiler.transpile().unwrap();
    let second = transpiler.transpile().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_import_needs_oracle_only_when_used() {
    assert!(transpile_source_text("x = 1", Some("a/b.ka"), None).is_ok());

    let err = transpile_source_text("import lib", Some("a/b.ka"), None).unwrap_err();
    assert!(matches!(err, CompileError::Transpiling { .. }));
}

#[test]
fn test_closure_oracle() {
    let oracle = |path: &str| path == "src/lib/math.ka";
    let js = transpile_source_text("import lib.math", Some("src/main.ka"), Some(&oracle)).unwrap();
    assert!(js.contains("import * as math from \"./lib/math.js\";"));
}

// =============================================================================
// Diagnostic Contract Tests
// =============================================================================

#[test]
fn test_format_diagnostic_for_lexing_error() {
    let source = "\"abc";
    let err = transpile_source_text(source, None, None).unwrap_err();
    let rendered = format_diagnostic(&err, source, "<main>");
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "  ─┬─> LexerError at <main>:1:5");
    assert_eq!(lines[2], " 1 │ \"abc");
    assert_eq!(lines[3], "   │     ^");
    assert_eq!(lines[4], "   └──> unclosed string literal");
}

#[test]
fn test_format_diagnostic_for_parsing_error() {
    let source = "x = (1";
    let err = transpile_source_text(source, None, None).unwrap_err();
    let rendered = format_diagnostic(&err, source, "main.ka");
    assert!(rendered.contains("ParserError at main.ka:1:7"));
    assert!(rendered.ends_with("unexpected token EOF, expected ')' (DELIMITER)"));
}
