//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> Lexer -> Parser -> AST -> Transpiler -> JavaScript
//! plus the diagnostics produced when any stage fails.

use core_types::{format_diagnostic, CompileError};
use ka_compiler::{parse_source, transpile_source_text, Resolver, SymbolKind};

/// Helper function to transpile KaLang source and strip the runtime preamble
fn transpile_body(source: &str) -> String {
    let js = transpile_source_text(source, None, None).expect("Transpile failed");
    let (_, body) = js.split_once("};\n").expect("preamble terminator");
    body.to_string()
}

/// Test: Hello world program
#[test]
fn test_full_pipeline_hello_world() {
    let body = transpile_body("function main do\n  console.log(\"Hello, World!\")\nend\n\nmain()");

    assert_eq!(
        body,
        "function main() {\n    console.log(`Hello, World!`);\n}\nmain();"
    );
}

/// Test: Range loop goes through the operator table
#[test]
fn test_full_pipeline_range_loop() {
    let body = transpile_body("for i in 0..10 do console.log(i) end");

    assert_eq!(
        body,
        "let i;\nfor (i of __kaOperators[\"..\"](0, 10)) {\n    console.log(i);\n}"
    );
}

/// Test: Preamble precedes hoisted declarations and the program body
#[test]
fn test_full_pipeline_output_layout() {
    let js = transpile_source_text("score = 1 + 2", None, None).unwrap();

    assert!(js.starts_with("function __kaGetRange(start, end) {\n"));
    assert!(js.ends_with("};\nlet score;\nscore = __kaOperators[\"+\"](1, 2);"));
}

/// Test: Assignments inside nested control flow hoist to the function
#[test]
fn test_full_pipeline_hoists_to_function() {
    let body = transpile_body("function outer do\n  if ready then\n    count = 1\n  end\nend");

    assert_eq!(
        body,
        "function outer() {\n    let count;\n    if (ready) {\n        count = 1;\n    }\n}"
    );
}

/// Test: A small game-style program touching classes, loops and externs
#[test]
fn test_full_pipeline_game_program() {
    let source = "\
extern class Sprite
class Player do
  speed = 2
  __init__(name) do
    this.name = name
  end
end

function spawn(count) do
  players = []
  for i in 0..count do
    p = new Player(\"p\")
    players.push(p)
  end
  return players
end
";
    let body = transpile_body(source);

    assert!(!body.contains("Sprite"));
    assert!(body.contains(
        "class Player {\n    speed = 2;\n    constructor(name) {\n        this.name = name;\n    }\n}"
    ));
    assert!(body.contains("function spawn(count) {\n    let players;\n    let i;\n    let p;\n    players = [];"));
    assert!(body.contains(
        "    for (i of __kaOperators[\"..\"](0, count)) {\n        p = new Player(`p`);\n        players.push(p);\n    }\n    return players;\n}"
    ));
    assert!(!body.contains("let name;"));
}

/// Test: Imports resolve through an injected oracle
#[test]
fn test_full_pipeline_imports_with_closure_oracle() {
    let oracle = |path: &str| path == "game/lib/util.ka";
    let js = transpile_source_text(
        "from lib.util import a, b\nfrom engine import default Engine\nEngine.start(a, b)",
        Some("game/main.ka"),
        Some(&oracle),
    )
    .unwrap();

    let (_, body) = js.split_once("};\n").unwrap();
    assert_eq!(
        body,
        "import { a, b } from \"./lib/util.js\";\nimport Engine from \"engine\";\nEngine.start(a, b);"
    );
}

/// Test: Exported variables are declared inline
#[test]
fn test_full_pipeline_exports() {
    let body = transpile_body("export version = \"1.0\"\nexport function boot do end");

    assert_eq!(body, "export let version = `1.0`;\nexport function boot() {}");
}

/// Test: Unterminated string is reported by the lexer with a caret at end of input
#[test]
fn test_full_pipeline_lexing_error_diagnostic() {
    let source = "x = \"abc";
    let err = transpile_source_text(source, None, None).unwrap_err();

    assert!(matches!(err, CompileError::Lexing { .. }));
    assert_eq!(
        format_diagnostic(&err, source, "main.ka"),
        "  ─┬─> LexerError at main.ka:1:9\n   │\n 1 │ x = \"abc\n   │         ^\n   └──> unclosed string literal"
    );
}

/// Test: Parser errors point at the offending token
#[test]
fn test_full_pipeline_parsing_error_diagnostic() {
    let source = "x = 1\nfor 1 in xs do end";
    let err = transpile_source_text(source, None, None).unwrap_err();

    assert!(matches!(err, CompileError::Parsing { .. }));
    let rendered = format_diagnostic(&err, source, "main.ka");
    assert!(rendered.starts_with("  ─┬─> ParserError at main.ka:2:5\n"));
    assert!(rendered.contains(" 2 │ for 1 in xs do end\n   │     ^\n"));
}

/// Test: Transpiler errors carry the span of the offending statement
#[test]
fn test_full_pipeline_transpiling_error_diagnostic() {
    let source = "x = 1\nexport x = 2";
    let err = transpile_source_text(source, None, None).unwrap_err();

    let rendered = format_diagnostic(&err, source, "main.ka");
    assert!(rendered.contains("TranspilerError at main.ka:2:"));
    assert!(rendered.ends_with("can't export a variable after it has already been used"));
}

/// Test: Resolver sees the same bindings the transpiler hoists
#[test]
fn test_full_pipeline_resolver_symbols() {
    let source = "limit = 3\nfunction tick(dt) do\n  elapsed = dt\nend";
    let program = parse_source(source).unwrap();
    let mut resolver = Resolver::new(&program);
    resolver.run();

    let offset = source.find("elapsed").unwrap();
    let symbols = resolver.symbols_at_offset(offset);
    let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["limit", "tick", "dt", "elapsed"]);

    let tick = symbols.iter().find(|s| s.name == "tick").unwrap();
    assert_eq!(tick.kind, SymbolKind::Function);
    assert!(!tick.hoisted);
    assert!(symbols.iter().find(|s| s.name == "elapsed").unwrap().hoisted);
}
