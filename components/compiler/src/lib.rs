//! KaLang Compiler Component
//!
//! Translates KaLang source into JavaScript source.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes KaLang source code
//! - [`Token`] - Position-tagged tokens
//! - [`Parser`] - Recursive descent parser producing the AST
//! - [`Program`] - Abstract Syntax Tree root
//! - [`Resolver`] - Position-indexed scope information for tooling
//! - [`Transpiler`] - Converts the AST to JavaScript
//!
//! # Example
//!
//! ```
//! use ka_compiler::transpile_source_text;
//!
//! let js = transpile_source_text("for i in 0..3 do console.log(i) end", None, None).unwrap();
//! assert!(js.contains("for (i of __kaOperators[\"..\"](0, 3))"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod scope;

pub use ast::{Expression, Program, Statement};
pub use codegen::{FileExists, TranspileOptions, Transpiler};
pub use core_types::{format_diagnostic, CompileError, CompileResult, SourcePosition, Span};
pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::Parser;
pub use scope::{Resolver, Scope, ScopeId, ScopeKind, ScopeTree, Symbol, SymbolKind};

/// Lex and parse `source` into a program
pub fn parse_source(source: &str) -> CompileResult<Program> {
    let tokens = Lexer::new(source).lex_all()?;
    Parser::new(tokens).parse()
}

/// Run the whole pipeline over `text`
///
/// `path_hint` names the file being compiled (imports resolve relative to
/// its directory) and defaults to `<main>`. `oracle` is only consulted, and
/// only required, when the program contains an import.
pub fn transpile_source_text(
    text: &str,
    path_hint: Option<&str>,
    oracle: Option<&dyn FileExists>,
) -> CompileResult<String> {
    let program = parse_source(text)?;

    let mut options = TranspileOptions::default();
    if let Some(path) = path_hint {
        options.file_path = path.to_string();
    }

    let mut transpiler = Transpiler::new(&program).with_options(options);
    if let Some(oracle) = oracle {
        transpiler = transpiler.with_oracle(oracle);
    }
    transpiler.transpile()
}
