//! Core source-location and error types for the KaLang compiler.
//!
//! This crate provides the foundational types shared by every stage of the
//! pipeline, including source positions, spans, the compile error taxonomy,
//! and the human-readable diagnostic renderer.
//!
//! # Overview
//!
//! - [`SourcePosition`] - Zero-based location in a source file
//! - [`Span`] - Inclusive range between two positions
//! - [`CompileError`] - Lexing, parsing and transpiling errors
//! - [`format_diagnostic`] - Renders an error against its source text
//!
//! # Examples
//!
//! ```
//! use core_types::{CompileError, SourcePosition, format_diagnostic};
//!
//! let error = CompileError::Lexing {
//!     reason: "unclosed string literal".to_string(),
//!     position: SourcePosition::new(4, 0, 4),
//! };
//!
//! let report = format_diagnostic(&error, "\"abc", "main.ka");
//! assert!(report.contains("LexerError at main.ka:1:5"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod diagnostic;
mod error;
mod source;

pub use diagnostic::format_diagnostic;
pub use error::{CompileError, CompileResult};
pub use source::{SourcePosition, Span};
