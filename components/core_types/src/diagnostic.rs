//! Human-readable rendering of compile errors.
//!
//! The output layout is consumed by the CLI and by anything else that shows
//! errors to people, so it is kept stable:
//!
//! ```text
//!   ─┬─> ParserError at main.ka:1:5
//!    │
//!  1 │ a = = 1
//!    │     ^
//!    └──> unexpected token EQUALS, expected an expression
//! ```

use crate::{CompileError, Span};
use std::fmt::Write;

/// Spans covering more lines than this only show their first and last line.
const MAX_FULL_LINES: u32 = 4;

/// Render `error` against `source`, labelling the location with `file_label`.
///
/// # Examples
///
/// ```
/// use core_types::{format_diagnostic, CompileError, SourcePosition, Span};
///
/// let error = CompileError::Parsing {
///     reason: "expected an expression".to_string(),
///     span: Span::new(SourcePosition::new(4, 0, 4), SourcePosition::new(4, 0, 4)),
/// };
/// let out = format_diagnostic(&error, "a = = 1", "main.ka");
/// assert!(out.lines().any(|l| l.trim_end().ends_with("│     ^")));
/// ```
pub fn format_diagnostic(error: &CompileError, source: &str, file_label: &str) -> String {
    let span = error.span();
    let normalized = source.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let width = (span.end.line + 1).to_string().len();
    let pad = " ".repeat(width);
    let reason = error.reason().replace('\n', "\\n").replace('\r', "\\r");

    let mut out = String::new();
    let _ = writeln!(
        out,
        " {pad}─┬─> {}Error at {file_label}:{}:{}",
        error.kind_label(),
        span.start.line + 1,
        span.start.column + 1
    );
    let _ = writeln!(out, " {pad} │");

    if span.end.line - span.start.line + 1 > MAX_FULL_LINES {
        render_line(&mut out, &lines, span.start.line, width);
        let _ = writeln!(out, "{}", caret_row(&pad, &span, span.start.line, &lines));
        let _ = writeln!(out, " {pad} .");
        let _ = writeln!(out, " {pad} .");
        let _ = writeln!(out, " {pad} │");
        render_line(&mut out, &lines, span.end.line, width);
        let _ = writeln!(out, "{}", caret_row(&pad, &span, span.end.line, &lines));
    } else {
        for line in span.start.line..=span.end.line {
            render_line(&mut out, &lines, line, width);
            let _ = writeln!(out, "{}", caret_row(&pad, &span, line, &lines));
        }
    }

    let _ = write!(out, " {pad} └──> {reason}");
    out
}

fn line_text<'a>(lines: &[&'a str], line: u32) -> &'a str {
    lines.get(line as usize).copied().unwrap_or("")
}

fn render_line(out: &mut String, lines: &[&str], line: u32, width: usize) {
    let _ = writeln!(
        out,
        " {:>width$} │ {}",
        line + 1,
        line_text(lines, line),
        width = width
    );
}

fn caret_row(pad: &str, span: &Span, line: u32, lines: &[&str]) -> String {
    let text_len = line_text(lines, line).chars().count();
    let start_col = span.start.column as usize;
    let end_col = span.end.column as usize;

    let (indent, carets) = if line == span.start.line && line == span.end.line {
        (start_col, end_col.saturating_sub(start_col) + 1)
    } else if line == span.start.line {
        (start_col, text_len.saturating_sub(start_col))
    } else if line < span.end.line {
        (0, text_len)
    } else {
        (0, end_col + 1)
    };

    format!(" {pad} │ {}{}", " ".repeat(indent), "^".repeat(carets))
}
