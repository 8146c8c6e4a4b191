//! Compile driver
//!
//! The Driver reads KaLang files, runs the compiler pipeline and writes the
//! generated JavaScript. Imports are resolved against the real filesystem.

use crate::cli::{Cli, Commands};
use crate::error::{CliError, CliResult};
use crate::oracle::FsOracle;
use ka_compiler::pretty::pretty_print;
use ka_compiler::{format_diagnostic, parse_source, transpile_source_text, CompileError, Resolver};
use std::path::{Path, PathBuf};

/// Runs the pipeline over files on disk
#[derive(Debug, Default)]
pub struct Driver {
    /// Whether `check` prints the syntax tree
    print_ast: bool,
}

impl Driver {
    /// Create a driver with default settings
    ///
    /// # Example
    /// ```
    /// use ka_cli::Driver;
    ///
    /// let driver = Driver::new().with_print_ast(true);
    /// assert!(driver.is_print_ast_enabled());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable AST printing for `check`
    pub fn with_print_ast(mut self, enabled: bool) -> Self {
        self.print_ast = enabled;
        self
    }

    /// Check if AST printing is enabled
    pub fn is_print_ast_enabled(&self) -> bool {
        self.print_ast
    }

    /// Compile a KaLang source string
    ///
    /// `path` names the source for import resolution and diagnostics.
    ///
    /// # Errors
    /// Returns `CliError::Compile` carrying the rendered diagnostic
    pub fn compile_source(&self, source: &str, path: &Path) -> CliResult<String> {
        let hint = path_hint(path);
        transpile_source_text(source, Some(&hint), Some(&FsOracle))
            .map_err(|error| compile_error(error, source, path))
    }

    /// Compile `input` and write the JavaScript to `output`, or next to the
    /// input with a `.js` extension
    ///
    /// # Returns
    /// The path that was written
    ///
    /// # Errors
    /// Returns `CliError` if a file cannot be read or written, or the
    /// source does not compile
    pub fn compile_file(&self, input: &Path, output: Option<&Path>) -> CliResult<PathBuf> {
        let source = read_source(input)?;
        let js = self.compile_source(&source, input)?;

        let target = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension("js"));
        std::fs::write(&target, js).map_err(|source| CliError::Write {
            path: target.clone(),
            source,
        })?;

        tracing::info!(input = %input.display(), output = %target.display(), "compiled");
        Ok(target)
    }

    /// Lex, parse and resolve `input` without emitting JavaScript
    ///
    /// # Returns
    /// The syntax tree dump when AST printing is enabled
    pub fn check_file(&self, input: &Path) -> CliResult<Option<String>> {
        let source = read_source(input)?;
        let program = parse_source(&source).map_err(|e| compile_error(e, &source, input))?;

        let mut resolver = Resolver::new(&program);
        resolver.run();
        tracing::debug!(
            file = %input.display(),
            scopes = resolver.scopes().scope_count(),
            "checked"
        );

        Ok(self.print_ast.then(|| pretty_print(&program)))
    }
}

/// Execute the parsed command line
///
/// # Errors
/// Stops at the first file that fails
pub fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Compile { files, output } => {
            if files.is_empty() {
                return Err(CliError::NoInput);
            }
            if output.is_some() && files.len() > 1 {
                return Err(CliError::AmbiguousOutput);
            }

            let driver = Driver::new();
            for file in files {
                driver.compile_file(file, output.as_deref())?;
            }
        }
        Commands::Check { files, print_ast } => {
            if files.is_empty() {
                return Err(CliError::NoInput);
            }

            let driver = Driver::new().with_print_ast(*print_ast);
            for file in files {
                if let Some(dump) = driver.check_file(file)? {
                    println!("{}", dump);
                }
            }
        }
    }
    Ok(())
}

fn read_source(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Forward slashes so import paths join the same way on every platform
fn path_hint(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn compile_error(error: CompileError, source: &str, path: &Path) -> CliError {
    let rendered = format_diagnostic(&error, source, &path.display().to_string());
    CliError::Compile { error, rendered }
}
