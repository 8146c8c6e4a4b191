//! Error types for the CLI

use core_types::CompileError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file could not be read
    #[error("error: couldn't open {}: {source}", path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written
    #[error("error: couldn't write {}: {source}", path.display())]
    Write {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Compilation failed; `rendered` is the formatted diagnostic
    #[error("{rendered}")]
    Compile {
        /// The compiler error
        error: CompileError,
        /// Diagnostic text ready for the terminal
        rendered: String,
    },

    /// No files were named on the command line
    #[error("error: no input files")]
    NoInput,

    /// `--output` was combined with several inputs
    #[error("error: --output can only be used with a single input file")]
    AmbiguousOutput,
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
