//! KaLang CLI Library
//!
//! Argument definitions and the compile driver behind the `kalang` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod driver;
pub mod error;
pub mod oracle;

pub use cli::{Cli, Commands};
pub use driver::{run, Driver};
pub use error::{CliError, CliResult};
pub use oracle::FsOracle;
