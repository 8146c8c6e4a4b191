//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// KaLang to JavaScript compiler
#[derive(Debug, Parser)]
#[command(name = "kalang", version, about = "A CLI to interact with the KaLang transpiler")]
pub struct Cli {
    /// Log every pipeline stage
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Sub-command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// `kalang` sub-commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile KaLang files to JavaScript
    Compile {
        /// The files to compile
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// The output file (only with a single input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Lex, parse and resolve files without writing output
    Check {
        /// The files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the syntax tree of each file
        #[arg(long)]
        print_ast: bool,
    },
}
