//! KaLang CLI
//!
//! Entry point for the compiler. Parses CLI arguments, installs logging and
//! delegates to the driver.

use clap::Parser as ClapParser;
use ka_cli::Cli;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = ka_cli::run(&cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
