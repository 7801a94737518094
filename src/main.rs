//! simple-backup - never lose your work
//!
//! Main binary entry point for the command-line interface.

use anyhow::Result;
use clap::Parser;
use simple_backup::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Informational lines are gated by the session; RUST_LOG=debug shows more
    match &cli.log_file {
        Some(path) => simple_backup::logging::init_file_logging(path, false)?,
        None => simple_backup::logging::init_logging(false)?,
    }

    match cli.command {
        Commands::Run(args) => simple_backup::cli::run::run(args),
        Commands::Preview(args) => simple_backup::cli::preview::run(args),
    }
}
