//! Command-line host for simple-backup.
//!
//! A thin front-end over [`BackupSession`]: it builds a session from a config
//! file and flags, then either previews or runs a backup.

use crate::config::{BackupConfig, CONFIG_FILE_NAME};
use crate::session::BackupSession;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod preview;
pub mod run;

/// simple-backup - never lose your work
#[derive(Parser)]
#[command(name = "simple-backup")]
#[command(about = "Back up a project into timestamped subdirectories of a destination folder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Append log lines to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Copy the selected files into a new run directory
    Run(run::RunArgs),
    /// Show which files a run would copy, omit and ignore
    Preview(preview::PreviewArgs),
}

/// Options shared by every command that builds a session
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Project root directory
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (defaults to simplebackup.toml in the project root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File or directory to copy, relative to the root (repeatable)
    #[arg(short, long = "include")]
    pub include: Vec<String>,

    /// File or directory never to copy (repeatable)
    #[arg(short = 'x', long = "omit")]
    pub omit: Vec<String>,

    /// Destination directory, relative to the root
    #[arg(long)]
    pub to: Option<String>,

    /// Size limit in bytes
    #[arg(long)]
    pub size_limit: Option<u64>,

    /// strftime pattern for run directory names
    #[arg(long)]
    pub date_pattern: Option<String>,

    /// Only print warnings
    #[arg(short, long)]
    pub quiet: bool,
}

impl SessionArgs {
    /// Load the config, if any, and apply the flags on top of it
    pub fn build_session(&self) -> Result<BackupSession> {
        let config = self.load_config()?;

        let mut session = match &config {
            Some(config) => BackupSession::from_config(&self.root, config),
            None => BackupSession::new(&self.root),
        }
        .with_context(|| format!("Failed to open project root {}", self.root.display()))?;

        if let Some(to) = &self.to {
            session.to(to);
        }
        if let Some(limit) = self.size_limit {
            session.size_limit(limit);
        }
        if let Some(pattern) = &self.date_pattern {
            session.date_pattern(pattern);
        }
        if self.quiet {
            session.verbose(false);
        }
        session.copy(&self.include).omit(&self.omit);

        Ok(session)
    }

    fn load_config(&self) -> Result<Option<BackupConfig>> {
        match &self.config {
            Some(path) => BackupConfig::load(path)
                .map(Some)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => BackupConfig::discover(&self.root)
                .with_context(|| format!("Failed to load {}", CONFIG_FILE_NAME)),
        }
    }
}
