//! Backup session: the state a host configures before triggering backups.
//!
//! Configuration calls never fail. Bad paths are reported with a warning and
//! skipped, so a host can chain calls without handling errors:
//!
//! ```rust,no_run
//! use simple_backup::BackupSession;
//!
//! # fn main() -> simple_backup::Result<()> {
//! let mut session = BackupSession::new("./my-project")?;
//! session
//!     .copy(["/"])
//!     .omit(["assets/video.mp4"])
//!     .to("backups")
//!     .size_limit(500_000);
//!
//! if !session.backup_now() {
//!     eprintln!("backup incomplete");
//! }
//! # Ok(())
//! # }
//! ```

use crate::backup::{BackupExecutor, BackupReport, DEFAULT_DESTINATION, DEFAULT_SIZE_LIMIT};
use crate::config::BackupConfig;
use crate::fileset::{size_of, FileSetEngine, DEFAULT_IGNORE};
use crate::resolve::{PathResolver, ProjectPath};
use crate::timestamp::{current_date_and_time, validate_pattern, DEFAULT_DATE_PATTERN};
use crate::Result;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Include/omit rules, destination and limits for one project root
#[derive(Debug, Clone)]
pub struct BackupSession {
    resolver: PathResolver,
    files: FileSetEngine,
    destination: ProjectPath,
    size_limit: u64,
    verbose: bool,
    date_pattern: String,
    default_ignore: Vec<String>,
}

impl BackupSession {
    /// Start a session for the project rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let resolver = PathResolver::new(root)?;
        let destination = resolver.resolve(DEFAULT_DESTINATION, false)?;

        Ok(Self {
            resolver,
            files: FileSetEngine::new(),
            destination,
            size_limit: DEFAULT_SIZE_LIMIT,
            verbose: true,
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            default_ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Start a session and apply `config` to it
    pub fn from_config<P: AsRef<Path>>(root: P, config: &BackupConfig) -> Result<Self> {
        config.validate()?;

        let mut session = Self::new(root)?;
        session
            .verbose(config.verbose)
            .size_limit(config.size_limit)
            .date_pattern(&config.date_pattern)
            .default_ignore(&config.ignore)
            .to(&config.destination)
            .copy(&config.include)
            .omit(&config.omit);
        Ok(session)
    }

    /// Add files or directories to copy
    pub fn copy<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.files.include(&self.resolver, paths);
        self
    }

    /// Add files or directories never to copy
    pub fn omit<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.files.omit(&self.resolver, paths);
        self
    }

    /// Set the destination directory.
    ///
    /// An empty or invalid directory keeps the previous destination.
    pub fn to(&mut self, backup_dir: &str) -> &mut Self {
        match self.resolver.resolve(backup_dir, false) {
            Ok(destination) if destination.is_root() => {
                warn!("Destination directory is empty. Keeping {}.", self.destination);
            }
            Ok(destination) => {
                self.destination = destination;
                if self.verbose {
                    info!("Backing up to {}", self.destination);
                }
            }
            Err(e) => {
                warn!("Invalid destination directory: {}. Keeping {}.", e, self.destination);
            }
        }
        self
    }

    /// Set the size limit in bytes. Runs over the limit copy nothing.
    pub fn size_limit(&mut self, bytes: u64) -> &mut Self {
        self.size_limit = bytes;
        self
    }

    /// Enable or disable informational output. Warnings are always shown.
    pub fn verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Set the strftime pattern naming timestamped runs.
    ///
    /// An invalid pattern keeps the previous one.
    pub fn date_pattern(&mut self, pattern: &str) -> &mut Self {
        match validate_pattern(pattern) {
            Ok(()) => self.date_pattern = pattern.to_string(),
            Err(e) => warn!("{}. Keeping {}.", e, self.date_pattern),
        }
        self
    }

    /// Replace the list of relative path suffixes that are never copied
    pub fn default_ignore<I, S>(&mut self, suffixes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.default_ignore = suffixes
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// Back up into a subdirectory named after the current date and time.
    ///
    /// Returns `true` if every file was copied.
    pub fn backup_now(&self) -> bool {
        match current_date_and_time(&self.date_pattern) {
            Ok(name) => self.backup_now_named(&name),
            Err(e) => {
                warn!("Not copying files. {}", e);
                false
            }
        }
    }

    /// Back up into the subdirectory `sub_dir` of the destination.
    ///
    /// Returns `true` if every file was copied.
    pub fn backup_now_named(&self, sub_dir: &str) -> bool {
        self.run_backup(sub_dir).is_complete()
    }

    /// Back up into `sub_dir` and return the full report
    pub fn run_backup(&self, sub_dir: &str) -> BackupReport {
        BackupExecutor::new(&self.resolver, &self.destination)
            .with_size_limit(self.size_limit)
            .with_verbose(self.verbose)
            .run(&self.copy_set(), sub_dir)
    }

    /// The files the next run would copy
    pub fn copy_set(&self) -> HashSet<ProjectPath> {
        self.files
            .effective_copy_set(&self.destination, self.default_ignore.as_slice())
    }

    /// Relative paths of the files the next run would copy
    pub fn files_to_copy(&self) -> Vec<String> {
        sorted(&self.copy_set())
    }

    /// Relative paths of the files omitted by the user
    pub fn files_omitted(&self) -> Vec<String> {
        sorted(self.files.omitted())
    }

    /// Relative paths of included files dropped by the default-ignore list
    /// or because they live under the destination
    pub fn files_ignored(&self) -> Vec<String> {
        sorted(&self.files.ignored(&self.destination, self.default_ignore.as_slice()))
    }

    /// Total size in bytes of the files the next run would copy
    pub fn size(&self) -> u64 {
        size_of(&self.copy_set())
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn destination(&self) -> &ProjectPath {
        &self.destination
    }

    pub fn size_limit_bytes(&self) -> u64 {
        self.size_limit
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn current_date_pattern(&self) -> &str {
        &self.date_pattern
    }
}

fn sorted(files: &HashSet<ProjectPath>) -> Vec<String> {
    let mut paths: Vec<String> = files
        .iter()
        .map(|p| p.relative().to_string_lossy().into_owned())
        .collect();
    paths.sort();
    paths
}
