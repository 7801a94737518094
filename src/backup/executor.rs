//! Backup execution: copying a file set into a run subdirectory.
//!
//! A run goes through a fixed sequence of gates (run directory, non-empty
//! copy set, size limit, destination and run directories) and only then
//! copies files. Each gate aborts the run with a warning; once copying has
//! started, failures are recorded per file and the run carries on.

use super::report::{AbortReason, BackupReport, FileOutcome};
use crate::fileset::size_of;
use crate::resolve::{PathResolver, ProjectPath};
use crate::{Error, Result};
use chrono::Utc;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::{debug, info, span, warn, Level};

/// Copies a file set into `destination/<run name>`
#[derive(Debug)]
pub struct BackupExecutor<'a> {
    resolver: &'a PathResolver,
    destination: &'a ProjectPath,
    size_limit: u64,
    verbose: bool,
}

impl<'a> BackupExecutor<'a> {
    pub fn new(resolver: &'a PathResolver, destination: &'a ProjectPath) -> Self {
        Self {
            resolver,
            destination,
            size_limit: super::DEFAULT_SIZE_LIMIT,
            verbose: true,
        }
    }

    pub fn with_size_limit(mut self, size_limit: u64) -> Self {
        self.size_limit = size_limit;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Copy `copy_set` into the run subdirectory `run_name`.
    ///
    /// Existing targets are never overwritten. The returned report is
    /// complete only if every file was copied.
    pub fn run(&self, copy_set: &HashSet<ProjectPath>, run_name: &str) -> BackupReport {
        let span = span!(Level::INFO, "backup_run", run = %run_name);
        let _enter = span.enter();

        let mut report = BackupReport::new();

        let run_dir = match self.resolve_run_dir(run_name) {
            Ok(run_dir) => run_dir,
            Err(e) => {
                warn!("Not copying files. Invalid backup directory: {}", e);
                let reason = match e {
                    Error::EmptyPath => AbortReason::EmptyRunName,
                    _ => AbortReason::OutsideRoot {
                        path: run_name.trim().to_string(),
                    },
                };
                return report.abort(reason);
            }
        };
        report.run_dir = Some(run_dir.relative().to_path_buf());

        if copy_set.is_empty() {
            warn!("Nothing to copy.");
            return report.abort(AbortReason::NothingToCopy);
        }

        let size = size_of(copy_set);
        report.planned_files = copy_set.len();
        report.planned_bytes = size;

        if let Err(e) = self.check_size(size) {
            warn!(
                "Not copying files. {}. Increase the limit with size_limit(bytes).",
                e
            );
            return report.abort(AbortReason::SizeLimitExceeded {
                size,
                limit: self.size_limit,
            });
        }

        for dir in [self.destination, &run_dir] {
            if let Err(e) = self.ensure_dir(dir) {
                warn!("Could not create directory {}: {}", dir, e);
                return report.abort(AbortReason::CreateDirectory {
                    path: dir.relative().to_path_buf(),
                    error: e.to_string(),
                });
            }
        }

        let mut files: Vec<FileOutcome> = copy_set
            .par_iter()
            .map(|file| self.copy_one(file, &run_dir))
            .collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));

        report.files = files;
        report.finished = Utc::now();

        if self.verbose {
            info!("{}", report.summary());
        }
        report
    }

    fn resolve_run_dir(&self, run_name: &str) -> Result<ProjectPath> {
        let name = self.resolver.resolve(run_name, false)?;
        if name.is_root() {
            return Err(Error::EmptyPath);
        }
        self.resolver.join(self.destination, &name)
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.size_limit {
            return Err(Error::SizeLimitExceeded {
                size,
                limit: self.size_limit,
            });
        }
        Ok(())
    }

    fn ensure_dir(&self, dir: &ProjectPath) -> Result<()> {
        if dir.absolute().is_dir() {
            return Ok(());
        }
        fs::create_dir_all(dir.absolute())?;
        if self.verbose {
            info!("Created directory {}", dir);
        }
        Ok(())
    }

    fn copy_one(&self, file: &ProjectPath, run_dir: &ProjectPath) -> FileOutcome {
        let path = file.relative().to_path_buf();

        // A symlink already sitting inside the run directory must not carry
        // the copy out of the root
        let result = self
            .resolver
            .join(run_dir, file)
            .and_then(|target| copy_file(file.absolute(), target.absolute(), self.resolver.root()));

        match result {
            Ok(bytes) => {
                if self.verbose {
                    info!("Copied {} to {}", file, run_dir);
                }
                FileOutcome::Copied { path, bytes }
            }
            Err(Error::DestinationConflict { .. }) => {
                warn!("File {} already exists in {}. Not copying.", file, run_dir);
                FileOutcome::Skipped {
                    path,
                    reason: "already exists".to_string(),
                }
            }
            Err(e) => {
                warn!("Failed to copy {}: {}", file, e);
                FileOutcome::Failed {
                    path,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Copy `source` to a new file at `target`, never replacing an existing one.
///
/// The parent directory of `target` must canonicalize to a path under `root`.
fn copy_file(source: &Path, target: &Path, root: &Path) -> Result<u64> {
    if fs::symlink_metadata(target).is_ok() {
        return Err(Error::DestinationConflict {
            path: target.to_path_buf(),
        });
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
        if !fs::canonicalize(parent)?.starts_with(root) {
            return Err(Error::OutsideRoot {
                path: target.display().to_string(),
            });
        }
    }

    let mut reader = File::open(source)?;
    let mut writer = match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(writer) => writer,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(Error::DestinationConflict {
                path: target.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let bytes = match io::copy(&mut reader, &mut writer) {
        Ok(bytes) => bytes,
        Err(e) => {
            // The partial file is ours; leave no half-written copy behind
            drop(writer);
            let _ = fs::remove_file(target);
            return Err(e.into());
        }
    };

    if let Ok(metadata) = reader.metadata() {
        if let Err(e) = fs::set_permissions(target, metadata.permissions()) {
            debug!("Could not copy permissions to {}: {}", target.display(), e);
        }
    }

    Ok(bytes)
}
