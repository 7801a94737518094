//! Per-run backup reports.
//!
//! A report records what happened to every file of the copy set. It is an
//! all-or-nothing *report*: files copied before a failure stay on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Copied { path: PathBuf, bytes: u64 },
    /// Target already existed and was left untouched
    Skipped { path: PathBuf, reason: String },
    Failed { path: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileOutcome::Copied { path, .. }
            | FileOutcome::Skipped { path, .. }
            | FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_copied(&self) -> bool {
        matches!(self, FileOutcome::Copied { .. })
    }
}

/// Why a run stopped before copying anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbortReason {
    OutsideRoot { path: String },
    EmptyRunName,
    NothingToCopy,
    SizeLimitExceeded { size: u64, limit: u64 },
    CreateDirectory { path: PathBuf, error: String },
}

/// Result of one backup run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupReport {
    /// `destination/<run name>`, once resolved
    pub run_dir: Option<PathBuf>,
    pub planned_files: usize,
    pub planned_bytes: u64,
    pub files: Vec<FileOutcome>,
    pub aborted: Option<AbortReason>,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

impl BackupReport {
    pub(crate) fn new() -> Self {
        let now = Utc::now();
        Self {
            run_dir: None,
            planned_files: 0,
            planned_bytes: 0,
            files: Vec::new(),
            aborted: None,
            started: now,
            finished: now,
        }
    }

    pub(crate) fn abort(mut self, reason: AbortReason) -> Self {
        self.aborted = Some(reason);
        self.finished = Utc::now();
        self
    }

    /// True iff the run was not aborted and every planned file was copied
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none() && self.copied() == self.planned_files
    }

    pub fn copied(&self) -> usize {
        self.files.iter().filter(|f| f.is_copied()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn bytes_copied(&self) -> u64 {
        self.files
            .iter()
            .map(|f| match f {
                FileOutcome::Copied { bytes, .. } => *bytes,
                _ => 0,
            })
            .sum()
    }

    /// One line summary for logs
    pub fn summary(&self) -> String {
        if let Some(reason) = &self.aborted {
            return format!("Backup aborted: {:?}", reason);
        }

        let run_dir = self
            .run_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        format!(
            "Copied {} of {} files ({} bytes) to {}, {} skipped, {} failed",
            self.copied(),
            self.planned_files,
            self.bytes_copied(),
            run_dir,
            self.skipped(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BackupReport {
        let mut report = BackupReport::new();
        report.planned_files = 3;
        report.planned_bytes = 30;
        report.run_dir = Some(PathBuf::from("simplebackup/run"));
        report.files = vec![
            FileOutcome::Copied { path: PathBuf::from("a.txt"), bytes: 10 },
            FileOutcome::Skipped { path: PathBuf::from("b.txt"), reason: "already exists".to_string() },
            FileOutcome::Failed { path: PathBuf::from("c.txt"), reason: "denied".to_string() },
        ];
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.copied(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.bytes_copied(), 10);
        assert!(!report.is_complete());
        assert!(report.summary().starts_with("Copied 1 of 3 files"));
    }

    #[test]
    fn test_aborted_report_is_incomplete() {
        let report = BackupReport::new().abort(AbortReason::NothingToCopy);
        assert!(!report.is_complete());
        assert!(report.summary().contains("NothingToCopy"));
    }

    #[test]
    fn test_report_json_tags() -> crate::Result<()> {
        let json = serde_json::to_value(sample())?;
        assert_eq!(json["files"][0]["outcome"], "copied");
        assert_eq!(json["files"][1]["outcome"], "skipped");

        let aborted = BackupReport::new().abort(AbortReason::SizeLimitExceeded { size: 10, limit: 5 });
        let json = serde_json::to_value(&aborted)?;
        assert_eq!(json["aborted"]["reason"], "size_limit_exceeded");
        assert_eq!(json["aborted"]["limit"], 5);

        let aborted = BackupReport::new().abort(AbortReason::CreateDirectory {
            path: PathBuf::from("simplebackup"),
            error: "denied".to_string(),
        });
        let json = serde_json::to_value(&aborted)?;
        assert_eq!(json["aborted"]["reason"], "create_directory");
        assert_eq!(json["aborted"]["error"], "denied");
        Ok(())
    }
}
