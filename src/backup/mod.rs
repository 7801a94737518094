//! Backup module providing the copy-run executor and its reports.
//!
//! A run copies the effective file set into `destination/<run name>`,
//! mirroring the project tree and never overwriting existing files.

pub mod executor;
pub mod report;

/// Destination directory used until another one is set
pub const DEFAULT_DESTINATION: &str = "simplebackup";

/// Largest copy set, in bytes, a run accepts by default
pub const DEFAULT_SIZE_LIMIT: u64 = 100_000;

// Re-export main types
pub use executor::BackupExecutor;
pub use report::{AbortReason, BackupReport, FileOutcome};
