//! # simple-backup
//!
//! Back up a project directory into timestamped subdirectories of a
//! destination folder, every time the host asks for it.
//!
//! ## Features
//!
//! - **Confined paths**: every include, omit and destination path is resolved
//!   inside the project root; `..` and absolute paths cannot escape it
//! - **File sets**: cumulative include/omit rules, a default-ignore list and
//!   automatic exclusion of the destination itself
//! - **Size limit**: runs larger than the limit copy nothing
//! - **Non-destructive copies**: existing files in a run directory are never
//!   overwritten, partial progress is kept and reported
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simple_backup::BackupSession;
//!
//! # fn main() -> simple_backup::Result<()> {
//! let mut session = BackupSession::new("./my-sketch")?;
//! session.copy(["/"]).omit(["data/huge.mov"]).to("backups");
//!
//! println!("{} bytes to copy", session.size());
//! let complete = session.backup_now();
//! println!("Backup complete: {}", complete);
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod fileset;
pub mod logging;
pub mod resolve;
pub mod session;
pub mod timestamp;

// Re-export commonly used types
pub use backup::{BackupExecutor, BackupReport, FileOutcome};
pub use config::BackupConfig;
pub use error::{Error, Result};
pub use resolve::{PathResolver, ProjectPath};
pub use session::BackupSession;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The library version
pub fn version() -> &'static str {
    VERSION
}
