//! Error types for simple-backup

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for backup operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Path {path} is outside the project root")]
    OutsideRoot { path: String },

    #[error("Path {path} does not exist")]
    NotFound { path: String },

    #[error("Path is empty")]
    EmptyPath,

    #[error("Project root {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Attempting to copy {size} bytes. Limit is {limit} bytes")]
    SizeLimitExceeded { size: u64, limit: u64 },

    #[error("File {path} already exists")]
    DestinationConflict { path: PathBuf },

    #[error("Invalid date pattern: {pattern}")]
    InvalidDatePattern { pattern: String },

    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for backup operations
pub type Result<T> = std::result::Result<T, Error>;
