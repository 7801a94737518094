use crate::backup::{DEFAULT_DESTINATION, DEFAULT_SIZE_LIMIT};
use crate::fileset::DEFAULT_IGNORE;
use crate::timestamp::{validate_pattern, DEFAULT_DATE_PATTERN};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// File name looked up in the project root by [`BackupConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "simplebackup.toml";

/// Session settings read from a TOML file.
///
/// Every field is optional in the file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Files and directories to copy
    pub include: Vec<String>,
    /// Files and directories never to copy
    pub omit: Vec<String>,
    pub destination: String,
    /// Size limit in bytes
    pub size_limit: u64,
    pub verbose: bool,
    /// strftime pattern naming run subdirectories
    pub date_pattern: String,
    /// Relative path suffixes that are always skipped
    pub ignore: Vec<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            omit: Vec::new(),
            destination: DEFAULT_DESTINATION.to_string(),
            size_limit: DEFAULT_SIZE_LIMIT,
            verbose: true,
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BackupConfig {
    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `<root>/simplebackup.toml` if it exists
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Option<Self>> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        debug!("Config saved to {}", path.display());
        Ok(())
    }

    /// Validate config settings
    pub fn validate(&self) -> Result<()> {
        if self.destination.trim().is_empty() {
            return Err(Error::Configuration {
                reason: "destination must not be empty".to_string(),
            });
        }

        validate_pattern(&self.date_pattern)?;

        if self.size_limit == 0 {
            warn!("Size limit is 0 bytes, only empty files can be backed up");
        }

        if self.include.is_empty() {
            warn!("No paths to include configured");
        }

        Ok(())
    }
}
