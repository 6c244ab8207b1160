//! Connection configuration.
//!
//! Defines the YAML-serializable settings used to open a
//! [`Database`](crate::Database).
//!
//! # Example YAML
//!
//! ```yaml
//! path: data/app.db
//! create_if_missing: true
//! enforce_foreign_keys: false
//! busy_timeout_ms: 5000
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Settings for opening a database connection.
///
/// # Examples
///
/// ```
/// # use rowbind_sqlite::DatabaseConfig;
/// let config = DatabaseConfig::new("app.db").with_foreign_keys(true);
/// assert!(config.create_if_missing);
/// assert!(config.enforce_foreign_keys);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the database file. `:memory:` opens a private in-memory database.
    pub path: PathBuf,
    /// Create the file if it does not exist.
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
    /// Enforce foreign keys (`PRAGMA foreign_keys = ON`); off otherwise.
    #[serde(default)]
    pub enforce_foreign_keys: bool,
    /// How long to wait on a locked database before failing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub busy_timeout_ms: Option<u64>,
}

fn default_true() -> bool {
    true
}

impl DatabaseConfig {
    /// Default settings for the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_if_missing: true,
            enforce_foreign_keys: false,
            busy_timeout_ms: None,
        }
    }

    pub fn with_foreign_keys(mut self, enforce: bool) -> Self {
        self.enforce_foreign_keys = enforce;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the file cannot be read, or
    /// [`DbError::Config`] if it is not valid configuration YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Writes this configuration as YAML.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(BufWriter::new(file), self).map_err(|e| DbError::Config(e.to_string()))
    }
}
