//! Explicit configuration for the employee store.
//!
//! # Responsibility
//! - Describe store, logging and numbering settings as plain structs.
//! - Load them from TOML once at startup and hand them to constructors.
//!
//! # Invariants
//! - No process-wide mutable configuration exists; every consumer receives
//!   its settings through a constructor argument.
//! - `store.database_path` is the only required key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_NUMBER_PREFIX: &str = "EMP-";
const DEFAULT_NUMBER_WIDTH: usize = 4;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub numbering: NumberingConfig,
}

/// Settings consumed by [`crate::db::ConnectionManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file. Its parent directory must already exist.
    pub database_path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    /// Creates a store config with default timeouts.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Settings consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Absolute directory for rotating log files. Logs go to stderr when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

/// Shape of generated employee numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingConfig {
    /// Prefix used for the very first number when the store is empty.
    #[serde(default = "default_number_prefix")]
    pub prefix: String,
    /// Minimum digit count, zero-padded.
    #[serde(default = "default_number_width")]
    pub width: usize,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            prefix: default_number_prefix(),
            width: DEFAULT_NUMBER_WIDTH,
        }
    }
}

impl AppConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// - Returns [`ConfigError::Parse`] for malformed TOML or missing keys.
    /// - Returns [`ConfigError::Invalid`] for values that parse but cannot be used.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.store.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "store.database_path",
                message: "must not be empty".to_string(),
            });
        }
        if self.numbering.width == 0 {
            return Err(ConfigError::Invalid {
                key: "numbering.width",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_number_prefix() -> String {
    DEFAULT_NUMBER_PREFIX.to_string()
}

fn default_number_width() -> usize {
    DEFAULT_NUMBER_WIDTH
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [store]
            database_path = "/var/lib/employees/store.sqlite3"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.store.database_path,
            PathBuf::from("/var/lib/employees/store.sqlite3")
        );
        assert_eq!(config.store.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.log_dir.is_none());
        assert_eq!(config.numbering.prefix, "EMP-");
        assert_eq!(config.numbering.width, 4);
    }

    #[test]
    fn explicit_sections_override_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [store]
            database_path = "staff.db"
            busy_timeout_ms = 250

            [logging]
            level = "debug"
            log_dir = "/tmp/employee-logs"

            [numbering]
            prefix = "STAFF/"
            width = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.store.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.log_dir,
            Some(PathBuf::from("/tmp/employee-logs"))
        );
        assert_eq!(config.numbering.prefix, "STAFF/");
        assert_eq!(config.numbering.width, 6);
    }

    #[test]
    fn missing_store_section_is_a_parse_error() {
        let err = AppConfig::from_toml_str("[logging]\nlevel = \"info\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_width_numbering_is_rejected() {
        let err = AppConfig::from_toml_str(
            "[store]\ndatabase_path = \"a.db\"\n[numbering]\nwidth = 0\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "numbering.width",
                ..
            }
        ));
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = AppConfig::load(&path).unwrap_err();
        match err {
            ConfigError::Read { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
