//! Configuration file for the CLI
//!
//! ```json
//! {
//!   "data_source": "northwind.json",
//!   "error_capacity": 1024,
//!   "max_rows": 0,
//!   "text_capacity": 256,
//!   "log_level": "warn"
//! }
//! ```
//!
//! Only `data_source` is required. A relative data source path is resolved
//! against the directory holding the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::{SessionOptions, DEFAULT_ERROR_CAPACITY, DEFAULT_TEXT_CAPACITY};
use crate::observability::Severity;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlConfig {
    /// Data source opened by every command (required)
    pub data_source: String,

    /// Bytes kept of the last error message (default 1024)
    #[serde(default = "default_error_capacity")]
    pub error_capacity: usize,

    /// Rows returned per query, 0 for unbounded (default 0)
    #[serde(default)]
    pub max_rows: u64,

    /// Minimum buffer capacity for synthesized bindings (default 256)
    #[serde(default = "default_text_capacity")]
    pub text_capacity: usize,

    /// Minimum log severity written to stderr (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory relative data source paths resolve against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn default_error_capacity() -> usize {
    DEFAULT_ERROR_CAPACITY
}
fn default_text_capacity() -> usize {
    DEFAULT_TEXT_CAPACITY
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl SqlConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;
        config.base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: SqlConfig = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_source.trim().is_empty() {
            return Err(CliError::config_error("data_source must not be empty"));
        }
        if self.error_capacity == 0 {
            return Err(CliError::config_error("error_capacity must be > 0"));
        }
        if self.text_capacity == 0 {
            return Err(CliError::config_error("text_capacity must be > 0"));
        }
        if Severity::parse(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn or error.",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Directory relative data source names resolve against
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Minimum log severity
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Warn)
    }

    /// Session settings derived from this configuration
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            error_capacity: self.error_capacity,
            max_rows: self.max_rows,
            text_capacity: self.text_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SqlConfig::from_json(r#"{"data_source": "db.json"}"#).unwrap();
        assert_eq!(config.error_capacity, 1024);
        assert_eq!(config.max_rows, 0);
        assert_eq!(config.text_capacity, 256);
        assert_eq!(config.severity(), Severity::Warn);
        assert!(config.base_dir().is_none());
        assert_eq!(config.session_options(), SessionOptions::default());
    }

    #[test]
    fn test_missing_data_source() {
        let err = SqlConfig::from_json("{}").unwrap_err();
        assert_eq!(err.code_str(), "MDB_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_validation() {
        for bad in [
            r#"{"data_source": ""}"#,
            r#"{"data_source": "db.json", "error_capacity": 0}"#,
            r#"{"data_source": "db.json", "text_capacity": 0}"#,
            r#"{"data_source": "db.json", "log_level": "loud"}"#,
        ] {
            assert!(SqlConfig::from_json(bad).is_err(), "accepted {}", bad);
        }
    }
}
