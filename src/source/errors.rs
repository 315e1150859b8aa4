//! # Data Source Errors

use thiserror::Error;

/// Result type for data source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors reported by a data source implementation
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Data source not found: {0}")]
    NotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Read error: {0}")]
    Read(String),

    #[error("Invalid data source: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Invalid(format!("JSON error: {}", e))
    }
}
