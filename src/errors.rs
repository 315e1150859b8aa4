//! Session error types
//!
//! Error codes:
//! - MDB_SQL_DUPLICATE_TABLE (BUILD)
//! - MDB_SQL_DUPLICATE_COLUMN (BUILD)
//! - MDB_SQL_INVALID_NAME (BUILD)
//! - MDB_SQL_INVALID_OPERATOR (BUILD)
//! - MDB_SQL_MALFORMED_PREDICATE (BUILD)
//! - MDB_SQL_UNKNOWN_COLUMN (BUILD or EXECUTION)
//! - MDB_SQL_CONVERSION_OVERFLOW (EXECUTION)
//! - MDB_SQL_INVALID_LIMIT (BUILD)
//! - MDB_SQL_DATA_SOURCE_ERROR (EXECUTION)
//! - MDB_SQL_NO_DATA_SOURCE (BUILD)
//! - MDB_SQL_NO_TABLE (BUILD)
//! - MDB_SQL_UNKNOWN_TABLE (BUILD)
//! - MDB_SQL_INVALID_CONVERSION (EXECUTION)
//! - MDB_SQL_INVALID_COLUMN_NUMBER (BUILD)
//! - MDB_SQL_PREDICATE_NOT_FINALIZED (EXECUTION)
//!
//! Construction errors leave the offending state untouched, so the caller
//! may fix the input and retry the same build step. Execution errors abort
//! the current fetch only.

use std::fmt;

use crate::source::SourceError;

/// The stage of a query session an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Raised while the query is being described
    Build,
    /// Raised while rows are being fetched
    Execution,
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStage::Build => write!(f, "BUILD"),
            ErrorStage::Execution => write!(f, "EXECUTION"),
        }
    }
}

/// Session error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlErrorCode {
    /// Table already selected
    DuplicateTable,
    /// Column already selected
    DuplicateColumn,
    /// Empty table or column name
    InvalidName,
    /// Unrecognized comparison operator token
    InvalidOperator,
    /// Operand stack discipline violated
    MalformedPredicate,
    /// Column is neither selected nor part of the physical schema
    UnknownColumn,
    /// Value does not fit the requested output type
    ConversionOverflow,
    /// LIMIT is not a non-negative integer
    InvalidLimit,
    /// Failure reported by the data source
    DataSourceError,
    /// No data source has been opened
    NoDataSource,
    /// No table resolved, or table selection is ambiguous
    NoTable,
    /// The data source has no table of that name
    UnknownTable,
    /// Text cannot be parsed into the required type
    InvalidConversion,
    /// Temporary column position is past the end of the table
    InvalidColumnNumber,
    /// Rows requested while the predicate is still being built
    PredicateNotFinalized,
}

impl SqlErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SqlErrorCode::DuplicateTable => "MDB_SQL_DUPLICATE_TABLE",
            SqlErrorCode::DuplicateColumn => "MDB_SQL_DUPLICATE_COLUMN",
            SqlErrorCode::InvalidName => "MDB_SQL_INVALID_NAME",
            SqlErrorCode::InvalidOperator => "MDB_SQL_INVALID_OPERATOR",
            SqlErrorCode::MalformedPredicate => "MDB_SQL_MALFORMED_PREDICATE",
            SqlErrorCode::UnknownColumn => "MDB_SQL_UNKNOWN_COLUMN",
            SqlErrorCode::ConversionOverflow => "MDB_SQL_CONVERSION_OVERFLOW",
            SqlErrorCode::InvalidLimit => "MDB_SQL_INVALID_LIMIT",
            SqlErrorCode::DataSourceError => "MDB_SQL_DATA_SOURCE_ERROR",
            SqlErrorCode::NoDataSource => "MDB_SQL_NO_DATA_SOURCE",
            SqlErrorCode::NoTable => "MDB_SQL_NO_TABLE",
            SqlErrorCode::UnknownTable => "MDB_SQL_UNKNOWN_TABLE",
            SqlErrorCode::InvalidConversion => "MDB_SQL_INVALID_CONVERSION",
            SqlErrorCode::InvalidColumnNumber => "MDB_SQL_INVALID_COLUMN_NUMBER",
            SqlErrorCode::PredicateNotFinalized => "MDB_SQL_PREDICATE_NOT_FINALIZED",
        }
    }

    /// Returns the stage this error is normally raised in
    pub fn stage(&self) -> ErrorStage {
        match self {
            SqlErrorCode::ConversionOverflow
            | SqlErrorCode::DataSourceError
            | SqlErrorCode::InvalidConversion
            | SqlErrorCode::PredicateNotFinalized => ErrorStage::Execution,
            _ => ErrorStage::Build,
        }
    }
}

impl fmt::Display for SqlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Session error with full context
#[derive(Debug, Clone, PartialEq)]
pub struct SqlError {
    code: SqlErrorCode,
    message: String,
    /// Table or column name if applicable
    name: Option<String>,
}

impl SqlError {
    fn named(code: SqlErrorCode, message: String, name: impl Into<String>) -> Self {
        Self {
            code,
            message,
            name: Some(name.into()),
        }
    }

    fn plain(code: SqlErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            name: None,
        }
    }

    /// Create a duplicate table error
    pub fn duplicate_table(table: &str) -> Self {
        Self::named(
            SqlErrorCode::DuplicateTable,
            format!("Table '{}' is already selected", table),
            table,
        )
    }

    /// Create a duplicate column error
    pub fn duplicate_column(column: &str) -> Self {
        Self::named(
            SqlErrorCode::DuplicateColumn,
            format!("Column '{}' is already selected", column),
            column,
        )
    }

    /// Create an invalid name error
    pub fn invalid_name(what: &str) -> Self {
        Self::plain(
            SqlErrorCode::InvalidName,
            format!("{} name must not be empty", what),
        )
    }

    /// Create an invalid operator error
    pub fn invalid_operator(token: &str) -> Self {
        Self::plain(
            SqlErrorCode::InvalidOperator,
            format!("Unrecognized operator '{}'", token),
        )
    }

    /// Create a malformed predicate error
    pub fn malformed_predicate(reason: impl Into<String>) -> Self {
        Self::plain(SqlErrorCode::MalformedPredicate, reason)
    }

    /// Create an unknown column error
    pub fn unknown_column(column: &str) -> Self {
        Self::named(
            SqlErrorCode::UnknownColumn,
            format!("Column '{}' not found", column),
            column,
        )
    }

    /// Create a conversion overflow error
    pub fn conversion_overflow(column: &str, target: &str) -> Self {
        Self::named(
            SqlErrorCode::ConversionOverflow,
            format!("Value of column '{}' does not fit in {}", column, target),
            column,
        )
    }

    /// Create an invalid limit error
    pub fn invalid_limit(text: &str) -> Self {
        Self::plain(
            SqlErrorCode::InvalidLimit,
            format!("Invalid limit '{}': expected a non-negative integer", text),
        )
    }

    /// Create a data source error
    pub fn data_source(reason: impl Into<String>) -> Self {
        Self::plain(SqlErrorCode::DataSourceError, reason)
    }

    /// Create a no data source error
    pub fn no_data_source() -> Self {
        Self::plain(SqlErrorCode::NoDataSource, "You must connect to a database first")
    }

    /// Create a no table error
    pub fn no_table(reason: impl Into<String>) -> Self {
        Self::plain(SqlErrorCode::NoTable, reason)
    }

    /// Create an unknown table error
    pub fn unknown_table(table: &str) -> Self {
        Self::named(
            SqlErrorCode::UnknownTable,
            format!("Table '{}' not found", table),
            table,
        )
    }

    /// Create an invalid conversion error
    pub fn invalid_conversion(text: &str, target: &str) -> Self {
        Self::plain(
            SqlErrorCode::InvalidConversion,
            format!("Cannot convert '{}' to {}", text, target),
        )
    }

    /// Create an invalid column number error
    pub fn invalid_column_number(col_num: usize, len: usize) -> Self {
        Self::plain(
            SqlErrorCode::InvalidColumnNumber,
            format!(
                "Column number {} is past the end of a table with {} columns",
                col_num, len
            ),
        )
    }

    /// Create a predicate not finalized error
    pub fn predicate_not_finalized(pending: usize) -> Self {
        Self::plain(
            SqlErrorCode::PredicateNotFinalized,
            format!("Predicate has {} pending operand(s); call finalize first", pending),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SqlErrorCode {
        self.code
    }

    /// Returns the stage
    pub fn stage(&self) -> ErrorStage {
        self.code.stage()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table or column name if applicable
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage(), self.code.code(), self.message)
    }
}

impl std::error::Error for SqlError {}

impl From<SourceError> for SqlError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::TableNotFound(table) => SqlError::unknown_table(&table),
            other => SqlError::data_source(other.to_string()),
        }
    }
}

/// Result type for session operations
pub type SqlResult<T> = Result<T, SqlError>;
