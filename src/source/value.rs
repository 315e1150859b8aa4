//! Raw column values as handed over by a data source

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use super::errors::{SourceError, SourceResult};
use super::types::ColumnType;

/// Accepted textual date/time layouts, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// A typed raw value read from a row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Binary(Vec<u8>),
}

impl Value {
    /// Returns true for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a JSON cell into a value of the declared column type.
    pub fn from_json(cell: &serde_json::Value, col_type: ColumnType) -> SourceResult<Self> {
        use serde_json::Value as Json;

        if cell.is_null() {
            return Ok(Value::Null);
        }

        let mismatch = || {
            SourceError::Invalid(format!(
                "value {} does not match column type {}",
                cell,
                col_type.type_name()
            ))
        };

        match col_type {
            ColumnType::Boolean => match cell {
                Json::Bool(b) => Ok(Value::Bool(*b)),
                Json::Number(n) => Ok(Value::Bool(n.as_i64() != Some(0))),
                _ => Err(mismatch()),
            },
            ColumnType::Byte | ColumnType::Int | ColumnType::LongInt => {
                cell.as_i64().map(Value::Int).ok_or_else(mismatch)
            }
            ColumnType::Money | ColumnType::Float | ColumnType::Double | ColumnType::Numeric => {
                cell.as_f64().map(Value::Float).ok_or_else(mismatch)
            }
            ColumnType::DateTime => cell
                .as_str()
                .and_then(parse_datetime)
                .map(Value::DateTime)
                .ok_or_else(mismatch),
            ColumnType::Text | ColumnType::Memo | ColumnType::RepId => match cell {
                Json::String(s) => Ok(Value::Text(s.clone())),
                other => Ok(Value::Text(other.to_string())),
            },
            ColumnType::Binary | ColumnType::Ole => match cell {
                Json::String(s) => Ok(Value::Binary(s.as_bytes().to_vec())),
                Json::Array(items) => items
                    .iter()
                    .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect::<Option<Vec<u8>>>()
                    .map(Value::Binary)
                    .ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
        }
    }
}

/// Parses a date/time literal, accepting bare dates as midnight.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Binary(bytes) => {
                for b in bytes {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    }
}
