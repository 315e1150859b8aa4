//! Type-directed conversion of raw values into output values
//!
//! Conversion is dispatched on the binding's [`OutputType`]:
//! - text renders the value and truncates to the display size, never past
//!   the buffer capacity
//! - integer outputs widen freely and fail with `ConversionOverflow` when
//!   the value does not fit the requested width
//! - floating outputs fail only when a finite value exceeds `f32` range
//! - NULL converts to [`OutputValue::Null`] with length zero for every type

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{SqlError, SqlResult};
use crate::source::{parse_datetime, ColumnType, Value};

/// Requested output representation of a bound column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Text,
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    DateTime,
    Binary,
}

impl OutputType {
    /// Default output type for a physical column type
    pub fn for_column(col_type: ColumnType) -> Self {
        match col_type {
            ColumnType::Boolean => OutputType::Boolean,
            ColumnType::Byte => OutputType::Byte,
            ColumnType::Int => OutputType::Int16,
            ColumnType::LongInt => OutputType::Int32,
            ColumnType::Float => OutputType::Float32,
            ColumnType::Money | ColumnType::Double | ColumnType::Numeric => OutputType::Float64,
            ColumnType::DateTime => OutputType::DateTime,
            ColumnType::Binary | ColumnType::Ole => OutputType::Binary,
            ColumnType::Text | ColumnType::Memo | ColumnType::RepId => OutputType::Text,
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            OutputType::Text => "text",
            OutputType::Boolean => "boolean",
            OutputType::Byte => "byte",
            OutputType::Int16 => "int16",
            OutputType::Int32 => "int32",
            OutputType::Int64 => "int64",
            OutputType::Float32 => "float32",
            OutputType::Float64 => "float64",
            OutputType::DateTime => "datetime",
            OutputType::Binary => "binary",
        }
    }
}

/// A converted value as written into an output buffer
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OutputValue {
    #[default]
    Null,
    Text(String),
    Boolean(bool),
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    DateTime(NaiveDateTime),
    Binary(Vec<u8>),
}

impl OutputValue {
    /// Returns the text payload, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutputValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns any integer payload widened to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OutputValue::Byte(v) => Some(i64::from(*v)),
            OutputValue::Int16(v) => Some(i64::from(*v)),
            OutputValue::Int32(v) => Some(i64::from(*v)),
            OutputValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts to JSON for the command-line output
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            OutputValue::Null => Json::Null,
            OutputValue::Text(s) => Json::from(s.as_str()),
            OutputValue::Boolean(b) => Json::from(*b),
            OutputValue::Byte(v) => Json::from(*v),
            OutputValue::Int16(v) => Json::from(*v),
            OutputValue::Int32(v) => Json::from(*v),
            OutputValue::Int64(v) => Json::from(*v),
            OutputValue::Float32(v) => Json::from(*v),
            OutputValue::Float64(v) => Json::from(*v),
            OutputValue::DateTime(dt) => {
                Json::from(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            OutputValue::Binary(bytes) => Json::from(bytes.clone()),
        }
    }
}

/// Result of converting one value: the output and its length in bytes
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub value: OutputValue,
    pub len: usize,
}

impl Converted {
    fn fixed(value: OutputValue, len: usize) -> Self {
        Self { value, len }
    }
}

/// Converts a raw value of `column` into `output`.
///
/// `display_size` bounds rendered text; `capacity` bounds every
/// variable-length output.
pub fn convert(
    value: &Value,
    column: &str,
    output: OutputType,
    display_size: usize,
    capacity: usize,
) -> SqlResult<Converted> {
    if value.is_null() {
        return Ok(Converted::fixed(OutputValue::Null, 0));
    }

    let overflow = || SqlError::conversion_overflow(column, output.type_name());

    match output {
        OutputType::Text => {
            let rendered = value.to_string();
            let text = truncate_utf8(&rendered, display_size.min(capacity));
            Ok(Converted::fixed(OutputValue::Text(text.to_string()), text.len()))
        }
        OutputType::Binary => {
            let mut bytes = match value {
                Value::Binary(b) => b.clone(),
                Value::Text(s) => s.as_bytes().to_vec(),
                other => other.to_string().into_bytes(),
            };
            bytes.truncate(capacity);
            let len = bytes.len();
            Ok(Converted::fixed(OutputValue::Binary(bytes), len))
        }
        OutputType::Boolean => {
            let b = match value {
                Value::Bool(b) => *b,
                Value::Int(i) => *i != 0,
                Value::Float(x) => *x != 0.0,
                Value::Text(s) => parse_bool(s)
                    .ok_or_else(|| SqlError::invalid_conversion(s, output.type_name()))?,
                other => return Err(unsupported(other, output)),
            };
            Ok(Converted::fixed(OutputValue::Boolean(b), 1))
        }
        OutputType::Byte => {
            let v = u8::try_from(to_i64(value, column, output)?).map_err(|_| overflow())?;
            Ok(Converted::fixed(OutputValue::Byte(v), 1))
        }
        OutputType::Int16 => {
            let v = i16::try_from(to_i64(value, column, output)?).map_err(|_| overflow())?;
            Ok(Converted::fixed(OutputValue::Int16(v), 2))
        }
        OutputType::Int32 => {
            let v = i32::try_from(to_i64(value, column, output)?).map_err(|_| overflow())?;
            Ok(Converted::fixed(OutputValue::Int32(v), 4))
        }
        OutputType::Int64 => {
            let v = to_i64(value, column, output)?;
            Ok(Converted::fixed(OutputValue::Int64(v), 8))
        }
        OutputType::Float32 => {
            let v = to_f64(value, output)?;
            if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                return Err(overflow());
            }
            Ok(Converted::fixed(OutputValue::Float32(v as f32), 4))
        }
        OutputType::Float64 => {
            let v = to_f64(value, output)?;
            Ok(Converted::fixed(OutputValue::Float64(v), 8))
        }
        OutputType::DateTime => {
            let dt = match value {
                Value::DateTime(dt) => *dt,
                Value::Text(s) => parse_datetime(s)
                    .ok_or_else(|| SqlError::invalid_conversion(s, output.type_name()))?,
                other => return Err(unsupported(other, output)),
            };
            Ok(Converted::fixed(OutputValue::DateTime(dt), 8))
        }
    }
}

/// Truncates to at most `max` bytes without splitting a character.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Parses the boolean spellings accepted in constants and text values
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn to_i64(value: &Value, column: &str, output: OutputType) -> SqlResult<i64> {
    let overflow = || SqlError::conversion_overflow(column, output.type_name());
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Int(i) => Ok(*i),
        Value::Float(x) => float_to_i64(*x).ok_or_else(overflow),
        Value::Text(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            match s.parse::<f64>() {
                Ok(x) => float_to_i64(x).ok_or_else(overflow),
                Err(_) => Err(SqlError::invalid_conversion(s, output.type_name())),
            }
        }
        other => Err(unsupported(other, output)),
    }
}

fn float_to_i64(x: f64) -> Option<i64> {
    let t = x.trunc();
    // i64::MAX is not exactly representable; 2^63 is the first value out of range
    if t.is_finite() && t >= -9_223_372_036_854_775_808.0 && t < 9_223_372_036_854_775_808.0 {
        Some(t as i64)
    } else {
        None
    }
}

fn to_f64(value: &Value, output: OutputType) -> SqlResult<f64> {
    match value {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Int(i) => Ok(*i as f64),
        Value::Float(x) => Ok(*x),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| SqlError::invalid_conversion(s, output.type_name())),
        other => Err(unsupported(other, output)),
    }
}

fn unsupported(value: &Value, output: OutputType) -> SqlError {
    SqlError::invalid_conversion(&value.to_string(), output.type_name())
}
