//! Physical schema types
//!
//! Column types follow the Access/Jet type set:
//! - boolean, byte, int (16-bit), longint (32-bit)
//! - money, float, double, numeric
//! - datetime
//! - text, memo
//! - binary, ole, repid

use serde::{Deserialize, Serialize};

/// Declared type of a physical column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Byte,
    Int,
    LongInt,
    Money,
    Float,
    Double,
    DateTime,
    Binary,
    Text,
    Ole,
    Memo,
    RepId,
    Numeric,
}

impl ColumnType {
    /// Returns the type name for describe output and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "Boolean",
            ColumnType::Byte => "Byte",
            ColumnType::Int => "Integer",
            ColumnType::LongInt => "Long Integer",
            ColumnType::Money => "Currency",
            ColumnType::Float => "Single",
            ColumnType::Double => "Double",
            ColumnType::DateTime => "DateTime",
            ColumnType::Binary => "Binary",
            ColumnType::Text => "Text",
            ColumnType::Ole => "OLE",
            ColumnType::Memo => "Memo/Hyperlink",
            ColumnType::RepId => "Replication ID",
            ColumnType::Numeric => "Numeric",
        }
    }

    /// Storage size in bytes for fixed-width types, or the default
    /// maximum for variable-width ones
    pub fn default_size(&self) -> usize {
        match self {
            ColumnType::Boolean | ColumnType::Byte => 1,
            ColumnType::Int => 2,
            ColumnType::LongInt | ColumnType::Float => 4,
            ColumnType::Money | ColumnType::Double | ColumnType::DateTime => 8,
            ColumnType::RepId | ColumnType::Numeric => 16,
            ColumnType::Text | ColumnType::Binary => 255,
            ColumnType::Ole | ColumnType::Memo => 0,
        }
    }

    /// Whether values of this type occupy a fixed number of bytes
    pub fn is_fixed(&self) -> bool {
        !matches!(
            self,
            ColumnType::Text | ColumnType::Binary | ColumnType::Ole | ColumnType::Memo
        )
    }
}

/// A physical (or temporary) column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: ColumnType,
    /// Declared size in bytes; zero means the type default
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub is_fixed: bool,
}

impl ColumnDef {
    /// Create a column with the type's default size
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            size: col_type.default_size(),
            is_fixed: col_type.is_fixed(),
        }
    }

    /// Create a column with an explicit size
    pub fn with_size(name: impl Into<String>, col_type: ColumnType, size: usize) -> Self {
        Self {
            size,
            ..Self::new(name, col_type)
        }
    }

    /// Maximum rendered width of a value of this column.
    pub fn display_size(&self) -> usize {
        match self.col_type {
            ColumnType::Boolean => 1,
            ColumnType::Byte => 3,
            ColumnType::Int => 6,
            ColumnType::LongInt => 11,
            ColumnType::Float | ColumnType::Double => 20,
            ColumnType::Money | ColumnType::Numeric => 21,
            ColumnType::DateTime => 20,
            ColumnType::RepId => 38,
            ColumnType::Memo => 64000,
            ColumnType::Text | ColumnType::Binary | ColumnType::Ole => match self.size {
                0 => 255,
                n => n,
            },
        }
    }
}

/// A table definition: name plus ordered columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Create a table definition
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Returns the position of a column, matching names case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Returns the number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}
