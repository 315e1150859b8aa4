//! In-memory data source
//!
//! Backs temporary tables (table listings, describe output) and serves as
//! the data source for the command-line tool, which loads it from a JSON
//! file of the form:
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "T",
//!       "columns": [{"name": "id", "type": "longint"}, {"name": "name", "type": "text", "size": 50}],
//!       "rows": [[1, "a"], [2, "b"]]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::errors::{SourceError, SourceResult};
use super::traits::{DataSource, RawRow, SourceOpener, TableReader};
use super::types::{ColumnDef, TableDef};
use super::value::Value;

/// A table held entirely in memory, readable front to back
#[derive(Debug, Clone)]
pub struct MemoryTable {
    def: TableDef,
    rows: Vec<RawRow>,
    cursor: usize,
}

impl MemoryTable {
    /// Creates an empty table with no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_columns(name, Vec::new())
    }

    /// Creates an empty table with the given columns
    pub fn with_columns(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            def: TableDef::new(name, columns),
            rows: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends a row; values are in column order
    pub fn push_row(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    /// Builder form of [`MemoryTable::push_row`]
    pub fn with_row(mut self, row: RawRow) -> Self {
        self.push_row(row);
        self
    }

    /// Returns the number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

impl TableReader for MemoryTable {
    fn definition(&self) -> &TableDef {
        &self.def
    }

    fn next_row(&mut self) -> SourceResult<Option<RawRow>> {
        let row = self.rows.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }
}

/// A data source holding a set of in-memory tables
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    tables: Vec<MemoryTable>,
}

impl MemorySource {
    /// Creates an empty source
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Adds a table, replacing one with the same name
    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.tables
            .retain(|t| !t.def.name.eq_ignore_ascii_case(&table.def.name));
        self.tables.push(table);
        self
    }

    /// Parses a source from its JSON representation
    pub fn from_json(name: impl Into<String>, json: &str) -> SourceResult<Self> {
        let file: SourceFile = serde_json::from_str(json)?;
        let mut source = Self::new(name);

        for table in file.tables {
            let columns: Vec<ColumnDef> = table
                .columns
                .into_iter()
                .map(|c| {
                    let size = if c.size == 0 {
                        c.col_type.default_size()
                    } else {
                        c.size
                    };
                    ColumnDef::with_size(c.name, c.col_type, size)
                })
                .collect();

            let mut mem = MemoryTable::with_columns(table.name, columns);
            for (n, cells) in table.rows.iter().enumerate() {
                if cells.len() > mem.def.num_columns() {
                    return Err(SourceError::Invalid(format!(
                        "row {} of table '{}' has {} values for {} columns",
                        n,
                        mem.def.name,
                        cells.len(),
                        mem.def.num_columns()
                    )));
                }
                let row = cells
                    .iter()
                    .zip(&mem.def.columns)
                    .map(|(cell, col)| Value::from_json(cell, col.col_type))
                    .collect::<SourceResult<RawRow>>()?;
                mem.push_row(row);
            }
            source = source.with_table(mem);
        }

        Ok(source)
    }

    /// Loads a source from a JSON file
    pub fn load(path: &Path) -> SourceResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
            _ => SourceError::from(e),
        })?;
        Self::from_json(path.display().to_string(), &content)
    }

    fn table(&self, name: &str) -> SourceResult<&MemoryTable> {
        self.tables
            .iter()
            .find(|t| t.def.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| SourceError::TableNotFound(name.to_string()))
    }
}

impl DataSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn table_names(&self) -> SourceResult<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.def.name.clone()).collect())
    }

    fn table_definition(&self, table: &str) -> SourceResult<TableDef> {
        Ok(self.table(table)?.def.clone())
    }

    fn open_table(&self, table: &str) -> SourceResult<Box<dyn TableReader>> {
        let mut reader = self.table(table)?.clone();
        reader.cursor = 0;
        Ok(Box::new(reader))
    }
}

/// Opens JSON files as [`MemorySource`]s, resolving relative names
/// against an optional base directory
#[derive(Debug, Clone, Default)]
pub struct JsonFileOpener {
    base_dir: Option<PathBuf>,
}

impl JsonFileOpener {
    /// Creates an opener resolving names against the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an opener resolving relative names against `dir`
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }
}

impl SourceOpener for JsonFileOpener {
    fn open(&self, name: &str) -> SourceResult<Box<dyn DataSource>> {
        let path = match &self.base_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };
        Ok(Box::new(MemorySource::load(&path)?))
    }
}

#[derive(Debug, Deserialize)]
struct SourceFile {
    #[serde(default)]
    tables: Vec<TableFile>,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    name: String,
    columns: Vec<ColumnDef>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ColumnType;

    const SAMPLE: &str = r#"{
        "tables": [
            {
                "name": "T",
                "columns": [
                    {"name": "id", "type": "longint"},
                    {"name": "name", "type": "text", "size": 10}
                ],
                "rows": [[1, "a"], [2, "b"]]
            },
            {"name": "Empty", "columns": [{"name": "x", "type": "int"}]}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let source = MemorySource::from_json("sample", SAMPLE).unwrap();
        assert_eq!(source.table_names().unwrap(), vec!["T", "Empty"]);

        let def = source.table_definition("t").unwrap();
        assert_eq!(def.columns[0].size, 4);
        assert!(def.columns[0].is_fixed);
        assert_eq!(def.columns[1].size, 10);
    }

    #[test]
    fn test_reader_yields_rows_in_order() {
        let source = MemorySource::from_json("sample", SAMPLE).unwrap();
        let mut reader = source.open_table("T").unwrap();

        assert_eq!(
            reader.next_row().unwrap(),
            Some(vec![Value::Int(1), Value::Text("a".into())])
        );
        assert_eq!(
            reader.next_row().unwrap(),
            Some(vec![Value::Int(2), Value::Text("b".into())])
        );
        assert_eq!(reader.next_row().unwrap(), None);
        assert_eq!(reader.next_row().unwrap(), None);
    }

    #[test]
    fn test_unknown_table() {
        let source = MemorySource::from_json("sample", SAMPLE).unwrap();
        assert!(matches!(
            source.open_table("Orders"),
            Err(SourceError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_row_wider_than_table_rejected() {
        let json = r#"{"tables": [{"name": "T", "columns": [{"name": "id", "type": "int"}], "rows": [[1, 2]]}]}"#;
        assert!(matches!(
            MemorySource::from_json("bad", json),
            Err(SourceError::Invalid(_))
        ));
    }

    #[test]
    fn test_builder() {
        let table = MemoryTable::with_columns("T", vec![ColumnDef::new("id", ColumnType::Int)])
            .with_row(vec![Value::Int(1)]);
        assert_eq!(table.num_rows(), 1);

        let source = MemorySource::new("mem").with_table(table);
        assert_eq!(source.name(), "mem");
    }
}
