//! Collaborator traits for the data source boundary

use super::errors::SourceResult;
use super::types::{ColumnDef, TableDef};
use super::value::Value;

static NULL: Value = Value::Null;

/// One raw row, values in physical column order
pub type RawRow = Vec<Value>;

/// Read access to the typed values of one row by column name
pub trait RowAccess {
    /// Returns the column definition and value, or `None` if the row has
    /// no such column
    fn column(&self, name: &str) -> Option<(&ColumnDef, &Value)>;
}

/// A sequential reader over the raw rows of one table
pub trait TableReader {
    /// Returns the table definition
    fn definition(&self) -> &TableDef;

    /// Reads the next raw row, `None` once the table is exhausted
    fn next_row(&mut self) -> SourceResult<Option<RawRow>>;
}

/// An opened data source
pub trait DataSource {
    /// Returns the name the source was opened with
    fn name(&self) -> &str;

    /// Lists the physical (user) tables
    fn table_names(&self) -> SourceResult<Vec<String>>;

    /// Returns the physical column list of a table
    fn table_definition(&self, table: &str) -> SourceResult<TableDef>;

    /// Opens a reader positioned before the first row of a table
    fn open_table(&self, table: &str) -> SourceResult<Box<dyn TableReader>>;
}

/// Opens data sources by name
pub trait SourceOpener {
    fn open(&self, name: &str) -> SourceResult<Box<dyn DataSource>>;
}

/// A row paired with the definition of the table it came from
pub struct RowView<'a> {
    def: &'a TableDef,
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    /// Creates a view over a raw row
    pub fn new(def: &'a TableDef, values: &'a [Value]) -> Self {
        Self { def, values }
    }
}

impl RowAccess for RowView<'_> {
    fn column(&self, name: &str) -> Option<(&ColumnDef, &Value)> {
        let idx = self.def.column_index(name)?;
        // Short rows read as NULL in their trailing columns
        let value = self.values.get(idx).unwrap_or(&NULL);
        Some((&self.def.columns[idx], value))
    }
}
