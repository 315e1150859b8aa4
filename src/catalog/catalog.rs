//! Selected tables and columns of the active query

use crate::binding::{BindTarget, ColumnBinding, OutputBuffer, OutputType};
use crate::errors::{SqlError, SqlResult};
use crate::source::TableDef;

/// A selected table and its alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTable {
    pub name: String,
    /// Defaults to the table name
    pub alias: String,
}

impl SqlTable {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
        }
    }

    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }
}

/// Tables and columns selected by the query being built.
///
/// Names match case-insensitively, as physical names do in the source format.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    select_all: bool,
    tables: Vec<SqlTable>,
    columns: Vec<ColumnBinding>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a table
    pub fn add_table(&mut self, name: &str) -> SqlResult<()> {
        self.push_table(SqlTable::new(name))
    }

    /// Selects a table under an alias
    pub fn add_table_alias(&mut self, name: &str, alias: &str) -> SqlResult<()> {
        let alias = if alias.is_empty() { name } else { alias };
        self.push_table(SqlTable::with_alias(name, alias))
    }

    fn push_table(&mut self, table: SqlTable) -> SqlResult<()> {
        if table.name.is_empty() {
            return Err(SqlError::invalid_name("Table"));
        }
        if self.table(&table.name).is_some() {
            return Err(SqlError::duplicate_table(&table.name));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Selects a column with no output target
    pub fn add_column(&mut self, name: &str) -> SqlResult<()> {
        if name.is_empty() {
            return Err(SqlError::invalid_name("Column"));
        }
        if self.column(name).is_some() {
            return Err(SqlError::duplicate_column(name));
        }
        self.columns.push(ColumnBinding::new(name));
        Ok(())
    }

    /// Selects every physical column. Explicit columns are kept.
    pub fn select_all_columns(&mut self) {
        self.select_all = true;
    }

    pub fn is_select_all(&self) -> bool {
        self.select_all
    }

    pub fn tables(&self) -> &[SqlTable] {
        &self.tables
    }

    pub fn columns(&self) -> &[ColumnBinding] {
        &self.columns
    }

    /// Looks up a selected table by name or alias
    pub fn table(&self, name: &str) -> Option<&SqlTable> {
        self.tables.iter().find(|t| {
            t.name.eq_ignore_ascii_case(name) || t.alias.eq_ignore_ascii_case(name)
        })
    }

    pub fn column(&self, name: &str) -> Option<&ColumnBinding> {
        self.columns
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut ColumnBinding> {
        self.columns
            .iter_mut()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Attaches an output target to a selected column.
    ///
    /// Under `SELECT *` any column is accepted; once a table is resolved the
    /// name must exist in its schema. Binding a column covered only by
    /// `SELECT *` adds it to the selection.
    pub fn bind(
        &mut self,
        name: &str,
        target: BindTarget,
        output_type: OutputType,
        table: Option<&TableDef>,
    ) -> SqlResult<()> {
        let physical = table.and_then(|def| def.column(name));

        if self.column(name).is_none() {
            let covered = self.select_all && (table.is_none() || physical.is_some());
            if !covered {
                return Err(SqlError::unknown_column(name));
            }
            let mut binding = ColumnBinding::new(physical.map_or(name, |c| c.name.as_str()));
            if let Some(col) = physical {
                binding.set_display_size(col.display_size());
            }
            self.columns.push(binding);
        }

        if let Some(binding) = self.column_mut(name) {
            binding.attach(target, output_type);
        }
        Ok(())
    }

    /// Binds every column of the resolved table that has no target yet.
    ///
    /// Under `SELECT *` the selection is rebuilt in physical column order,
    /// keeping existing targets; columns outside the physical schema stay
    /// at the end. Otherwise only the explicitly selected columns are bound.
    /// Synthesized targets get buffers of `text_capacity` bytes (or the
    /// column display size, if larger) and length slots.
    pub fn bind_all(&mut self, table: &TableDef, text_capacity: usize) {
        if self.select_all {
            let mut ordered = Vec::with_capacity(table.num_columns());
            for col in &table.columns {
                let binding = match self.take_column(&col.name) {
                    Some(existing) => existing,
                    None => ColumnBinding::new(col.name.as_str()),
                };
                ordered.push(binding);
            }
            ordered.append(&mut self.columns);
            self.columns = ordered;
        }

        for binding in &mut self.columns {
            let col = match table.column(binding.name()) {
                Some(col) => col,
                None => continue,
            };
            if binding.display_size().is_none() {
                binding.set_display_size(col.display_size());
            }
            if !binding.is_bound() {
                let capacity = text_capacity.max(col.display_size());
                let target = BindTarget::new(OutputBuffer::new(), capacity)
                    .with_length(Default::default());
                binding.attach(target, OutputType::for_column(col.col_type));
            }
        }
    }

    fn take_column(&mut self, name: &str) -> Option<ColumnBinding> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name))?;
        Some(self.columns.remove(idx))
    }

    /// Checks explicit columns against a resolved table and fills their
    /// display sizes.
    pub fn resolve_columns(&mut self, table: &TableDef) -> SqlResult<()> {
        if let Some(missing) = self
            .columns
            .iter()
            .find(|c| table.column(c.name()).is_none())
        {
            return Err(SqlError::unknown_column(missing.name()));
        }
        for binding in &mut self.columns {
            if let Some(col) = table.column(binding.name()) {
                binding.set_display_size(col.display_size());
            }
        }
        Ok(())
    }

    /// Replaces the column selection with `SELECT *`
    pub fn select_only_all(&mut self) {
        self.columns.clear();
        self.select_all = true;
    }

    /// Clears all selections
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::OutputValue;
    use crate::errors::SqlErrorCode;
    use crate::source::{ColumnDef, ColumnType};

    fn table_t() -> TableDef {
        TableDef::new(
            "T",
            vec![
                ColumnDef::new("id", ColumnType::LongInt),
                ColumnDef::with_size("name", ColumnType::Text, 20),
                ColumnDef::new("price", ColumnType::Double),
            ],
        )
    }

    #[test]
    fn test_duplicate_table_leaves_list_unchanged() {
        let mut catalog = Catalog::new();
        catalog.add_table("X").unwrap();

        let err = catalog.add_table("x").unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::DuplicateTable);
        assert_eq!(catalog.tables(), &[SqlTable::new("X")]);
    }

    #[test]
    fn test_empty_names_rejected() {
        let mut catalog = Catalog::new();
        assert_eq!(
            catalog.add_table("").unwrap_err().code(),
            SqlErrorCode::InvalidName
        );
        assert_eq!(
            catalog.add_column("").unwrap_err().code(),
            SqlErrorCode::InvalidName
        );
    }

    #[test]
    fn test_alias_defaults_to_name() {
        let mut catalog = Catalog::new();
        catalog.add_table_alias("Orders", "").unwrap();
        catalog.add_table_alias("Customers", "c").unwrap();

        assert_eq!(catalog.tables()[0].alias, "Orders");
        assert_eq!(catalog.table("c").unwrap().name, "Customers");
    }

    #[test]
    fn test_duplicate_column() {
        let mut catalog = Catalog::new();
        catalog.add_column("id").unwrap();
        let err = catalog.add_column("ID").unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::DuplicateColumn);
        assert_eq!(catalog.columns().len(), 1);
    }

    #[test]
    fn test_select_all_keeps_explicit_columns() {
        let mut catalog = Catalog::new();
        catalog.add_column("name").unwrap();
        catalog.select_all_columns();

        assert!(catalog.is_select_all());
        assert_eq!(catalog.columns().len(), 1);
    }

    #[test]
    fn test_bind_unknown_column() {
        let mut catalog = Catalog::new();
        catalog.add_column("id").unwrap();

        let target = BindTarget::new(OutputBuffer::new(), 16);
        let err = catalog
            .bind("name", target, OutputType::Text, None)
            .unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::UnknownColumn);
    }

    #[test]
    fn test_bind_covered_by_select_all() {
        let mut catalog = Catalog::new();
        catalog.select_all_columns();
        let table = table_t();

        let target = BindTarget::new(OutputBuffer::new(), 16);
        catalog
            .bind("NAME", target.clone(), OutputType::Text, Some(&table))
            .unwrap();
        assert_eq!(catalog.columns()[0].name(), "name");
        assert_eq!(catalog.columns()[0].display_size(), Some(20));

        let err = catalog
            .bind("missing", target, OutputType::Text, Some(&table))
            .unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::UnknownColumn);
    }

    #[test]
    fn test_bind_all_uses_physical_order() {
        let mut catalog = Catalog::new();
        catalog.select_all_columns();
        let table = table_t();

        catalog.bind_all(&table, 256);

        let names: Vec<&str> = catalog.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["id", "name", "price"]);
        assert!(catalog.columns().iter().all(|c| c.is_bound()));
        assert_eq!(catalog.columns()[0].output_type(), OutputType::Int32);
        assert_eq!(catalog.columns()[2].output_type(), OutputType::Float64);
    }

    #[test]
    fn test_bind_all_keeps_existing_targets() {
        let mut catalog = Catalog::new();
        catalog.select_all_columns();
        let table = table_t();

        let buffer = OutputBuffer::new();
        catalog
            .bind(
                "price",
                BindTarget::new(buffer.clone(), 8),
                OutputType::Text,
                Some(&table),
            )
            .unwrap();
        catalog.bind_all(&table, 256);

        let price = catalog.column("price").unwrap();
        assert_eq!(price.output_type(), OutputType::Text);
        assert_eq!(catalog.columns()[2].name(), "price");
        assert_eq!(price.value(), Some(OutputValue::Null));
    }

    #[test]
    fn test_resolve_columns_rejects_missing() {
        let mut catalog = Catalog::new();
        catalog.add_column("id").unwrap();
        catalog.add_column("email").unwrap();

        let err = catalog.resolve_columns(&table_t()).unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::UnknownColumn);
        assert_eq!(err.name(), Some("email"));
    }
}
