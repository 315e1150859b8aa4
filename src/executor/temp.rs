//! Temporary (synthetic) columns
//!
//! Introspection results and derived display columns are not part of any
//! physical schema. They are registered straight onto a table definition
//! instead of going through the catalog.

use crate::errors::{SqlError, SqlResult};
use crate::source::{ColumnDef, ColumnType, TableDef};

/// Inserts a synthetic column at position `col_num` (0-based).
///
/// `col_num` may equal the column count to append. A `size` of zero takes
/// the type's default size.
pub fn add_temp_column(
    table: &mut TableDef,
    col_num: usize,
    name: &str,
    col_type: ColumnType,
    size: usize,
    is_fixed: bool,
) -> SqlResult<()> {
    if name.is_empty() {
        return Err(SqlError::invalid_name("Column"));
    }
    if col_num > table.num_columns() {
        return Err(SqlError::invalid_column_number(col_num, table.num_columns()));
    }
    if table.column(name).is_some() {
        return Err(SqlError::duplicate_column(name));
    }

    let size = if size == 0 { col_type.default_size() } else { size };
    table.columns.insert(
        col_num,
        ColumnDef {
            name: name.to_string(),
            col_type,
            size,
            is_fixed,
        },
    );
    Ok(())
}
