//! Data source boundary
//!
//! The table format and its decoder live outside this crate. Everything the
//! session needs from them goes through the traits defined here:
//!
//! - open a data source by name ([`SourceOpener`])
//! - list physical tables and their columns ([`DataSource`])
//! - read the next raw row of a table ([`TableReader`])
//! - read a named column's value and declared type from a row ([`RowAccess`])
//!
//! [`MemorySource`] is an in-memory implementation, loadable from JSON.

mod errors;
mod memory;
mod traits;
mod types;
mod value;

pub use errors::{SourceError, SourceResult};
pub use memory::{JsonFileOpener, MemorySource, MemoryTable};
pub use traits::{DataSource, RawRow, RowAccess, RowView, SourceOpener, TableReader};
pub use types::{ColumnDef, ColumnType, TableDef};
pub use value::{parse_datetime, Value};
