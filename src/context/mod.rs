//! Query session
//!
//! [`QueryContext`] is the single entry point: it owns the data source, the
//! catalog, the predicate builder, and the active scan. One query is open at
//! a time; `reset` starts the next one.

mod context;
mod options;
mod rows;

pub use context::{QueryContext, TABLE_LIST_NAME};
pub use options::{SessionOptions, DEFAULT_ERROR_CAPACITY, DEFAULT_TEXT_CAPACITY};
pub use rows::Rows;
