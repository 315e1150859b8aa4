//! Query catalog
//!
//! Tracks which tables and which columns (or all columns) take part in the
//! active query. Insertion order is output order.

mod catalog;

pub use catalog::{Catalog, SqlTable};
