//! mdbsql - predicate evaluation and row projection over tabular data
//!
//! A [`context::QueryContext`] accumulates one restricted SQL query at a
//! time (tables, columns, a search-argument predicate, a limit) and
//! executes it against a [`source::DataSource`], copying the matching
//! values of each row into caller-bound output buffers.

pub mod binding;
pub mod catalog;
pub mod cli;
pub mod context;
pub mod errors;
pub mod executor;
pub mod observability;
pub mod sarg;
pub mod source;
