//! Row fetch executor
//!
//! Drives one execution over a resolved table, pulling raw rows, applying
//! the predicate, and copying matched values into bound buffers.
//!
//! # States
//!
//! `Idle → Scanning → (RowReady | Exhausted) → Scanning …` until the table
//! is exhausted or the row limit is reached, then `Done`.
//!
//! # Invariants
//!
//! - One matched row per fetch call
//! - A failed fetch leaves the row counter and all buffers untouched
//! - The row counter starts at zero for every execution

mod executor;
mod result;
mod temp;

pub use executor::{Scan, ScanState};
pub use result::{FetchOutcome, RowSnapshot};
pub use temp::add_temp_column;
