//! Fetch results

use crate::binding::OutputValue;

/// Outcome of one fetch call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A matched row was written to the bound buffers
    Row,
    /// The table has no more rows
    Exhausted,
    /// The row limit for this execution was reached
    LimitReached,
}

impl FetchOutcome {
    /// Returns true if a row was produced
    pub fn is_row(&self) -> bool {
        matches!(self, FetchOutcome::Row)
    }
}

/// A matched row as a list of (column, value) pairs in output order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowSnapshot {
    pub values: Vec<(String, OutputValue)>,
}

impl RowSnapshot {
    /// Returns the value of a column, matching names case-insensitively
    pub fn get(&self, column: &str) -> Option<&OutputValue> {
        self.values
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names in output order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }
}
