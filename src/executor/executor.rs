//! Row fetch loop
//!
//! One call to [`Scan::fetch`] produces at most one matched row:
//! 1. Stop if the scan is finished or the row limit is reached
//! 2. Read the next raw row from the table reader
//! 3. Evaluate the predicate against it; skip the row if it fails
//! 4. Convert every bound column, failing the whole row on any error
//! 5. Write the converted values, count the row, return `Row`

use crate::binding::{BindTarget, ColumnBinding, Converted};
use crate::errors::{SqlError, SqlResult};
use crate::sarg::SargNode;
use crate::source::{RowAccess, RowView, TableDef, TableReader};

use super::result::FetchOutcome;

/// Position of a scan in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Table resolved, nothing read yet
    Idle,
    /// Reading rows
    Scanning,
    /// A matched row has been written to the bindings
    RowReady,
    /// The table reader ran out of rows
    Exhausted,
    /// Terminal for this execution; left only by resetting the session
    Done,
}

/// An execution over one resolved table
pub struct Scan {
    reader: Box<dyn TableReader>,
    state: ScanState,
    row_count: u64,
    scanned: u64,
    /// Introspection scans ignore the query predicate
    filtered: bool,
}

impl Scan {
    /// Creates a scan that applies the query predicate
    pub fn new(reader: Box<dyn TableReader>) -> Self {
        Self {
            reader,
            state: ScanState::Idle,
            row_count: 0,
            scanned: 0,
            filtered: true,
        }
    }

    /// Creates a scan returning every row of the table
    pub fn unfiltered(reader: Box<dyn TableReader>) -> Self {
        Self {
            filtered: false,
            ..Self::new(reader)
        }
    }

    pub fn definition(&self) -> &TableDef {
        self.reader.definition()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Rows matched so far in this execution
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Raw rows read so far, matched or not
    pub fn scanned_count(&self) -> u64 {
        self.scanned
    }

    /// Whether the query predicate and row limit apply to this scan
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ScanState::Exhausted | ScanState::Done)
    }

    /// Fetches the next matching row into `bindings`.
    ///
    /// On error the row counter is unchanged and no binding is written.
    pub fn fetch(
        &mut self,
        predicate: Option<&SargNode>,
        bindings: &[ColumnBinding],
        limit: Option<u64>,
    ) -> SqlResult<FetchOutcome> {
        match self.state {
            ScanState::Done => return Ok(FetchOutcome::Exhausted),
            ScanState::Exhausted => {
                self.state = ScanState::Done;
                return Ok(FetchOutcome::Exhausted);
            }
            _ => {}
        }

        if limit.map_or(false, |limit| self.row_count >= limit) {
            self.state = ScanState::Done;
            return Ok(FetchOutcome::LimitReached);
        }

        self.state = ScanState::Scanning;
        loop {
            let row = match self.reader.next_row()? {
                Some(row) => row,
                None => {
                    self.state = ScanState::Exhausted;
                    return Ok(FetchOutcome::Exhausted);
                }
            };
            self.scanned += 1;

            let view = RowView::new(self.reader.definition(), &row);
            let matched = match predicate {
                Some(predicate) if self.filtered => predicate.evaluate(&view)?,
                _ => true,
            };
            if !matched {
                continue;
            }

            for (target, converted) in prepare_row(&view, bindings)? {
                target.write(converted);
            }
            self.row_count += 1;
            self.state = ScanState::RowReady;
            return Ok(FetchOutcome::Row);
        }
    }
}

/// Converts every bound column of a row before any buffer is touched.
fn prepare_row<'b, R: RowAccess>(
    row: &R,
    bindings: &'b [ColumnBinding],
) -> SqlResult<Vec<(&'b BindTarget, Converted)>> {
    let mut out = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let target = match binding.target() {
            Some(target) => target,
            None => continue,
        };
        let (column, value) = row
            .column(binding.name())
            .ok_or_else(|| SqlError::unknown_column(binding.name()))?;
        if let Some(converted) = binding.prepare(column, value)? {
            out.push((target, converted));
        }
    }
    Ok(out)
}
