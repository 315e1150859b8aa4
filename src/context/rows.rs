//! Iterator adapter over `fetch_row`

use crate::errors::SqlResult;
use crate::executor::RowSnapshot;

use super::context::QueryContext;

/// Yields a snapshot of the bound columns for each matched row.
///
/// Ends at exhaustion or the row limit. A fetch error is yielded once and
/// ends the iteration.
pub struct Rows<'a> {
    ctx: &'a mut QueryContext,
    done: bool,
}

impl<'a> Rows<'a> {
    pub(crate) fn new(ctx: &'a mut QueryContext) -> Self {
        Self { ctx, done: false }
    }
}

impl Iterator for Rows<'_> {
    type Item = SqlResult<RowSnapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.ctx.fetch_row() {
            Ok(outcome) if outcome.is_row() => Some(Ok(self.ctx.snapshot())),
            Ok(_) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
