//! Session options and the bounded error slot

use crate::binding::truncate_utf8;
use crate::errors::SqlError;

/// Default capacity of the last-error text, in bytes
pub const DEFAULT_ERROR_CAPACITY: usize = 1024;

/// Default buffer capacity for bindings synthesized by `bind_all`
pub const DEFAULT_TEXT_CAPACITY: usize = 256;

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum bytes kept of the last error message
    pub error_capacity: usize,
    /// Rows returned per execution, 0 for unbounded
    pub max_rows: u64,
    /// Minimum capacity of synthesized text buffers
    pub text_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            error_capacity: DEFAULT_ERROR_CAPACITY,
            max_rows: 0,
            text_capacity: DEFAULT_TEXT_CAPACITY,
        }
    }
}

/// Holds the most recent failure of a session.
///
/// The rendered text never exceeds the capacity and is cut on a UTF-8
/// boundary.
#[derive(Debug, Clone)]
pub(crate) struct ErrorSlot {
    capacity: usize,
    error: Option<SqlError>,
    text: String,
}

impl ErrorSlot {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            error: None,
            text: String::new(),
        }
    }

    pub(crate) fn set(&mut self, error: &SqlError) {
        let rendered = error.to_string();
        self.text = truncate_utf8(&rendered, self.capacity).to_string();
        self.error = Some(error.clone());
    }

    pub(crate) fn clear(&mut self) {
        self.error = None;
        self.text.clear();
    }

    pub(crate) fn error(&self) -> Option<&SqlError> {
        self.error.as_ref()
    }

    pub(crate) fn text(&self) -> Option<&str> {
        self.error.as_ref().map(|_| self.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_truncates_on_char_boundary() {
        let mut slot = ErrorSlot::new(40);
        slot.set(&SqlError::duplicate_table("ééééééééééééééé"));
        let text = slot.text().unwrap();
        assert!(text.len() <= 40);
        assert!(text.starts_with("[BUILD] MDB_SQL_DUPLICATE_TABLE"));
    }

    #[test]
    fn test_slot_clear() {
        let mut slot = ErrorSlot::new(DEFAULT_ERROR_CAPACITY);
        slot.set(&SqlError::no_data_source());
        assert!(slot.error().is_some());
        slot.clear();
        assert!(slot.error().is_none());
        assert!(slot.text().is_none());
    }

    #[test]
    fn test_zero_capacity_keeps_code() {
        let mut slot = ErrorSlot::new(0);
        slot.set(&SqlError::no_data_source());
        assert_eq!(slot.text(), Some(""));
        assert!(slot.error().is_some());
    }
}
