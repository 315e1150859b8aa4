//! Observable events of a query session
//!
//! Events are explicit and typed. Each maps to a stable upper-case name
//! and a default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in a query session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Session lifecycle
    /// Session allocated
    SessionInit,
    /// Query state cleared, data source kept
    SessionReset,
    /// Data source released
    SessionClose,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Data source
    /// Data source opened or attached
    SourceOpened,
    /// Data source failed to open
    SourceOpenFailed,

    // Build phase
    /// Predicate tree installed
    PredicateFinalized,
    /// A build call was rejected
    BuildRejected,

    // Execution
    /// Selected table resolved and a scan created
    TableResolved,
    /// One matched row written to the bindings
    RowFetched,
    /// Table reader ran out of rows
    ScanExhausted,
    /// Row limit reached
    ScanLimitReached,
    /// Fetch failed
    FetchFailed,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SessionInit => "SESSION_INIT",
            Event::SessionReset => "SESSION_RESET",
            Event::SessionClose => "SESSION_CLOSE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SourceOpened => "SOURCE_OPENED",
            Event::SourceOpenFailed => "SOURCE_OPEN_FAILED",
            Event::PredicateFinalized => "PREDICATE_FINALIZED",
            Event::BuildRejected => "BUILD_REJECTED",
            Event::TableResolved => "TABLE_RESOLVED",
            Event::RowFetched => "ROW_FETCHED",
            Event::ScanExhausted => "SCAN_EXHAUSTED",
            Event::ScanLimitReached => "SCAN_LIMIT_REACHED",
            Event::FetchFailed => "FETCH_FAILED",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::RowFetched => Severity::Trace,
            Event::BuildRejected => Severity::Warn,
            Event::SourceOpenFailed | Event::FetchFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake() {
        for event in [
            Event::SessionInit,
            Event::TableResolved,
            Event::ScanLimitReached,
            Event::FetchFailed,
        ] {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::RowFetched.severity(), Severity::Trace);
        assert_eq!(Event::SessionInit.severity(), Severity::Info);
        assert_eq!(Event::FetchFailed.severity(), Severity::Error);
        assert_eq!(Event::BuildRejected.severity(), Severity::Warn);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::ConfigLoaded), "CONFIG_LOADED");
    }
}
