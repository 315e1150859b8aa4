//! Observability for query sessions
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed session events
//! - Begin/complete scopes with elapsed time
//!
//! Observability is read-only: nothing logged here changes the outcome of
//! the operation being observed.
//!
//! ```ignore
//! use mdbsql::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Info);
//! log_event_with_fields(Event::TableResolved, &[("table", "Orders")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a session event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a session event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::SessionInit);
        log_event(Event::SessionClose);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("path", "/tmp/test.json")]);
    }
}
