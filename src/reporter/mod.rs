//! Remote error reporting.
//!
//! # Data Flow
//! ```text
//! Logger (warning / error emissions)
//!     → Reporter::report(Event)         non-blocking, queued
//!     → http.rs worker thread           concurrent delivery
//!         → backoff.rs                  retry transient failures
//!         → store endpoint from dsn.rs
//!
//! Logger::flush / Logger::fatal
//!     → Reporter::flush                 blocks until queue drained or timeout
//! ```
//!
//! # Design Decisions
//! - Reporting never blocks the caller except in `flush`
//! - Delivery is best effort: events are dropped after retries are exhausted
//!   or when the queue is over capacity
//! - The logger only talks to the `Reporter` trait; `HttpReporter` is the
//!   default implementation

pub mod backoff;
pub mod dsn;
pub mod http;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Fields;
use crate::logger::Level;

pub use dsn::{Dsn, DsnError};
pub use http::HttpReporter;

/// An emission forwarded to the reporting service.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub fields: Fields,
    /// String-coerced process-wide fields.
    pub tags: Vec<(String, String)>,
}

impl Event {
    pub fn new(level: Level, message: impl Into<String>, fields: Fields, tags: Vec<(String, String)>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields,
            tags,
        }
    }
}

/// Asynchronous delivery of events to an error-tracking service.
pub trait Reporter: Send + Sync {
    /// Whether events at `level` should be handed over.
    fn accepts(&self, level: Level) -> bool;

    /// Queue an event for delivery. Must not block.
    fn report(&self, event: Event);

    /// Block until queued events are delivered or the reporter gives up.
    fn flush(&self);
}
