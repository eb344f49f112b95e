//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities and timeouts > 0)
//! - Reject reporter levels below warning
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoggerConfig → Result<(), Vec<ValidationError>>
//! - The DSN itself is parsed at init, where a failure is fatal

use std::fmt;

use crate::config::schema::LoggerConfig;
use crate::logger::Level;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &LoggerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let reporter = &config.reporter;

    if reporter.levels.is_empty() {
        errors.push(ValidationError {
            field: "reporter.levels",
            reason: "at least one level is required".to_string(),
        });
    }
    if let Some(level) = reporter.levels.iter().find(|l| **l < Level::Warn) {
        errors.push(ValidationError {
            field: "reporter.levels",
            reason: format!("level '{level}' is below warning and is never reported"),
        });
    }
    if reporter.queue_capacity == 0 {
        errors.push(ValidationError {
            field: "reporter.queue_capacity",
            reason: "must be greater than 0".to_string(),
        });
    }
    if reporter.flush_timeout_ms == 0 {
        errors.push(ValidationError {
            field: "reporter.flush_timeout_ms",
            reason: "must be greater than 0".to_string(),
        });
    }
    if reporter.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "reporter.request_timeout_secs",
            reason: "must be greater than 0".to_string(),
        });
    }
    if reporter.base_delay_ms > reporter.max_delay_ms {
        errors.push(ValidationError {
            field: "reporter.base_delay_ms",
            reason: format!(
                "base delay {}ms exceeds max delay {}ms",
                reporter.base_delay_ms, reporter.max_delay_ms
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
