//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::error::Fields;
use crate::logger::Level;

/// Environment name that disables remote reporting.
pub const DEVELOPMENT: &str = "development";

/// Root configuration for the logger.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Deployment environment (e.g., "production", "development").
    pub environment: String,

    /// Where and how log lines are written.
    pub sink: SinkConfig,

    /// Remote error reporting.
    pub reporter: ReporterConfig,

    /// Fields attached to every emission.
    pub global_fields: Fields,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            sink: SinkConfig::default(),
            reporter: ReporterConfig::default(),
            global_fields: Fields::new(),
        }
    }
}

impl LoggerConfig {
    /// Apply `APP_ENV` and `SENTRY_DSN` from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_env_overrides(|key| std::env::var(key).ok());
        self
    }

    /// Apply environment overrides resolved through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(environment) = lookup("APP_ENV").filter(|v| !v.is_empty()) {
            self.environment = environment;
        }
        if let Some(dsn) = lookup("SENTRY_DSN") {
            self.reporter.dsn = dsn;
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case(DEVELOPMENT)
    }
}

/// Output format of the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Forward to the installed `tracing` subscriber.
    Tracing,
}

/// Destination stream for the JSON sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkOutput {
    #[default]
    Stderr,
    Stdout,
}

/// Sink configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    pub format: SinkFormat,
    pub output: SinkOutput,
}

/// Remote reporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Destination identifier; empty disables reporting.
    pub dsn: String,

    /// Levels forwarded to the reporter.
    pub levels: Vec<Level>,

    /// Maximum events queued or in flight before new ones are dropped.
    pub queue_capacity: usize,

    /// Upper bound on how long `flush` blocks, in milliseconds.
    pub flush_timeout_ms: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Retries after the first failed delivery.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            levels: vec![Level::Warn, Level::Error],
            queue_capacity: 1024,
            flush_timeout_ms: 5000,
            request_timeout_secs: 10,
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}
