//! Log sinks.
//!
//! # Responsibilities
//! - Serialize a leveled message plus fields
//! - Write it to its destination
//!
//! # Design Decisions
//! - Emission is best effort: write failures are swallowed
//! - JSON layout follows the logrus formatter (`level`, `msg`, `time`),
//!   clashing user keys are moved to `fields.<key>`

use std::io::{self, Write};
use std::sync::Mutex;

use serde_json::Value;

use crate::error::Fields;
use crate::logger::Level;

/// Destination for log emissions. Implementations must be thread-safe.
pub trait Sink: Send + Sync {
    fn emit(&self, level: Level, message: &str, fields: &Fields);

    /// Push buffered output to its destination.
    fn flush(&self) {}
}

const RESERVED_KEYS: [&str; 3] = ["level", "msg", "time"];

/// Writes one JSON object per line.
pub struct JsonSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonSink<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl JsonSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Build the JSON object for one emission.
    pub fn format(level: Level, message: &str, fields: &Fields) -> Fields {
        let mut line = Fields::new();

        for (key, value) in fields {
            if RESERVED_KEYS.contains(&key.as_str()) {
                line.insert(format!("fields.{key}"), value.clone());
            } else {
                line.insert(key.clone(), value.clone());
            }
        }

        line.insert("level".to_string(), Value::String(level.as_str().to_string()));
        line.insert("msg".to_string(), Value::String(message.to_string()));
        line.insert("time".to_string(), Value::String(chrono::Utc::now().to_rfc3339()));
        line
    }
}

impl<W: Write + Send> Sink for JsonSink<W> {
    fn emit(&self, level: Level, message: &str, fields: &Fields) {
        let line = Self::format(level, message, fields);
        let Ok(mut encoded) = serde_json::to_vec(&line) else {
            return;
        };
        encoded.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writer.write_all(&encoded);
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writer.flush();
    }
}

/// Forwards emissions to the active `tracing` subscriber.
///
/// The fields travel as a single JSON-rendered `fields` value since tracing
/// field names are static.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn emit(&self, level: Level, message: &str, fields: &Fields) {
        let fields = Value::Object(fields.clone());
        match level {
            Level::Info => tracing::info!(target: "fieldlog", fields = %fields, "{}", message),
            Level::Warn => tracing::warn!(target: "fieldlog", fields = %fields, "{}", message),
            Level::Error => tracing::error!(target: "fieldlog", fields = %fields, "{}", message),
        }
    }
}
