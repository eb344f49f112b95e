//! The `Logger` value and its leveled entry points.

use std::error::Error;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::schema::{LoggerConfig, SinkFormat, SinkOutput};
use crate::error::{to_fields, Fields};
use crate::logger::sink::{JsonSink, Sink, TracingSink};
use crate::logger::Level;
use crate::reporter::http::ReporterError;
use crate::reporter::{Dsn, DsnError, Event, HttpReporter, Reporter};

/// Exit status used by [`Logger::fatal`].
pub const FATAL_EXIT_CODE: i32 = 1;

/// Called by [`Logger::fatal`] to terminate the process.
pub type ExitHandler = Arc<dyn Fn(i32) + Send + Sync>;

/// Errors raised while building a logger from configuration.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid reporter DSN: {0}")]
    Dsn(#[from] DsnError),

    #[error("failed to start reporter: {0}")]
    Reporter(#[from] ReporterError),
}

/// Structured logger handle.
///
/// Cheap to clone; clones share the sink and reporter. Global fields are
/// configured before the logger is shared (`set_global_fields` takes
/// `&mut self`).
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Sink>,
    reporter: Option<Arc<dyn Reporter>>,
    global_fields: Fields,
    tags: Vec<(String, String)>,
    exit: ExitHandler,
}

impl Logger {
    /// Build a logger from configuration.
    ///
    /// The reporter is skipped in the development environment and when no
    /// DSN is configured. A malformed DSN is an error.
    pub fn init(config: &LoggerConfig) -> Result<Self, InitError> {
        let sink: Arc<dyn Sink> = match (config.sink.format, config.sink.output) {
            (SinkFormat::Tracing, _) => Arc::new(TracingSink),
            (SinkFormat::Json, SinkOutput::Stderr) => Arc::new(JsonSink::stderr()),
            (SinkFormat::Json, SinkOutput::Stdout) => Arc::new(JsonSink::stdout()),
        };

        let mut builder = Logger::builder().sink(sink);

        if config.is_development() {
            tracing::debug!(environment = %config.environment, "Error reporting disabled");
        } else if config.reporter.dsn.trim().is_empty() {
            tracing::debug!("No reporter DSN configured, error reporting disabled");
        } else {
            let dsn = Dsn::parse(&config.reporter.dsn)?;
            let reporter = HttpReporter::new(dsn, &config.reporter)?;
            builder = builder.reporter(Arc::new(reporter));
        }

        let mut logger = builder.build();
        if !config.global_fields.is_empty() {
            logger.set_global_fields(config.global_fields.clone());
        }
        Ok(logger)
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Replace the fields attached to every emission.
    ///
    /// Also derives the reporter tags: string values as-is, anything else as
    /// its JSON text.
    pub fn set_global_fields(&mut self, data: Fields) {
        self.tags = data
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();
        self.global_fields = data;
    }

    pub fn global_fields(&self) -> &Fields {
        &self.global_fields
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn has_reporter(&self) -> bool {
        self.reporter.is_some()
    }

    /// Log at info level. Never reported.
    pub fn info(&self, message: &str, fields: Fields) {
        self.emit(Level::Info, message, fields);
    }

    /// Log a message at warning level.
    pub fn warn(&self, message: &str, fields: Fields) {
        self.emit(Level::Warn, message, fields);
    }

    /// Log an error at warning level.
    pub fn warn_error(&self, err: &(dyn Error + 'static)) {
        self.emit(Level::Warn, &err.to_string(), to_fields(err));
    }

    /// Log an error at error level, flattening it into fields.
    pub fn error(&self, err: &(dyn Error + 'static)) {
        self.emit(Level::Error, &err.to_string(), to_fields(err));
    }

    /// Log like [`Logger::error`], flush, then exit with status 1.
    pub fn fatal(&self, err: &(dyn Error + 'static)) -> ! {
        self.error(err);
        self.flush();
        (self.exit)(FATAL_EXIT_CODE);
        std::process::exit(FATAL_EXIT_CODE)
    }

    /// Block until the sink and the reporter have pushed out pending output.
    pub fn flush(&self) {
        self.sink.flush();
        if let Some(reporter) = &self.reporter {
            reporter.flush();
        }
    }

    // Merge order: global, then per-call/error fields. Later keys win.
    fn emit(&self, level: Level, message: &str, fields: Fields) {
        let mut merged = self.global_fields.clone();
        merged.extend(fields);

        self.sink.emit(level, message, &merged);

        if level < Level::Warn {
            return;
        }
        if let Some(reporter) = self.reporter.as_ref().filter(|r| r.accepts(level)) {
            reporter.report(Event::new(level, message, merged, self.tags.clone()));
        }
    }
}

/// Builder for loggers with custom collaborators.
#[derive(Default)]
pub struct LoggerBuilder {
    sink: Option<Arc<dyn Sink>>,
    reporter: Option<Arc<dyn Reporter>>,
    global_fields: Fields,
    exit: Option<ExitHandler>,
}

impl LoggerBuilder {
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn global_fields(mut self, fields: Fields) -> Self {
        self.global_fields = fields;
        self
    }

    /// Replace process termination, e.g. in tests.
    pub fn exit_handler(mut self, exit: ExitHandler) -> Self {
        self.exit = Some(exit);
        self
    }

    /// Defaults: JSON lines on stderr, no reporter, `std::process::exit`.
    pub fn build(self) -> Logger {
        let sink: Arc<dyn Sink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(JsonSink::stderr()),
        };
        let exit: ExitHandler = match self.exit {
            Some(exit) => exit,
            None => Arc::new(exit_process),
        };

        let mut logger = Logger {
            sink,
            reporter: self.reporter,
            global_fields: Fields::new(),
            tags: Vec::new(),
            exit,
        };
        logger.set_global_fields(self.global_fields);
        logger
    }
}

fn exit_process(code: i32) {
    std::process::exit(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    #[test]
    fn test_tags_are_string_coerced() {
        let mut logger = Logger::builder().build();
        logger.set_global_fields(fields! { "service" => "billing", "shard" => 4, "canary" => true });

        let mut tags = logger.tags().to_vec();
        tags.sort();
        assert_eq!(
            tags,
            vec![
                ("canary".to_string(), "true".to_string()),
                ("service".to_string(), "billing".to_string()),
                ("shard".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn test_init_without_dsn_has_no_reporter() {
        let logger = Logger::init(&LoggerConfig::default()).unwrap();
        assert!(!logger.has_reporter());
    }

    #[test]
    fn test_init_development_skips_reporter() {
        let mut config = LoggerConfig::default();
        config.environment = "development".to_string();
        config.reporter.dsn = "not even a url".to_string();

        let logger = Logger::init(&config).unwrap();
        assert!(!logger.has_reporter());
    }

    #[test]
    fn test_init_rejects_bad_dsn() {
        let mut config = LoggerConfig::default();
        config.reporter.dsn = "https://errors.example.com/1".to_string();

        assert!(matches!(Logger::init(&config), Err(InitError::Dsn(DsnError::MissingPublicKey))));
    }

    #[test]
    fn test_init_applies_global_fields() {
        let mut config = LoggerConfig::default();
        config.global_fields = fields! { "region" => "eu-west-1" };

        let logger = Logger::init(&config).unwrap();
        assert_eq!(logger.global_fields()["region"], "eu-west-1");
        assert_eq!(logger.tags(), &[("region".to_string(), "eu-west-1".to_string())]);
    }

    #[test]
    fn test_init_with_dsn_starts_reporter() {
        let mut config = LoggerConfig::default();
        config.reporter.dsn = "http://key@127.0.0.1:9/1".to_string();

        let logger = Logger::init(&config).unwrap();
        assert!(logger.has_reporter());
    }
}
