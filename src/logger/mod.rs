//! Logging facade.
//!
//! # Data Flow
//! ```text
//! info / warn / warn_error / error / fatal
//!     → merge: global fields → call fields → flattened error fields
//!     → sink.rs (JSON line or tracing event)
//!     → reporter (warning and above, when configured)
//!
//! fatal
//!     → error-level emission → flush → exit handler (status 1)
//! ```
//!
//! # Design Decisions
//! - No ambient global: `Logger::init` returns a handle the application passes around
//! - Later merges win, so error fields override call fields, which override globals
//! - Info is never forwarded to the reporter

pub mod facade;
pub mod level;
pub mod sink;

pub use facade::{ExitHandler, InitError, Logger, LoggerBuilder, FATAL_EXIT_CODE};
pub use level::Level;
pub use sink::{JsonSink, Sink, TracingSink};
