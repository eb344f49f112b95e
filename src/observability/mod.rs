//! Observability of the logger itself.
//!
//! # Data Flow
//! ```text
//! reporter / logger init
//!     → tracing macros (structured diagnostics)
//!     → logging.rs subscriber (stderr, text or JSON)
//! ```

pub mod logging;
