//! Structured logging facade with call-site aware error wrapping.

pub mod config;
pub mod error;
pub mod logger;
pub mod observability;
pub mod reporter;

pub use config::schema::LoggerConfig;
pub use error::{
    error_fields, to_fields, wrap, wrap_with_context, wrap_with_context_and_stack, BoxError, Fielded, Fielder,
    Fields, Frame, ResultExt, WrappedError,
};
pub use logger::{Level, Logger};
