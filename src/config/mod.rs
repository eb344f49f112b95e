//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (APP_ENV / SENTRY_DSN overrides)
//!     → validation.rs (semantic checks)
//!     → LoggerConfig (validated)
//!     → Logger::init
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Environment overrides win over the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::LoggerConfig;
pub use schema::ReporterConfig;
pub use schema::SinkConfig;
