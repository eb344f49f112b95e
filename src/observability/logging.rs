//! Diagnostics subscriber for binaries embedding fieldlog.
//!
//! # Responsibilities
//! - Install a `tracing` subscriber for the crate's own diagnostics
//!   (reporter retries, dropped events, init decisions)
//! - Receive `TracingSink` emissions when that sink is selected
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the default filter
//! - Always writes to stderr so it never interleaves with stdout JSON sinks

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "fieldlog=info";

/// Install the global `tracing` subscriber.
///
/// Returns an error if a subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    }
}
