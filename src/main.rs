//! fieldlog demo binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     caller code
//!         │  wrap / wrap_with_context (frame captured)
//!         ▼
//!   ┌──────────────┐   to_fields   ┌──────────────┐
//!   │ WrappedError │──────────────▶│   Logger     │── JSON line ──▶ stderr
//!   └──────────────┘               │   facade     │
//!                                  └──────┬───────┘
//!                                         │ warning / error
//!                                         ▼
//!                                  ┌──────────────┐
//!                                  │ HttpReporter │── POST ──▶ error tracker
//!                                  └──────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fieldlog::config::{load_config, load_from_env};
use fieldlog::observability::logging::init_tracing;
use fieldlog::{fields, wrap, wrap_with_context, Logger};

#[derive(Parser)]
#[command(name = "fieldlog")]
#[command(about = "Structured logging facade demo", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults plus APP_ENV / SENTRY_DSN otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit the logger's own diagnostics as JSON
    #[arg(long)]
    json_diagnostics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log an info line, a plain error and a wrapped error
    Demo,
    /// Log a wrapped error through `fatal` and exit with status 1
    Fatal {
        #[arg(short, long, default_value = "unrecoverable failure")]
        message: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.json_diagnostics) {
        eprintln!("Failed to initialize diagnostics: {}", e);
    }

    let config = match &cli.config {
        Some(path) => load_config(path),
        None => load_from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let logger = match Logger::init(&config) {
        Ok(logger) => logger,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize logger");
            std::process::exit(1);
        }
    };

    tracing::debug!(
        environment = %config.environment,
        reporter = logger.has_reporter(),
        "Logger initialized"
    );

    match cli.command {
        Commands::Demo => run_demo(&logger),
        Commands::Fatal { message } => {
            let cause = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "upstream closed");
            let err = wrap(Some(cause.into()), message);
            logger.fatal(&err);
        }
    }

    logger.flush();
}

fn run_demo(logger: &Logger) {
    logger.info("Here is an info log", fields! { "count" => 1, "context" => "Foo Info" });

    let err = std::io::Error::new(std::io::ErrorKind::Other, "This is an error");
    logger.error(&err);

    let db = wrap(Some(err.into()), "db failure");
    let request = wrap_with_context(Some(db.into()), "context error", fields! { "code" => 500 });
    logger.error(&request);
}
