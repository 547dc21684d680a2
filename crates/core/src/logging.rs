//! Structured logging infrastructure for NavGlass.
//!
//! This module provides centralized logging initialization with support
//! for structured JSON output and environment-based configuration.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_DIRECTIVE: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Initialize the logging system with structured output.
///
/// Log level can be configured via the `RUST_LOG` environment variable.
/// If not set, defaults to `info` level.
///
/// # Example
/// ```no_run
/// use navglass_core::logging;
///
/// logging::init();
/// tracing::info!("Display started");
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
        .init();
}

/// Initialize the logging system with JSON output.
///
/// Suitable for log aggregation when the display runs headless on a logger box.
pub fn init_json() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true))
        .init();
}

/// Initialize logging from the `[logging]` section of the display config.
pub fn init_from(config: &LoggingConfig) {
    if config.json {
        init_json();
    } else {
        init();
    }
}
