//! Core functionality for NavGlass.
//!
//! This crate provides the shared error type, logging initialisation and the
//! display configuration used across the NavGlass workspace.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    ConfigError, DisplayConfig, EndpointConfig, LoggingConfig, RetryConfig, NO_MARKER_FILTER,
};
pub use error::{CoreError, Result};
