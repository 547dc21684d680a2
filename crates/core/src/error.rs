//! Core error types

use thiserror::Error;

/// Core error type for NavGlass
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Layout file could not be decoded
    #[error("Layout error: {0}")]
    Layout(#[from] serde_json::Error),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
