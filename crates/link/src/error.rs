//! Link error types

use thiserror::Error;

use crate::endpoint::EndpointError;

/// Errors that stop the telemetry link
#[derive(Debug, Error)]
pub enum LinkError {
    /// The feed endpoint could not be built
    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    /// Reconnection gave up
    #[error("Gave up after {attempts} consecutive connection failures")]
    RetriesExhausted {
        /// Consecutive failed attempts
        attempts: u32,
    },
}

/// Result type for link operations
pub type Result<T> = std::result::Result<T, LinkError>;
