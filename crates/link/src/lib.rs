//! Telemetry link for NavGlass displays.
//!
//! Owns the WebSocket to the telemetry server:
//! - builds the feed endpoint from the display page address
//! - tracks the connection state machine
//!   (Disconnected → Connecting → Connected → Closed/Errored → Disconnected)
//! - reconnects with exponential backoff while disconnected
//! - hands every text frame to the [`MessageDispatcher`]
//!
//! [`MessageDispatcher`]: navglass_binding::MessageDispatcher

#![warn(missing_docs)]

pub mod backoff;
pub mod endpoint;
pub mod error;
pub mod manager;
pub mod state;

pub use backoff::ReconnectBackoff;
pub use endpoint::{EndpointError, TelemetryEndpoint, FEED_PATH};
pub use error::{LinkError, Result};
pub use manager::ConnectionManager;
pub use state::{ConnectionContext, LinkAction, LinkState};
