//! Connection state machine.
//!
//! The context is the single writer of the link state. Embedding code
//! observes it through [`ConnectionContext::subscribe`].

use std::fmt;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Where the link is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No socket, nothing attempted yet
    Disconnected,
    /// Socket opening
    Connecting,
    /// Socket open, frames flowing
    Connected,
    /// Socket closed, by either side
    Closed,
    /// Socket failed
    Errored,
}

impl LinkState {
    /// Whether the display is showing stale data
    pub fn is_disconnected(self) -> bool {
        self != LinkState::Connected
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Closed => "closed",
            LinkState::Errored => "errored",
        };
        f.write_str(label)
    }
}

/// What the socket driver must do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Keep the socket as it is
    Continue,
    /// Close the socket
    Close,
}

/// Owner of the link state.
#[derive(Debug)]
pub struct ConnectionContext {
    state: watch::Sender<LinkState>,
}

impl ConnectionContext {
    /// Start out disconnected
    pub fn new() -> Self {
        let (state, _) = watch::channel(LinkState::Disconnected);
        Self { state }
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.state.subscribe()
    }

    /// Current state
    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    /// Disconnected flag
    pub fn is_disconnected(&self) -> bool {
        self.state().is_disconnected()
    }

    /// A connection attempt started
    pub fn on_connecting(&mut self) {
        self.transition(LinkState::Connecting);
    }

    /// Socket opened
    pub fn on_open(&mut self) {
        self.transition(LinkState::Connected);
    }

    /// Socket closed
    pub fn on_close(&mut self) {
        self.transition(LinkState::Closed);
    }

    /// Socket failed. The socket must be closed.
    pub fn on_error(&mut self, reason: &str) -> LinkAction {
        warn!(reason, "Telemetry link error");
        self.transition(LinkState::Errored);
        LinkAction::Close
    }

    fn transition(&mut self, next: LinkState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "Link state changed");
        }
    }
}

impl Default for ConnectionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disconnected() {
        let context = ConnectionContext::new();
        assert_eq!(context.state(), LinkState::Disconnected);
        assert!(context.is_disconnected());
    }

    #[test]
    fn test_open_clears_and_error_sets_disconnected() {
        let mut context = ConnectionContext::new();
        context.on_connecting();
        assert!(context.is_disconnected());

        context.on_open();
        assert!(!context.is_disconnected());

        assert_eq!(context.on_error("reset by peer"), LinkAction::Close);
        assert_eq!(context.state(), LinkState::Errored);
        assert!(context.is_disconnected());

        context.on_close();
        assert_eq!(context.state(), LinkState::Closed);
    }

    #[test]
    fn test_subscribers_see_latest_state() {
        let mut context = ConnectionContext::new();
        let observer = context.subscribe();

        context.on_connecting();
        context.on_open();
        assert_eq!(*observer.borrow(), LinkState::Connected);

        context.on_close();
        assert!(observer.borrow().is_disconnected());
    }

    #[test]
    fn test_updates_without_subscribers() {
        let mut context = ConnectionContext::new();
        context.on_open();
        assert_eq!(context.state(), LinkState::Connected);
    }
}
