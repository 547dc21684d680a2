//! Connection manager: socket lifecycle, reconnect timer and frame delivery.

use futures_util::{SinkExt, StreamExt};
use navglass_binding::{Document, MessageDispatcher};
use navglass_core::RetryConfig;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use crate::backoff::ReconnectBackoff;
use crate::endpoint::TelemetryEndpoint;
use crate::error::{LinkError, Result};
use crate::state::{ConnectionContext, LinkAction, LinkState};

/// Upper bound on opening one socket, handshake included
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type FeedStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Dropped,
    Shutdown,
}

/// Keeps one display bound to one telemetry feed.
pub struct ConnectionManager<D> {
    endpoint: TelemetryEndpoint,
    context: ConnectionContext,
    backoff: ReconnectBackoff,
    dispatcher: MessageDispatcher,
    document: D,
}

impl<D: Document> ConnectionManager<D> {
    /// Create a manager. Nothing connects until [`ConnectionManager::run`].
    pub fn new(
        endpoint: TelemetryEndpoint,
        retry: &RetryConfig,
        dispatcher: MessageDispatcher,
        document: D,
    ) -> Self {
        Self {
            endpoint,
            context: ConnectionContext::new(),
            backoff: ReconnectBackoff::new(retry),
            dispatcher,
            document,
        }
    }

    /// Feed address
    pub fn endpoint(&self) -> &TelemetryEndpoint {
        &self.endpoint
    }

    /// Observe link state changes
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.context.subscribe()
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.context.state()
    }

    /// The bound display
    pub fn document(&self) -> &D {
        &self.document
    }

    /// The bound display, mutably (e.g. to change its layout)
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Give back the display
    pub fn into_document(self) -> D {
        self.document
    }

    /// Connect and keep the display updated until `shutdown` turns true or
    /// its sender is dropped.
    ///
    /// Dropped connections are retried with backoff. Returns
    /// [`LinkError::RetriesExhausted`] after too many consecutive failures.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            if *shutdown.borrow() {
                break;
            }

            self.context.on_connecting();
            info!(endpoint = %self.endpoint, "Connecting to telemetry feed");

            let attempt = tokio::select! {
                attempt = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(self.endpoint.as_str())) => attempt,
                _ = shutdown_requested(&mut shutdown) => break,
            };

            match attempt {
                Ok(Ok((stream, _response))) => {
                    self.context.on_open();
                    self.backoff.reset();
                    info!(endpoint = %self.endpoint, "Telemetry feed connected");

                    if self.pump(stream, &mut shutdown).await == SessionEnd::Shutdown {
                        return Ok(());
                    }
                }
                Ok(Err(e)) => {
                    self.context.on_error(&e.to_string());
                    self.context.on_close();
                }
                Err(_) => {
                    self.context.on_error("connect timed out");
                    self.context.on_close();
                }
            }

            let Some(delay) = self.backoff.next_delay() else {
                // the attempt that just failed plus every retry before it
                let attempts = self.backoff.attempts() + 1;
                warn!(attempts, "Giving up on telemetry feed");
                return Err(LinkError::RetriesExhausted { attempts });
            };

            info!(
                delay_ms = delay.as_millis() as u64,
                attempt = self.backoff.attempts(),
                "Reconnecting to telemetry feed"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }

        self.context.on_close();
        Ok(())
    }

    /// Handle one text frame. Malformed frames are dropped.
    pub fn on_message(&mut self, text: &str) {
        match self.dispatcher.on_frame(&mut self.document, text) {
            Ok(report) => trace!(
                sections = report.sections.len(),
                updated = report.outcome.updated,
                "Applied telemetry frame"
            ),
            Err(e) => warn!(error = %e, "Dropping telemetry frame"),
        }
    }

    async fn pump(&mut self, stream: FeedStream, shutdown: &mut watch::Receiver<bool>) -> SessionEnd {
        let (mut sink, mut source) = stream.split();

        loop {
            tokio::select! {
                message = source.next() => match message {
                    Some(Ok(Message::Text(text))) => self.on_message(&text),
                    Some(Ok(Message::Binary(data))) => {
                        debug!(len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "Telemetry feed closed by server");
                        // flushes the queued close reply
                        let _ = sink.close().await;
                        self.context.on_close();
                        return SessionEnd::Dropped;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        if self.context.on_error(&e.to_string()) == LinkAction::Close {
                            let _ = sink.close().await;
                        }
                        self.context.on_close();
                        return SessionEnd::Dropped;
                    }
                    None => {
                        info!("Telemetry feed ended");
                        self.context.on_close();
                        return SessionEnd::Dropped;
                    }
                },
                _ = shutdown_requested(shutdown) => {
                    info!("Closing telemetry feed");
                    let _ = sink.close().await;
                    self.context.on_close();
                    return SessionEnd::Shutdown;
                }
            }
        }
    }
}

/// Resolves once the shutdown flag is set or its sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if shutdown.changed().await.is_err() || *shutdown.borrow_and_update() {
            return;
        }
    }
}
