//! Gateway connection
//!
//! Owns one socket session: the authentication handshake, the heartbeat task and
//! the receive loop that decodes each frame, applies it to the state store and
//! hands it to the dispatcher, strictly in arrival order.

use futures_util::stream::SplitStream;
use futures_util::StreamExt;
use mutiny_cache::SharedState;
use mutiny_common::{Authentication, WireFormat};
use mutiny_core::Id;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::config::GatewayConfig;
use super::heartbeat;
use super::outbound::{Outbound, WsStream};
use crate::dispatcher::EventDispatcher;
use crate::error::{AuthenticationError, GatewayError, GatewayResult};
use crate::events::Event;
use crate::protocol::{encoding, ClientCommand};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No socket
    #[default]
    Disconnected,
    /// Opening the socket
    Connecting,
    /// Authenticate sent, waiting for `Authenticated`
    Authenticating,
    /// Handshake complete, events are flowing
    Authenticated,
    /// Close requested locally
    Closing,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gateway session bound to a state store and a dispatcher
pub struct GatewayConnection {
    config: GatewayConfig,
    authentication: Authentication,
    state: SharedState,
    dispatcher: Arc<EventDispatcher>,

    /// Write half, shared with the heartbeat task
    outbound: Arc<Outbound>,

    /// Current lifecycle state
    connection_state: RwLock<ConnectionState>,

    /// Set once `Authenticated` arrives on the current socket
    authenticated: AtomicBool,

    heartbeat: Mutex<Option<JoinHandle<()>>>,

    /// Flipped once by `close()`; never reset
    close_requested: watch::Sender<bool>,
}

impl GatewayConnection {
    pub fn new(
        config: GatewayConfig,
        authentication: Authentication,
        state: SharedState,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        let outbound = Arc::new(Outbound::new(config.format));
        Self {
            config,
            authentication,
            state,
            dispatcher,
            outbound,
            connection_state: RwLock::new(ConnectionState::Disconnected),
            authenticated: AtomicBool::new(false),
            heartbeat: Mutex::new(None),
            close_requested: watch::Sender::new(false),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.connection_state.read()
    }

    /// Whether the current (or last) socket completed authentication
    pub fn was_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        *self.close_requested.borrow()
    }

    /// Open the socket, authenticate and run the receive loop
    ///
    /// Returns `Ok(())` once the socket closes or `close()` is called, even
    /// mid-handshake. Transport failures, unsupported frames and rejected
    /// credentials are returned as errors. The heartbeat is stopped however the
    /// session ends. A closed connection does not connect again.
    pub async fn connect(&self) -> GatewayResult<()> {
        if self.is_closed() {
            tracing::debug!("Connection is closed, not connecting");
            return Ok(());
        }

        self.authenticated.store(false, Ordering::SeqCst);
        self.set_state(ConnectionState::Connecting);

        let url = self.config.connection_url();
        tracing::info!(url = %url, format = %self.config.format, "Connecting to gateway");

        let mut closed = self.close_requested.subscribe();
        let stream = tokio::select! {
            connected = connect_async(url.as_str()) => match connected {
                Ok((stream, _response)) => stream,
                Err(e) => {
                    self.set_state(ConnectionState::Disconnected);
                    return Err(e.into());
                }
            },
            () = close_requested(&mut closed) => {
                tracing::info!("Close requested during handshake");
                self.set_state(ConnectionState::Disconnected);
                return Ok(());
            }
        };

        let (sink, mut stream) = stream.split();
        self.outbound.attach(sink).await;

        let result = if self.is_closed() {
            // close() ran before the sink was attached
            self.send_close_frame().await;
            Ok(())
        } else {
            self.run(&mut stream, &mut closed).await
        };
        self.shutdown().await;

        match &result {
            Ok(()) => tracing::info!("Gateway connection closed"),
            Err(e) => tracing::info!(error = %e, "Gateway connection ended with an error"),
        }
        result
    }

    async fn run(
        &self,
        stream: &mut SplitStream<WsStream>,
        closed: &mut watch::Receiver<bool>,
    ) -> GatewayResult<()> {
        self.set_state(ConnectionState::Authenticating);
        self.outbound
            .send(&ClientCommand::authenticate(&self.authentication))
            .await?;
        tracing::info!(kind = ?self.authentication.kind(), "Authenticate sent");

        self.start_heartbeat();

        loop {
            let frame = tokio::select! {
                frame = stream.next() => frame,
                () = close_requested(closed) => {
                    tracing::debug!("Close requested, leaving receive loop");
                    return Ok(());
                }
            };
            let Some(frame) = frame else {
                return Ok(());
            };

            // Undecodable frames cost one event, not the session
            let raw = match frame? {
                Message::Text(text) => match encoding::decode_text(&text) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!(error = %e, payload = %text, "Dropping undecodable frame");
                        continue;
                    }
                },
                Message::Binary(bytes) => match self.config.format {
                    WireFormat::MessagePack => match encoding::decode_binary(&bytes) {
                        Ok(raw) => raw,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                len = bytes.len(),
                                "Dropping undecodable frame"
                            );
                            continue;
                        }
                    },
                    WireFormat::Json => {
                        return Err(GatewayError::UnsupportedFrame(
                            "binary frame on a JSON connection",
                        ))
                    }
                },
                Message::Close(frame) => {
                    tracing::info!(frame = ?frame, "Gateway sent close");
                    return Ok(());
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };

            self.handle_payload(&raw)?;
        }
    }

    /// Decode, apply and dispatch one payload
    fn handle_payload(&self, raw: &Value) -> GatewayResult<()> {
        let event = match Event::decode(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, payload = %raw, "Dropping undecodable event");
                return Ok(());
            }
        };

        match &event {
            Event::Authenticated(_) => {
                self.authenticated.store(true, Ordering::SeqCst);
                self.set_state(ConnectionState::Authenticated);
                tracing::info!("Authenticated with gateway");
            }
            Event::Error(error) if !self.was_authenticated() => {
                tracing::warn!(error_id = %error.error, "Authentication rejected");
                return Err(AuthenticationError::from_error_id(&error.error).into());
            }
            Event::Error(error) => {
                tracing::warn!(error_id = %error.error, "Gateway reported an error");
            }
            _ => {}
        }

        if let Err(e) = event.apply(&mut self.state.write()) {
            tracing::warn!(
                event_type = %event.type_name(),
                error = %e,
                payload = %raw,
                "Dropping event that could not be applied"
            );
            return Ok(());
        }

        self.dispatcher.dispatch(event);
        Ok(())
    }

    /// Send a command on the live socket
    pub async fn send(&self, command: ClientCommand) -> GatewayResult<()> {
        tracing::debug!(command = command.type_name(), "Sending command");
        self.outbound.send(&command).await
    }

    pub async fn begin_typing(&self, channel: &Id) -> GatewayResult<()> {
        self.send(ClientCommand::begin_typing(channel.clone())).await
    }

    pub async fn end_typing(&self, channel: &Id) -> GatewayResult<()> {
        self.send(ClientCommand::end_typing(channel.clone())).await
    }

    pub async fn ping(&self, time: Option<u64>) -> GatewayResult<()> {
        self.send(ClientCommand::ping(time)).await
    }

    /// Stop the heartbeat and ask the gateway to close the socket
    ///
    /// A pending or running `connect()` returns promptly. Closing is permanent.
    pub async fn close(&self) -> GatewayResult<()> {
        self.close_requested.send_replace(true);
        self.set_state(ConnectionState::Closing);
        self.stop_heartbeat();
        self.send_close_frame().await;
        Ok(())
    }

    /// Best effort; the socket may be gone or already closing
    async fn send_close_frame(&self) {
        match self.outbound.send_frame(Message::Close(None)).await {
            Ok(()) => tracing::debug!("Close frame sent"),
            Err(GatewayError::NotConnected) => {}
            Err(e) => tracing::debug!(error = %e, "Close frame not sent"),
        }
    }

    fn start_heartbeat(&self) {
        if self.is_closed() {
            return;
        }
        let handle = heartbeat::spawn(Arc::clone(&self.outbound), self.config.heartbeat_interval);
        if let Some(previous) = self.heartbeat.lock().replace(handle) {
            previous.abort();
        }
    }

    fn stop_heartbeat(&self) {
        if let Some(handle) = self.heartbeat.lock().take() {
            handle.abort();
        }
    }

    async fn shutdown(&self) {
        self.stop_heartbeat();
        self.outbound.detach().await;
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = std::mem::replace(&mut *self.connection_state.write(), next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "Connection state changed");
        }
    }
}

/// Resolves once `close()` has been called
async fn close_requested(closed: &mut watch::Receiver<bool>) {
    // The sender lives as long as the connection
    let _ = closed.wait_for(|requested| *requested).await;
}

impl Drop for GatewayConnection {
    fn drop(&mut self) {
        self.stop_heartbeat();
    }
}

impl fmt::Debug for GatewayConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConnection")
            .field("url", &self.config.url)
            .field("format", &self.config.format)
            .field("state", &self.state())
            .field("authenticated", &self.was_authenticated())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
