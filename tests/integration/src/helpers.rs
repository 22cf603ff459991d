//! Mock API server for integration tests
//!
//! Serves the API configuration at `/` and a scripted WebSocket gateway at
//! `/gateway`. Each gateway connection plays one session script; commands
//! received from the client are recorded for assertions.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use mutiny::{Authentication, Client, ClientConfig, ReconnectConfig, WireFormat};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::fixtures::{api_configuration, BOT_TOKEN};

/// One step of a scripted gateway session
#[derive(Debug, Clone)]
pub enum Step {
    /// Read client frames until an `Authenticate` command arrives
    AwaitAuthenticate,
    /// Read client frames until a command of this type arrives
    AwaitCommand(&'static str),
    /// Send a payload in the connection's format
    Send(Value),
    /// Send a raw text frame
    SendText(String),
    /// Send a raw binary frame
    SendBinary(Vec<u8>),
    /// Sleep before the next step
    Pause(Duration),
    /// Send a close frame and end the session
    Close,
}

/// A command received by the mock gateway
#[derive(Debug, Clone)]
pub struct Received {
    /// Zero-based index of the connection it arrived on
    pub connection: usize,
    pub command: Value,
}

/// Query string of a gateway connection
#[derive(Debug, Clone)]
pub struct ConnectionQuery {
    pub version: Option<String>,
    pub format: Option<String>,
}

#[derive(Clone)]
struct MockState {
    gateway_url: String,
    sessions: Arc<Vec<Vec<Step>>>,
    upgrade_delay: Duration,
    connections: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<ConnectionQuery>>>,
    received: mpsc::UnboundedSender<Received>,
}

/// Mock REST + gateway server instance
pub struct MockServer {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<ConnectionQuery>>>,
    received: mpsc::UnboundedReceiver<Received>,
    _handle: JoinHandle<()>,
}

impl MockServer {
    /// Start a server whose n-th gateway connection plays `sessions[n]`
    ///
    /// Connections past the end of the list replay the last session.
    pub async fn start(sessions: Vec<Vec<Step>>) -> Result<Self> {
        Self::start_with_upgrade_delay(sessions, Duration::ZERO).await
    }

    /// Like `start`, but each gateway upgrade is answered after `delay`
    pub async fn start_with_upgrade_delay(
        sessions: Vec<Vec<Step>>,
        delay: Duration,
    ) -> Result<Self> {
        if sessions.is_empty() {
            return Err(anyhow!("at least one gateway session is required"));
        }

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let connections = Arc::new(AtomicUsize::new(0));
        let queries = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();

        let state = MockState {
            gateway_url: format!("ws://{addr}/gateway"),
            sessions: Arc::new(sessions),
            upgrade_delay: delay,
            connections: Arc::clone(&connections),
            queries: Arc::clone(&queries),
            received: tx,
        };

        let app = Router::new()
            .route("/", get(api_root))
            .route("/gateway", get(gateway_upgrade))
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            connections,
            queries,
            received: rx,
            _handle: handle,
        })
    }

    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of gateway connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub async fn queries(&self) -> Vec<ConnectionQuery> {
        self.queries.lock().await.clone()
    }

    /// Next recorded command of the given type, skipping others
    pub async fn next_command(&mut self, command_type: &str) -> Result<Received> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let received = tokio::time::timeout_at(deadline, self.received.recv())
                .await
                .map_err(|_| anyhow!("timed out waiting for {command_type}"))?
                .ok_or_else(|| anyhow!("mock server stopped"))?;
            if received.command["type"] == command_type {
                return Ok(received);
            }
        }
    }

    /// Every command recorded during the next `window`
    pub async fn commands_within(&mut self, window: Duration) -> Vec<Received> {
        let deadline = tokio::time::Instant::now() + window;
        let mut commands = Vec::new();
        while let Ok(Some(received)) = tokio::time::timeout_at(deadline, self.received.recv()).await
        {
            commands.push(received);
        }
        commands
    }

    /// Client configured against this server with fast, bounded reconnects
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(Authentication::bot(BOT_TOKEN))
            .with_api_url(self.api_url())
            .with_heartbeat_interval(Duration::from_secs(30))
            .with_reconnect(ReconnectConfig {
                enabled: true,
                max_attempts: Some(5),
                max_delay: Duration::from_secs(1),
            })
    }

    pub fn client(&self) -> Result<Arc<Client>> {
        Ok(Arc::new(Client::new(self.client_config())?))
    }
}

async fn api_root(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if headers.get("x-bot-token").and_then(|v| v.to_str().ok()) != Some(BOT_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(api_configuration(&state.gateway_url)).into_response()
}

async fn gateway_upgrade(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let index = state.connections.fetch_add(1, Ordering::SeqCst);
    let query = ConnectionQuery {
        version: query.get("version").cloned(),
        format: query.get("format").cloned(),
    };
    let msgpack = query.format.as_deref() == Some("msgpack");
    state.queries.lock().await.push(query);

    let steps = state.sessions[index.min(state.sessions.len() - 1)].clone();
    tokio::time::sleep(state.upgrade_delay).await;
    ws.on_upgrade(move |socket| async move {
        let mut session = Session {
            socket,
            index,
            msgpack,
            received: state.received,
        };
        if let Err(e) = session.play(steps).await {
            tracing::debug!(connection = index, error = %e, "Mock session ended");
        }
    })
}

struct Session {
    socket: WebSocket,
    index: usize,
    msgpack: bool,
    received: mpsc::UnboundedSender<Received>,
}

impl Session {
    async fn play(&mut self, steps: Vec<Step>) -> Result<()> {
        for step in steps {
            match step {
                Step::AwaitAuthenticate => self.await_command("Authenticate").await?,
                Step::AwaitCommand(command_type) => self.await_command(command_type).await?,
                Step::Send(payload) => {
                    let frame = if self.msgpack {
                        Message::Binary(rmp_serde::to_vec_named(&payload)?)
                    } else {
                        Message::Text(payload.to_string())
                    };
                    self.socket.send(frame).await?;
                }
                Step::SendText(text) => self.socket.send(Message::Text(text)).await?,
                Step::SendBinary(bytes) => self.socket.send(Message::Binary(bytes)).await?,
                Step::Pause(duration) => tokio::time::sleep(duration).await,
                Step::Close => {
                    self.socket.send(Message::Close(None)).await?;
                    return Ok(());
                }
            }
        }

        // Keep recording until the client goes away
        while self.recv().await?.is_some() {}
        Ok(())
    }

    async fn await_command(&mut self, command_type: &str) -> Result<()> {
        while let Some(command) = self.recv().await? {
            if command["type"] == command_type {
                return Ok(());
            }
        }
        Err(anyhow!("client disconnected before {command_type}"))
    }

    /// Next decoded client command, `None` once the socket is gone
    async fn recv(&mut self) -> Result<Option<Value>> {
        loop {
            let Some(frame) = self.socket.recv().await else {
                return Ok(None);
            };
            let command: Value = match frame {
                Ok(Message::Text(text)) => serde_json::from_str(&text)?,
                Ok(Message::Binary(bytes)) => rmp_serde::from_slice(&bytes)?,
                Ok(Message::Close(_)) | Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Err(_) => return Ok(None),
            };
            // The test may have stopped listening
            let _ = self.received.send(Received {
                connection: self.index,
                command: command.clone(),
            });
            return Ok(Some(command));
        }
    }
}

/// Wait until `condition` holds, polling every few milliseconds
pub async fn eventually<F>(mut condition: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .map_err(|_| anyhow!("condition not met in time"))
}

/// Client configuration using MessagePack frames
pub fn msgpack_config(server: &MockServer) -> ClientConfig {
    server.client_config().with_format(WireFormat::MessagePack)
}
