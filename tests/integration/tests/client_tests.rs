//! Client integration tests
//!
//! Each test drives a real `Client` against the in-process mock server.
//!
//! Run with: cargo test -p integration-tests --test client_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::*;
use mutiny::events::{Event, EventType, MessageEvent, ReadyEvent};
use mutiny::{Authentication, Client, ConnectionState, Error};
use mutiny_gateway::{AuthenticationError, GatewayError, WaitError};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Log in and run the gateway on a background task
async fn spawn_client(client: &Arc<Client>) -> JoinHandle<mutiny::Result<()>> {
    client.login().await.expect("login failed");
    let client = Arc::clone(client);
    tokio::spawn(async move { client.connect().await })
}

/// Forward every dispatched event's type name
fn record_events(client: &Client) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    client.add_listener(move |event: Event| {
        let tx = tx.clone();
        async move {
            tx.send(event.type_name().to_string())?;
            Ok(())
        }
    });
    rx
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<String>, name: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(seen) = rx.recv().await {
            if seen == name {
                return;
            }
        }
        panic!("event stream ended before {name}");
    })
    .await
    .unwrap_or_else(|_| panic!("no {name} event"));
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_login_fetches_gateway_url() {
    let server = MockServer::start(vec![vec![]]).await.unwrap();
    let client = server.client().unwrap();

    client.login().await.unwrap();
    let configuration = client.api_configuration().unwrap();
    assert_eq!(configuration.gateway_url(), format!("ws://{}/gateway", server.addr));
    assert_eq!(configuration.cdn_url(), Some("http://autumn.invalid"));
}

#[tokio::test]
async fn test_login_with_wrong_token_fails() {
    let server = MockServer::start(vec![vec![]]).await.unwrap();
    let mut config = server.client_config();
    config.authentication = Authentication::bot("wrong");
    let client = Client::new(config).unwrap();

    assert!(matches!(client.login().await, Err(Error::Rest(_))));
}

#[tokio::test]
async fn test_handshake_populates_state_before_dispatch() {
    let mut server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
        Step::Send(ready()),
    ]])
    .await
    .unwrap();
    let client = server.client().unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let state = client.state().clone();
    client.add_listener(move |event: ReadyEvent| {
        let tx = tx.clone();
        let state = state.clone();
        async move {
            let counts = state.with(|s| (s.server_count(), s.channel_count(), s.user_count()));
            tx.send((event.users.len(), counts))?;
            Ok(())
        }
    });

    let handle = spawn_client(&client).await;

    let authenticate = server.next_command("Authenticate").await.unwrap();
    assert_eq!(
        authenticate.command,
        json!({"type": "Authenticate", "token": BOT_TOKEN})
    );

    let (users, counts) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(users, 2);
    assert_eq!(counts, (1, 1, 2));
    assert_eq!(client.connection_state(), ConnectionState::Authenticated);

    let query = &server.queries().await[0];
    assert_eq!(query.version.as_deref(), Some("1"));
    assert_eq!(query.format.as_deref(), Some("json"));

    assert_eq!(
        client.state().read().current_user().map(|u| u.username.clone()),
        Some("mutiny".to_string())
    );

    client.close().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_heartbeat_pings_after_authenticate() {
    let mut server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
    ]])
    .await
    .unwrap();
    let client = Arc::new(
        Client::new(
            server
                .client_config()
                .with_heartbeat_interval(Duration::from_millis(20)),
        )
        .unwrap(),
    );

    let _handle = spawn_client(&client).await;

    let authenticate = server.next_command("Authenticate").await.unwrap();
    let first = server.next_command("Ping").await.unwrap();
    let second = server.next_command("Ping").await.unwrap();
    assert_eq!(authenticate.connection, 0);
    assert_eq!(first.command, json!({"type": "Ping"}));
    assert_eq!(second.connection, 0);

    client.close().await.unwrap();
}

/// Ping commands recorded after in-flight frames have drained
async fn pings_after_drain(server: &mut MockServer, interval: Duration) -> usize {
    server.commands_within(interval * 5).await;
    server
        .commands_within(interval * 10)
        .await
        .iter()
        .filter(|received| received.command["type"] == "Ping")
        .count()
}

#[tokio::test]
async fn test_heartbeat_stops_on_close() {
    let interval = Duration::from_millis(20);
    let mut server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
    ]])
    .await
    .unwrap();
    let client = Arc::new(
        Client::new(server.client_config().with_heartbeat_interval(interval)).unwrap(),
    );

    let handle = spawn_client(&client).await;
    server.next_command("Ping").await.unwrap();

    client.close().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(pings_after_drain(&mut server, interval).await, 0);
    assert_eq!(server.connection_count(), 1);
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_heartbeat_stops_when_session_fails() {
    let interval = Duration::from_millis(20);
    let mut server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
        Step::AwaitCommand("Ping"),
        Step::SendBinary(vec![0x81, 0xa1, 0x61, 0x01]),
    ]])
    .await
    .unwrap();
    let mut config = server.client_config().with_heartbeat_interval(interval);
    config.reconnect.enabled = false;
    let client = Client::new(config).unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), client.start())
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, Error::Gateway(GatewayError::UnsupportedFrame(_))));

    assert_eq!(pings_after_drain(&mut server, interval).await, 0);
    assert_eq!(server.connection_count(), 1);
}

#[tokio::test]
async fn test_close_during_handshake_stops_session() {
    let mut server = MockServer::start_with_upgrade_delay(
        vec![vec![Step::AwaitAuthenticate, Step::Send(authenticated())]],
        Duration::from_millis(300),
    )
    .await
    .unwrap();
    let client = Arc::new(
        Client::new(
            server
                .client_config()
                .with_heartbeat_interval(Duration::from_millis(20)),
        )
        .unwrap(),
    );

    let handle = spawn_client(&client).await;
    eventually(|| server.connection_count() == 1).await.unwrap();
    assert_eq!(client.connection_state(), ConnectionState::Connecting);

    client.close().await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("connect kept running after close")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);

    // The upgrade completes late; nothing may follow it
    assert!(server
        .commands_within(Duration::from_millis(500))
        .await
        .is_empty());
    assert_eq!(server.connection_count(), 1);
}

#[tokio::test]
async fn test_messagepack_session() {
    let server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
        Step::Send(ready()),
        Step::Send(message("01FD58YK5W7QRV5H3D64NTQ5J0", "packed")),
    ]])
    .await
    .unwrap();
    let client = Arc::new(Client::new(msgpack_config(&server)).unwrap());
    let mut events = record_events(&client);

    let _handle = spawn_client(&client).await;
    next_event(&mut events, "Message").await;

    assert_eq!(server.queries().await[0].format.as_deref(), Some("msgpack"));
    assert_eq!(
        client
            .state()
            .read()
            .channel(CHANNEL_ID)
            .and_then(|c| c.last_message_id().cloned()),
        Some("01FD58YK5W7QRV5H3D64NTQ5J0".into())
    );

    client.close().await.unwrap();
}

// ============================================================================
// Authentication failures
// ============================================================================

#[tokio::test]
async fn test_invalid_session_is_not_retried() {
    let server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(error("InvalidSession")),
    ]])
    .await
    .unwrap();
    let client = server.client().unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), client.start())
        .await
        .unwrap()
        .unwrap_err();

    assert!(err.is_authentication());
    assert!(matches!(
        err,
        Error::Gateway(GatewayError::Authentication(AuthenticationError::InvalidCredentials))
    ));
    assert_eq!(server.connection_count(), 1);
}

#[tokio::test]
async fn test_onboarding_not_finished() {
    let server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(error("OnboardingNotFinished")),
    ]])
    .await
    .unwrap();
    let client = server.client().unwrap();

    let err = client.start().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Gateway(GatewayError::Authentication(
            AuthenticationError::OnboardingNotFinished
        ))
    ));
}

#[tokio::test]
async fn test_error_after_authentication_is_ignored() {
    let server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
        Step::Send(error("AlreadyAuthenticated")),
        Step::Send(ready()),
    ]])
    .await
    .unwrap();
    let client = server.client().unwrap();
    let mut events = record_events(&client);

    let handle = spawn_client(&client).await;
    next_event(&mut events, "Ready").await;

    assert!(!handle.is_finished());
    assert_eq!(client.connection_state(), ConnectionState::Authenticated);

    client.close().await.unwrap();
}

// ============================================================================
// Event flow
// ============================================================================

#[tokio::test]
async fn test_unknown_and_malformed_payloads_are_skipped() {
    let server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
        Step::Send(ready()),
        Step::SendText("{not json".to_string()),
        Step::Send(json!({"no_type": true})),
        Step::Send(json!({"type": "SomethingFromTheFuture", "value": 1})),
        Step::Send(json!({"type": "Message", "_id": "m0", "channel": "missing", "author": FRIEND_ID, "content": "lost"})),
        Step::Send(channel_create("01FD58YK5W7QRV5H3D64NTQ5J1", "random")),
        Step::Send(message("01FD58YK5W7QRV5H3D64NTQ5J2", "hello")),
    ]])
    .await
    .unwrap();
    let client = server.client().unwrap();
    let mut events = record_events(&client);

    let (tx, mut messages) = mpsc::unbounded_channel();
    client.add_listener(move |event: MessageEvent| {
        let tx = tx.clone();
        async move {
            tx.send(event.message.id.to_string())?;
            Ok(())
        }
    });

    let _handle = spawn_client(&client).await;

    let delivered = tokio::time::timeout(Duration::from_secs(5), messages.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(delivered, "01FD58YK5W7QRV5H3D64NTQ5J2");

    // The unknown event still reaches base listeners
    next_event(&mut events, "SomethingFromTheFuture").await;

    let state = client.state().read();
    let server_entry = state.server(SERVER_ID).unwrap();
    assert!(server_entry.has_channel("01FD58YK5W7QRV5H3D64NTQ5J1"));
    assert_eq!(state.channel_count(), 2);
    drop(state);

    // The message for the unknown channel was dropped, not dispatched
    assert!(messages.try_recv().is_err());

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_binary_frame_on_json_connection_is_fatal() {
    let server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
        Step::SendBinary(vec![0x81, 0xa1, 0x61, 0x01]),
    ]])
    .await
    .unwrap();
    let mut config = server.client_config();
    config.reconnect.enabled = false;
    let client = Client::new(config).unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), client.start())
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, Error::Gateway(GatewayError::UnsupportedFrame(_))));
}

#[tokio::test]
async fn test_wait_for_and_typing() {
    let server = MockServer::start(vec![vec![
        Step::AwaitAuthenticate,
        Step::Send(authenticated()),
        Step::Send(ready()),
        Step::AwaitCommand("BeginTyping"),
        Step::Send(message("01FD58YK5W7QRV5H3D64NTQ5J3", "ignored")),
        Step::Send(message("01FD58YK5W7QRV5H3D64NTQ5J4", "wanted")),
    ]])
    .await
    .unwrap();
    let client = server.client().unwrap();
    let mut events = record_events(&client);

    let _handle = spawn_client(&client).await;
    next_event(&mut events, "Ready").await;

    let waiter = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .wait_for::<MessageEvent, _>(
                    |event| event.message.text() == Some("wanted"),
                    Some(Duration::from_secs(5)),
                )
                .await
        })
    };
    eventually(|| client.dispatcher().listener_count(EventType::Message) == 1)
        .await
        .unwrap();

    client
        .begin_typing(&CHANNEL_ID.into())
        .await
        .unwrap();

    let event = waiter.await.unwrap().unwrap();
    assert_eq!(event.message.id, "01FD58YK5W7QRV5H3D64NTQ5J4");
    assert_eq!(client.dispatcher().listener_count(EventType::Message), 0);

    let timed_out = client
        .wait_for::<MessageEvent, _>(|_| true, Some(Duration::from_millis(20)))
        .await;
    assert!(matches!(timed_out, Err(Error::Wait(WaitError::Timeout(_)))));

    client.close().await.unwrap();
}

// ============================================================================
// Reconnect
// ============================================================================

#[tokio::test]
async fn test_reconnects_after_authenticated_session_closes() {
    let mut server = MockServer::start(vec![
        vec![
            Step::AwaitAuthenticate,
            Step::Send(authenticated()),
            Step::Send(ready()),
            Step::Pause(Duration::from_millis(50)),
            Step::Close,
        ],
        vec![
            Step::AwaitAuthenticate,
            Step::Send(authenticated()),
            Step::Send(ready()),
        ],
    ])
    .await
    .unwrap();
    let client = server.client().unwrap();
    let mut events = record_events(&client);

    let handle = spawn_client(&client).await;

    assert_eq!(server.next_command("Authenticate").await.unwrap().connection, 0);
    next_event(&mut events, "Ready").await;
    assert_eq!(server.next_command("Authenticate").await.unwrap().connection, 1);
    next_event(&mut events, "Ready").await;

    assert_eq!(server.connection_count(), 2);
    assert_eq!(client.state().read().server_count(), 1);

    client.close().await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_reconnect_gives_up_when_backoff_is_exhausted() {
    // Closes before authenticating, so the backoff never resets
    let server = MockServer::start(vec![vec![Step::Close]]).await.unwrap();
    let mut config = server.client_config();
    config.reconnect.max_attempts = Some(3);
    config.reconnect.max_delay = Duration::from_millis(10);
    let client = Client::new(config).unwrap();

    let err = tokio::time::timeout(Duration::from_secs(10), client.start())
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, Error::ReconnectExhausted(_)));
    assert_eq!(server.connection_count(), 3);
}
