//! Client facade
//!
//! Composes the REST client, the gateway connection, the state store and the
//! dispatcher, and keeps the gateway session alive across disconnects.

use mutiny_cache::SharedState;
use mutiny_common::ClientConfig;
use mutiny_core::Id;
use mutiny_gateway::{
    ConnectionState, Event, EventDispatcher, EventType, EventVariant, ExponentialBackoff,
    GatewayConfig, GatewayConnection, ListenerId,
};
use mutiny_rest::{ApiConfiguration, RestClient};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::error::{Error, Result};

/// A chat client session
pub struct Client {
    config: ClientConfig,
    rest: RestClient,
    state: SharedState,
    dispatcher: Arc<EventDispatcher>,

    /// Set by `login()`
    api_configuration: RwLock<Option<ApiConfiguration>>,

    /// Live gateway, set while `connect()` runs
    gateway: RwLock<Option<Arc<GatewayConnection>>>,

    closed: AtomicBool,
    shutdown: Notify,
}

impl Client {
    /// Create a client; nothing is sent until `login()`
    pub fn new(config: ClientConfig) -> Result<Self> {
        let rest = RestClient::new(config.api_url.clone(), config.authentication.clone())?;

        Ok(Self {
            config,
            rest,
            state: SharedState::new(),
            dispatcher: EventDispatcher::new_shared(),
            api_configuration: RwLock::new(None),
            gateway: RwLock::new(None),
            closed: AtomicBool::new(false),
            shutdown: Notify::new(),
        })
    }

    /// Load configuration from the environment and create a client
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Cached entities
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Configuration fetched by `login()`
    pub fn api_configuration(&self) -> Option<ApiConfiguration> {
        self.api_configuration.read().clone()
    }

    /// State of the live gateway, `Disconnected` when there is none
    pub fn connection_state(&self) -> ConnectionState {
        self.gateway
            .read()
            .as_ref()
            .map_or(ConnectionState::Disconnected, |gateway| gateway.state())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Log in and run the gateway until it is closed or fails
    pub async fn start(&self) -> Result<()> {
        self.login().await?;
        self.connect().await
    }

    /// Fetch the API configuration
    pub async fn login(&self) -> Result<()> {
        let configuration = self.rest.fetch_configuration().await?;
        *self.api_configuration.write() = Some(configuration);
        Ok(())
    }

    /// Run the gateway, reconnecting after lost sessions
    ///
    /// Returns `Ok(())` after `close()`. Rejected credentials are returned at
    /// once; other failures are retried with exponential backoff until it is
    /// exhausted (`Error::ReconnectExhausted`). A session that authenticated
    /// resets the backoff.
    pub async fn connect(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }

        let gateway_url = self
            .api_configuration
            .read()
            .as_ref()
            .map(|configuration| configuration.gateway_url().to_string())
            .ok_or(Error::NotLoggedIn)?;

        let gateway = Arc::new(GatewayConnection::new(
            GatewayConfig::new(gateway_url)
                .with_format(self.config.format)
                .with_heartbeat_interval(self.config.heartbeat_interval),
            self.config.authentication.clone(),
            self.state.clone(),
            Arc::clone(&self.dispatcher),
        ));
        *self.gateway.write() = Some(Arc::clone(&gateway));

        let result = self.run_gateway(&gateway).await;
        *self.gateway.write() = None;
        result
    }

    async fn run_gateway(&self, gateway: &GatewayConnection) -> Result<()> {
        let reconnect = &self.config.reconnect;
        let mut backoff = ExponentialBackoff::new(reconnect.max_attempts, reconnect.max_delay);

        loop {
            if self.is_closed() {
                return Ok(());
            }
            let result = gateway.connect().await;

            if self.is_closed() {
                return Ok(());
            }

            match result {
                Err(e) if e.is_authentication() => return Err(e.into()),
                Err(e) if !reconnect.enabled => return Err(e.into()),
                Ok(()) if !reconnect.enabled => return Ok(()),
                Err(e) => tracing::warn!(error = %e, "Gateway connection lost"),
                Ok(()) => tracing::warn!("Gateway closed the connection"),
            }

            if gateway.was_authenticated() {
                backoff.reset();
            }

            tokio::select! {
                delay = backoff.delay() => {
                    delay?;
                }
                () = self.shutdown.notified() => return Ok(()),
            }
            tracing::info!(attempt = backoff.attempt(), "Reconnecting to gateway");
        }
    }

    /// Stop reconnecting and close the gateway
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::info!("Closing client");
        self.shutdown.notify_one();

        let gateway = self.gateway.read().clone();
        if let Some(gateway) = gateway {
            gateway.close().await?;
        }
        Ok(())
    }

    fn live_gateway(&self) -> Result<Arc<GatewayConnection>> {
        self.gateway.read().clone().ok_or(Error::NotConnected)
    }

    pub async fn begin_typing(&self, channel: &Id) -> Result<()> {
        Ok(self.live_gateway()?.begin_typing(channel).await?)
    }

    pub async fn end_typing(&self, channel: &Id) -> Result<()> {
        Ok(self.live_gateway()?.end_typing(channel).await?)
    }

    /// Register a listener; its parameter type selects the event type
    pub fn add_listener<E, F, Fut>(&self, listener: F) -> ListenerId
    where
        E: EventVariant,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.dispatcher.add_listener(listener)
    }

    pub fn add_listener_for<F, Fut>(&self, event_type: EventType, listener: F) -> ListenerId
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.dispatcher.add_listener_for(event_type, listener)
    }

    /// Register a listener by event type name
    pub fn add_listener_named<F, Fut>(&self, name: &str, listener: F) -> Result<ListenerId>
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Ok(self.dispatcher.add_listener_named(name, listener)?)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.dispatcher.remove_listener(id)
    }

    /// Wait for the next event of type `E` accepted by `predicate`
    pub async fn wait_for<E, P>(&self, predicate: P, timeout: Option<Duration>) -> Result<E>
    where
        E: EventVariant,
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Ok(self.dispatcher.wait_for(predicate, timeout).await?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.config.api_url)
            .field("connection_state", &self.connection_state())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutiny_common::Authentication;

    fn client() -> Client {
        let config =
            ClientConfig::new(Authentication::bot("token")).with_api_url("http://127.0.0.1:9");
        Client::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_connect_requires_login() {
        let client = client();
        assert!(matches!(client.connect().await, Err(Error::NotLoggedIn)));
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_typing_requires_gateway() {
        let client = client();
        let err = client.begin_typing(&Id::from("c1")).await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn test_closed_client_does_not_connect() {
        let client = client();
        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(client.is_closed());
        assert!(matches!(client.connect().await, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn test_named_listener_registration() {
        let client = client();
        assert!(client.add_listener_named("Ready", |_| async { Ok(()) }).is_ok());
        assert!(matches!(
            client.add_listener_named("Nope", |_| async { Ok(()) }),
            Err(Error::Registration(_))
        ));
    }
}
