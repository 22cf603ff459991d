//! Client error types

use mutiny_common::ConfigError;
use mutiny_gateway::{BackoffExhausted, GatewayError, RegistrationError, WaitError};
use mutiny_rest::RestError;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("REST error: {0}")]
    Rest(#[from] RestError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("Gave up reconnecting: {0}")]
    ReconnectExhausted(#[from] BackoffExhausted),

    #[error("Client has not logged in")]
    NotLoggedIn,

    #[error("Client is not connected to the gateway")]
    NotConnected,

    #[error("Client is closed")]
    Closed,
}

impl Error {
    /// Whether the gateway refused the credentials
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Gateway(e) if e.is_authentication())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
