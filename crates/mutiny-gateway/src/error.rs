//! Gateway error types

use tokio_tungstenite::tungstenite;

use crate::protocol::FrameError;

/// Reasons the gateway rejected authentication
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account onboarding is not finished")]
    OnboardingNotFinished,

    #[error("Authentication rejected: {0}")]
    Other(String),
}

impl AuthenticationError {
    /// Map the id of an `Error` event received before authentication
    #[must_use]
    pub fn from_error_id(id: &str) -> Self {
        match id {
            "InvalidSession" => Self::InvalidCredentials,
            "OnboardingNotFinished" => Self::OnboardingNotFinished,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("WebSocket error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error("Unsupported frame: {0}")]
    UnsupportedFrame(&'static str),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Not connected")]
    NotConnected,
}

impl GatewayError {
    /// Whether the gateway refused the credentials; such errors are never retried
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
