//! Authentication data
//!
//! A client authenticates either as a bot (bot token) or as a user
//! (user id + session token). The two kinds are mutually exclusive.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::fmt;

/// Which kind of credentials a client holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationKind {
    Bot,
    User,
}

/// Credentials for the REST API and the gateway
pub enum Authentication {
    Bot {
        token: SecretString,
    },
    User {
        user_id: String,
        session_token: SecretString,
    },
}

impl Authentication {
    /// Authenticate with a bot token
    pub fn bot(token: impl Into<String>) -> Self {
        Self::Bot {
            token: SecretString::from(token.into()),
        }
    }

    /// Authenticate with a user session
    pub fn user(user_id: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
            session_token: SecretString::from(session_token.into()),
        }
    }

    pub fn kind(&self) -> AuthenticationKind {
        match self {
            Self::Bot { .. } => AuthenticationKind::Bot,
            Self::User { .. } => AuthenticationKind::User,
        }
    }

    /// Check if these are bot credentials
    #[inline]
    pub fn is_bot(&self) -> bool {
        matches!(self, Self::Bot { .. })
    }

    /// Fields merged into the gateway `Authenticate` command
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        match self {
            Self::Bot { token } => {
                payload.insert(
                    "token".to_string(),
                    Value::String(token.expose_secret().to_string()),
                );
            }
            Self::User {
                user_id,
                session_token,
            } => {
                payload.insert("user_id".to_string(), Value::String(user_id.clone()));
                payload.insert(
                    "session_token".to_string(),
                    Value::String(session_token.expose_secret().to_string()),
                );
            }
        }
        payload
    }

    /// Headers sent with every REST request
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Bot { token } => vec![("x-bot-token", token.expose_secret().to_string())],
            Self::User {
                user_id,
                session_token,
            } => vec![
                ("x-user-id", user_id.clone()),
                ("x-session-token", session_token.expose_secret().to_string()),
            ],
        }
    }
}

impl Clone for Authentication {
    fn clone(&self) -> Self {
        match self {
            Self::Bot { token } => Self::bot(token.expose_secret()),
            Self::User {
                user_id,
                session_token,
            } => Self::user(user_id.clone(), session_token.expose_secret()),
        }
    }
}

// Never print secrets
impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bot { .. } => f.debug_struct("Bot").field("token", &"[REDACTED]").finish(),
            Self::User { user_id, .. } => f
                .debug_struct("User")
                .field("user_id", user_id)
                .field("session_token", &"[REDACTED]")
                .finish(),
        }
    }
}
