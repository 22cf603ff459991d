//! Outbound gateway commands
//!
//! Every command is an object tagged with a `type` field.

use mutiny_common::Authentication;
use mutiny_core::Id;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Commands sent from the client to the gateway
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// First message of every connection
    Authenticate(Credentials),
    /// Start the typing indicator in a channel
    BeginTyping { channel: Id },
    /// Stop the typing indicator in a channel
    EndTyping { channel: Id },
    /// Liveness ping, optionally carrying a value echoed in the Pong
    Ping {
        #[serde(skip_serializing_if = "Option::is_none")]
        time: Option<u64>,
    },
}

impl ClientCommand {
    #[must_use]
    pub fn authenticate(authentication: &Authentication) -> Self {
        Self::Authenticate(Credentials(authentication.payload()))
    }

    #[must_use]
    pub fn begin_typing(channel: impl Into<Id>) -> Self {
        Self::BeginTyping {
            channel: channel.into(),
        }
    }

    #[must_use]
    pub fn end_typing(channel: impl Into<Id>) -> Self {
        Self::EndTyping {
            channel: channel.into(),
        }
    }

    #[must_use]
    pub fn ping(time: Option<u64>) -> Self {
        Self::Ping { time }
    }

    /// Value of the `type` tag
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Authenticate(_) => "Authenticate",
            Self::BeginTyping { .. } => "BeginTyping",
            Self::EndTyping { .. } => "EndTyping",
            Self::Ping { .. } => "Ping",
        }
    }
}

/// Credential fields merged into the `Authenticate` command
#[derive(Clone)]
pub struct Credentials(Map<String, Value>);

impl Serialize for Credentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

// Never print tokens
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}
