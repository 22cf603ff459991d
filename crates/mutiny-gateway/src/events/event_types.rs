//! Gateway event types
//!
//! Defines the discriminants sent in the `type` field of inbound messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
///
/// `Any` is the base type every other type descends from. Listeners registered
/// for it see every dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Base of every event type
    Any,
    /// Discriminant not known to this client
    Unknown,

    // Connection events
    /// Error reported by the server
    Error,
    /// Authentication accepted
    Authenticated,
    /// Reply to a Ping
    Pong,
    /// Full state snapshot
    Ready,

    // Message events
    /// New message
    Message,
    /// Message edited
    MessageUpdate,
    /// Message deleted
    MessageDelete,

    // Channel events
    /// Channel created
    ChannelCreate,
    /// Channel updated
    ChannelUpdate,
    /// Channel deleted
    ChannelDelete,
    /// User added to a group
    ChannelGroupJoin,
    /// User removed from a group
    ChannelGroupLeave,
    /// User started typing
    ChannelStartTyping,
    /// User stopped typing
    ChannelStopTyping,
    /// Channel acknowledged up to a message
    ChannelAck,

    // Server events
    /// Server updated
    ServerUpdate,
    /// Server deleted
    ServerDelete,
    /// Member updated (roles, nickname)
    ServerMemberUpdate,
    /// User joined a server
    ServerMemberJoin,
    /// User left a server
    ServerMemberLeave,
    /// Role created or updated
    ServerRoleUpdate,
    /// Role deleted
    ServerRoleDelete,

    // User events
    /// User updated
    UserUpdate,
    /// Relationship with the current user changed
    UserRelationship,
}

impl EventType {
    /// Every concrete type with a wire discriminant
    pub const CONCRETE: [Self; 24] = [
        Self::Error,
        Self::Authenticated,
        Self::Pong,
        Self::Ready,
        Self::Message,
        Self::MessageUpdate,
        Self::MessageDelete,
        Self::ChannelCreate,
        Self::ChannelUpdate,
        Self::ChannelDelete,
        Self::ChannelGroupJoin,
        Self::ChannelGroupLeave,
        Self::ChannelStartTyping,
        Self::ChannelStopTyping,
        Self::ChannelAck,
        Self::ServerUpdate,
        Self::ServerDelete,
        Self::ServerMemberUpdate,
        Self::ServerMemberJoin,
        Self::ServerMemberLeave,
        Self::ServerRoleUpdate,
        Self::ServerRoleDelete,
        Self::UserUpdate,
        Self::UserRelationship,
    ];

    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::Unknown => "Unknown",
            Self::Error => "Error",
            Self::Authenticated => "Authenticated",
            Self::Pong => "Pong",
            Self::Ready => "Ready",
            Self::Message => "Message",
            Self::MessageUpdate => "MessageUpdate",
            Self::MessageDelete => "MessageDelete",
            Self::ChannelCreate => "ChannelCreate",
            Self::ChannelUpdate => "ChannelUpdate",
            Self::ChannelDelete => "ChannelDelete",
            Self::ChannelGroupJoin => "ChannelGroupJoin",
            Self::ChannelGroupLeave => "ChannelGroupLeave",
            Self::ChannelStartTyping => "ChannelStartTyping",
            Self::ChannelStopTyping => "ChannelStopTyping",
            Self::ChannelAck => "ChannelAck",
            Self::ServerUpdate => "ServerUpdate",
            Self::ServerDelete => "ServerDelete",
            Self::ServerMemberUpdate => "ServerMemberUpdate",
            Self::ServerMemberJoin => "ServerMemberJoin",
            Self::ServerMemberLeave => "ServerMemberLeave",
            Self::ServerRoleUpdate => "ServerRoleUpdate",
            Self::ServerRoleDelete => "ServerRoleDelete",
            Self::UserUpdate => "UserUpdate",
            Self::UserRelationship => "UserRelationship",
        }
    }

    /// Parse an event type from its name
    ///
    /// Accepts every wire discriminant plus `Any`/`Event` for the base type and
    /// `Unknown`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Any" | "Event" => Some(Self::Any),
            "Unknown" => Some(Self::Unknown),
            other => Self::CONCRETE.into_iter().find(|t| t.as_str() == other),
        }
    }

    /// Direct parent type; `None` only for `Any`
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Any => None,
            _ => Some(Self::Any),
        }
    }

    /// Ancestors from nearest to the base type
    pub fn ancestors(self) -> impl Iterator<Item = Self> {
        std::iter::successors(self.parent(), |t| t.parent())
    }

    /// This type followed by its ancestors
    pub fn lineage(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |t| t.parent())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<EventType> for String {
    fn from(event: EventType) -> Self {
        event.as_str().to_string()
    }
}
