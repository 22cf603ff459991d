//! Event payloads
//!
//! One struct per inbound event type. Every payload keeps the message it was
//! decoded from in `raw`.

use mutiny_core::{
    Channel, Id, Member, MemberId, Message, RawObject, RelationshipStatus, Server, User,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Server-reported error, e.g. `InvalidSession` during authentication
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEvent {
    #[serde(deserialize_with = "error_id")]
    pub error: String,
    #[serde(skip)]
    pub(crate) raw: Value,
}

/// Authentication accepted
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedEvent {
    #[serde(skip)]
    pub(crate) raw: Value,
}

/// Reply to a Ping, echoing its value
#[derive(Debug, Clone, Deserialize)]
pub struct PongEvent {
    #[serde(default, alias = "time")]
    pub data: Option<Value>,
    #[serde(skip)]
    pub(crate) raw: Value,
}

/// Full state snapshot sent after authentication
#[derive(Debug, Clone)]
pub struct ReadyEvent {
    pub users: Vec<User>,
    pub servers: Vec<Server>,
    pub channels: Vec<Channel>,
    pub members: Vec<Member>,
    pub(crate) raw: Value,
}

/// A new message
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub message: Message,
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageUpdateEvent {
    #[serde(rename = "id")]
    pub message_id: Id,
    #[serde(rename = "channel")]
    pub channel_id: Id,
    #[serde(default)]
    pub data: RawObject,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeleteEvent {
    #[serde(rename = "id")]
    pub message_id: Id,
    #[serde(rename = "channel")]
    pub channel_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

/// A channel became visible to the client
#[derive(Debug, Clone)]
pub struct ChannelCreateEvent {
    pub channel: Channel,
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelUpdateEvent {
    #[serde(rename = "id")]
    pub channel_id: Id,
    #[serde(default)]
    pub data: RawObject,
    #[serde(default, deserialize_with = "one_or_many")]
    pub clear: Vec<String>,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelDeleteEvent {
    #[serde(rename = "id")]
    pub channel_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelGroupJoinEvent {
    #[serde(rename = "id")]
    pub channel_id: Id,
    #[serde(rename = "user")]
    pub user_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelGroupLeaveEvent {
    #[serde(rename = "id")]
    pub channel_id: Id,
    #[serde(rename = "user")]
    pub user_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelStartTypingEvent {
    #[serde(rename = "id")]
    pub channel_id: Id,
    #[serde(rename = "user")]
    pub user_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelStopTypingEvent {
    #[serde(rename = "id")]
    pub channel_id: Id,
    #[serde(rename = "user")]
    pub user_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

/// The current user read a channel up to a message
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelAckEvent {
    #[serde(rename = "id")]
    pub channel_id: Id,
    #[serde(rename = "user")]
    pub user_id: Id,
    pub message_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerUpdateEvent {
    #[serde(rename = "id")]
    pub server_id: Id,
    #[serde(default)]
    pub data: RawObject,
    #[serde(default, deserialize_with = "one_or_many")]
    pub clear: Vec<String>,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerDeleteEvent {
    #[serde(rename = "id")]
    pub server_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerMemberUpdateEvent {
    #[serde(rename = "id")]
    pub member_id: MemberId,
    #[serde(default)]
    pub data: RawObject,
    #[serde(default, deserialize_with = "one_or_many")]
    pub clear: Vec<String>,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerMemberJoinEvent {
    #[serde(rename = "id")]
    pub server_id: Id,
    #[serde(rename = "user")]
    pub user_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

/// A user left, was kicked or was banned
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMemberLeaveEvent {
    #[serde(rename = "id")]
    pub server_id: Id,
    #[serde(rename = "user")]
    pub user_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerRoleUpdateEvent {
    #[serde(rename = "id")]
    pub server_id: Id,
    pub role_id: Id,
    #[serde(default)]
    pub data: RawObject,
    #[serde(default, deserialize_with = "one_or_many")]
    pub clear: Vec<String>,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerRoleDeleteEvent {
    #[serde(rename = "id")]
    pub server_id: Id,
    pub role_id: Id,
    #[serde(skip)]
    pub(crate) raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdateEvent {
    #[serde(rename = "id")]
    pub user_id: Id,
    #[serde(default)]
    pub data: RawObject,
    #[serde(default, deserialize_with = "one_or_many")]
    pub clear: Vec<String>,
    #[serde(skip)]
    pub(crate) raw: Value,
}

/// Relationship between the current user and another user changed
///
/// `self_id` is the current user; `user` may arrive as a bare id or a full user object.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRelationshipEvent {
    #[serde(rename = "id")]
    pub self_id: Id,
    #[serde(rename = "user", deserialize_with = "id_or_object")]
    pub user_id: Id,
    pub status: RelationshipStatus,
    #[serde(skip)]
    pub(crate) raw: Value,
}

/// Event with a discriminant this client does not know; applies nothing
#[derive(Debug, Clone)]
pub struct UnknownEvent {
    pub type_name: String,
    pub(crate) raw: Value,
}

/// `clear` arrives as a single marker or a list of markers
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(marker)) => vec![marker],
        Some(OneOrMany::Many(markers)) => markers,
    })
}

fn error_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorId {
        Plain(String),
        Tagged {
            #[serde(rename = "type")]
            kind: String,
        },
    }

    Ok(match ErrorId::deserialize(deserializer)? {
        ErrorId::Plain(id) | ErrorId::Tagged { kind: id } => id,
    })
}

fn id_or_object<'de, D>(deserializer: D) -> Result<Id, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdOrObject {
        Bare(Id),
        Object {
            #[serde(rename = "_id")]
            id: Id,
        },
    }

    Ok(match IdOrObject::deserialize(deserializer)? {
        IdOrObject::Bare(id) | IdOrObject::Object { id } => id,
    })
}
