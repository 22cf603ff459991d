//! Event decoding
//!
//! The `type` field selects a constructor from a static registry. Discriminants
//! missing from the registry decode to [`Event::Unknown`].

use std::collections::HashMap;
use std::sync::LazyLock;

use mutiny_core::{Channel, Member, Message, Model, ModelError, RawObject, Server, User};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::event::{Event, RawPayload};
use super::event_types::EventType;
use super::payloads::{
    AuthenticatedEvent, ChannelAckEvent, ChannelCreateEvent, ChannelDeleteEvent,
    ChannelGroupJoinEvent, ChannelGroupLeaveEvent, ChannelStartTypingEvent,
    ChannelStopTypingEvent, ChannelUpdateEvent, ErrorEvent, MessageDeleteEvent, MessageEvent,
    MessageUpdateEvent, PongEvent, ReadyEvent, ServerDeleteEvent, ServerMemberJoinEvent,
    ServerMemberLeaveEvent, ServerMemberUpdateEvent, ServerRoleDeleteEvent, ServerRoleUpdateEvent,
    ServerUpdateEvent, UnknownEvent, UserRelationshipEvent, UserUpdateEvent,
};

/// Errors while turning a raw message into an [`Event`]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Event payload is not an object")]
    NotAnObject,

    #[error("Event payload has no string `type` field")]
    MissingType,

    #[error("Invalid {event_type} payload: {source}")]
    Payload {
        event_type: EventType,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {event_type} payload: {source}")]
    Model {
        event_type: EventType,
        #[source]
        source: ModelError,
    },
}

/// Result type for event decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

type Constructor = fn(&Value) -> DecodeResult<Event>;

static REGISTRY: LazyLock<HashMap<&'static str, Constructor>> = LazyLock::new(|| {
    let constructors: [(EventType, Constructor); 24] = [
        (EventType::Error, |raw| payload::<ErrorEvent>(EventType::Error, raw)),
        (EventType::Authenticated, |raw| {
            payload::<AuthenticatedEvent>(EventType::Authenticated, raw)
        }),
        (EventType::Pong, |raw| payload::<PongEvent>(EventType::Pong, raw)),
        (EventType::Ready, ready),
        (EventType::Message, message),
        (EventType::MessageUpdate, |raw| {
            payload::<MessageUpdateEvent>(EventType::MessageUpdate, raw)
        }),
        (EventType::MessageDelete, |raw| {
            payload::<MessageDeleteEvent>(EventType::MessageDelete, raw)
        }),
        (EventType::ChannelCreate, channel_create),
        (EventType::ChannelUpdate, |raw| {
            payload::<ChannelUpdateEvent>(EventType::ChannelUpdate, raw)
        }),
        (EventType::ChannelDelete, |raw| {
            payload::<ChannelDeleteEvent>(EventType::ChannelDelete, raw)
        }),
        (EventType::ChannelGroupJoin, |raw| {
            payload::<ChannelGroupJoinEvent>(EventType::ChannelGroupJoin, raw)
        }),
        (EventType::ChannelGroupLeave, |raw| {
            payload::<ChannelGroupLeaveEvent>(EventType::ChannelGroupLeave, raw)
        }),
        (EventType::ChannelStartTyping, |raw| {
            payload::<ChannelStartTypingEvent>(EventType::ChannelStartTyping, raw)
        }),
        (EventType::ChannelStopTyping, |raw| {
            payload::<ChannelStopTypingEvent>(EventType::ChannelStopTyping, raw)
        }),
        (EventType::ChannelAck, |raw| {
            payload::<ChannelAckEvent>(EventType::ChannelAck, raw)
        }),
        (EventType::ServerUpdate, |raw| {
            payload::<ServerUpdateEvent>(EventType::ServerUpdate, raw)
        }),
        (EventType::ServerDelete, |raw| {
            payload::<ServerDeleteEvent>(EventType::ServerDelete, raw)
        }),
        (EventType::ServerMemberUpdate, |raw| {
            payload::<ServerMemberUpdateEvent>(EventType::ServerMemberUpdate, raw)
        }),
        (EventType::ServerMemberJoin, |raw| {
            payload::<ServerMemberJoinEvent>(EventType::ServerMemberJoin, raw)
        }),
        (EventType::ServerMemberLeave, |raw| {
            payload::<ServerMemberLeaveEvent>(EventType::ServerMemberLeave, raw)
        }),
        (EventType::ServerRoleUpdate, |raw| {
            payload::<ServerRoleUpdateEvent>(EventType::ServerRoleUpdate, raw)
        }),
        (EventType::ServerRoleDelete, |raw| {
            payload::<ServerRoleDeleteEvent>(EventType::ServerRoleDelete, raw)
        }),
        (EventType::UserUpdate, |raw| {
            payload::<UserUpdateEvent>(EventType::UserUpdate, raw)
        }),
        (EventType::UserRelationship, |raw| {
            payload::<UserRelationshipEvent>(EventType::UserRelationship, raw)
        }),
    ];

    constructors
        .into_iter()
        .map(|(event_type, constructor)| (event_type.as_str(), constructor))
        .collect()
});

impl Event {
    /// Decode a message already parsed from the wire
    pub fn decode(raw: &Value) -> DecodeResult<Self> {
        let object = raw.as_object().ok_or(DecodeError::NotAnObject)?;
        let type_name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingType)?;

        match REGISTRY.get(type_name) {
            Some(constructor) => constructor(raw),
            None => Ok(Self::Unknown(UnknownEvent {
                type_name: type_name.to_string(),
                raw: raw.clone(),
            })),
        }
    }

    /// Check if a discriminant has a registered constructor
    pub fn is_known_type(type_name: &str) -> bool {
        REGISTRY.contains_key(type_name)
    }
}

fn payload<T>(event_type: EventType, raw: &Value) -> DecodeResult<Event>
where
    T: DeserializeOwned + RawPayload + Into<Event>,
{
    let mut payload: T = serde_json::from_value(raw.clone())
        .map_err(|source| DecodeError::Payload { event_type, source })?;
    payload.set_raw(raw.clone());
    Ok(payload.into())
}

/// Copy of the message without its `type` key, used as an entity payload
fn entity_object(raw: &Value) -> RawObject {
    let mut object = raw.as_object().cloned().unwrap_or_default();
    object.remove("type");
    object
}

fn model_error(event_type: EventType) -> impl Fn(ModelError) -> DecodeError {
    move |source| DecodeError::Model { event_type, source }
}

fn ready(raw: &Value) -> DecodeResult<Event> {
    fn list<T: Model>(raw: &Value, key: &str) -> DecodeResult<Vec<T>> {
        match raw.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .cloned()
                .map(T::from_value)
                .collect::<Result<_, _>>()
                .map_err(model_error(EventType::Ready)),
            Some(_) => Err(DecodeError::Model {
                event_type: EventType::Ready,
                source: ModelError::InvalidValue {
                    field: "Ready",
                    reason: format!("`{key}` is not a list"),
                },
            }),
        }
    }

    Ok(Event::Ready(ReadyEvent {
        users: list::<User>(raw, "users")?,
        servers: list::<Server>(raw, "servers")?,
        channels: list::<Channel>(raw, "channels")?,
        members: list::<Member>(raw, "members")?,
        raw: raw.clone(),
    }))
}

fn message(raw: &Value) -> DecodeResult<Event> {
    let message: Message = serde_json::from_value(Value::Object(entity_object(raw)))
        .map_err(|source| DecodeError::Payload {
            event_type: EventType::Message,
            source,
        })?;
    Ok(Event::Message(MessageEvent {
        message,
        raw: raw.clone(),
    }))
}

fn channel_create(raw: &Value) -> DecodeResult<Event> {
    let channel =
        Channel::from_raw(entity_object(raw)).map_err(model_error(EventType::ChannelCreate))?;
    Ok(Event::ChannelCreate(ChannelCreateEvent {
        channel,
        raw: raw.clone(),
    }))
}
