//! The decoded event union

use serde_json::Value;

use super::event_types::EventType;
use super::payloads::{
    AuthenticatedEvent, ChannelAckEvent, ChannelCreateEvent, ChannelDeleteEvent,
    ChannelGroupJoinEvent, ChannelGroupLeaveEvent, ChannelStartTypingEvent,
    ChannelStopTypingEvent, ChannelUpdateEvent, ErrorEvent, MessageDeleteEvent, MessageEvent,
    MessageUpdateEvent, PongEvent, ReadyEvent, ServerDeleteEvent, ServerMemberJoinEvent,
    ServerMemberLeaveEvent, ServerMemberUpdateEvent, ServerRoleDeleteEvent, ServerRoleUpdateEvent,
    ServerUpdateEvent, UnknownEvent, UserRelationshipEvent, UserUpdateEvent,
};

/// A decoded inbound event
#[derive(Debug, Clone)]
pub enum Event {
    Error(ErrorEvent),
    Authenticated(AuthenticatedEvent),
    Pong(PongEvent),
    Ready(ReadyEvent),
    Message(MessageEvent),
    MessageUpdate(MessageUpdateEvent),
    MessageDelete(MessageDeleteEvent),
    ChannelCreate(ChannelCreateEvent),
    ChannelUpdate(ChannelUpdateEvent),
    ChannelDelete(ChannelDeleteEvent),
    ChannelGroupJoin(ChannelGroupJoinEvent),
    ChannelGroupLeave(ChannelGroupLeaveEvent),
    ChannelStartTyping(ChannelStartTypingEvent),
    ChannelStopTyping(ChannelStopTypingEvent),
    ChannelAck(ChannelAckEvent),
    ServerUpdate(ServerUpdateEvent),
    ServerDelete(ServerDeleteEvent),
    ServerMemberUpdate(ServerMemberUpdateEvent),
    ServerMemberJoin(ServerMemberJoinEvent),
    ServerMemberLeave(ServerMemberLeaveEvent),
    ServerRoleUpdate(ServerRoleUpdateEvent),
    ServerRoleDelete(ServerRoleDeleteEvent),
    UserUpdate(UserUpdateEvent),
    UserRelationship(UserRelationshipEvent),
    Unknown(UnknownEvent),
}

/// A type listeners can subscribe to: one payload type, or [`Event`] for every event
pub trait EventVariant: Clone + Send + Sync + 'static {
    /// Registry slot this type listens on
    const TYPE: EventType;

    /// Borrow this variant out of a dispatched event
    fn from_event(event: &Event) -> Option<&Self>;
}

impl EventVariant for Event {
    const TYPE: EventType = EventType::Any;

    fn from_event(event: &Event) -> Option<&Self> {
        Some(event)
    }
}

/// Payloads whose raw message is attached after decoding
pub(crate) trait RawPayload {
    fn set_raw(&mut self, raw: Value);
}

macro_rules! event_variants {
    ($($variant:ident => $payload:ident),* $(,)?) => {
        impl Event {
            /// Concrete type of this event
            pub fn event_type(&self) -> EventType {
                match self {
                    $(Self::$variant(_) => EventType::$variant,)*
                }
            }

            /// The message this event was decoded from
            pub fn raw(&self) -> &Value {
                match self {
                    $(Self::$variant(payload) => &payload.raw,)*
                }
            }
        }

        $(
            impl $payload {
                /// The message this event was decoded from
                pub fn raw(&self) -> &Value {
                    &self.raw
                }
            }

            impl RawPayload for $payload {
                fn set_raw(&mut self, raw: Value) {
                    self.raw = raw;
                }
            }

            impl EventVariant for $payload {
                const TYPE: EventType = EventType::$variant;

                fn from_event(event: &Event) -> Option<&Self> {
                    match event {
                        Event::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }
            }

            impl From<$payload> for Event {
                fn from(payload: $payload) -> Self {
                    Self::$variant(payload)
                }
            }
        )*
    };
}

event_variants! {
    Error => ErrorEvent,
    Authenticated => AuthenticatedEvent,
    Pong => PongEvent,
    Ready => ReadyEvent,
    Message => MessageEvent,
    MessageUpdate => MessageUpdateEvent,
    MessageDelete => MessageDeleteEvent,
    ChannelCreate => ChannelCreateEvent,
    ChannelUpdate => ChannelUpdateEvent,
    ChannelDelete => ChannelDeleteEvent,
    ChannelGroupJoin => ChannelGroupJoinEvent,
    ChannelGroupLeave => ChannelGroupLeaveEvent,
    ChannelStartTyping => ChannelStartTypingEvent,
    ChannelStopTyping => ChannelStopTypingEvent,
    ChannelAck => ChannelAckEvent,
    ServerUpdate => ServerUpdateEvent,
    ServerDelete => ServerDeleteEvent,
    ServerMemberUpdate => ServerMemberUpdateEvent,
    ServerMemberJoin => ServerMemberJoinEvent,
    ServerMemberLeave => ServerMemberLeaveEvent,
    ServerRoleUpdate => ServerRoleUpdateEvent,
    ServerRoleDelete => ServerRoleDeleteEvent,
    UserUpdate => UserUpdateEvent,
    UserRelationship => UserRelationshipEvent,
    Unknown => UnknownEvent,
}

impl Event {
    /// Discriminant as received, including unknown ones
    pub fn type_name(&self) -> &str {
        match self {
            Self::Unknown(unknown) => &unknown.type_name,
            other => other.event_type().as_str(),
        }
    }
}
