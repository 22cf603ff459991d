//! Gateway events
//!
//! Inbound messages are decoded into [`Event`], applied to the state store and
//! then handed to the dispatcher.

mod apply;
mod decode;
mod event;
mod event_types;
mod payloads;

pub use apply::{ApplyError, ApplyResult};
pub use decode::{DecodeError, DecodeResult};
pub use event::{Event, EventVariant};
pub use event_types::EventType;
pub use payloads::*;
