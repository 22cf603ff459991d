//! # mutiny-gateway
//!
//! Gateway client: event decoding, state application, listener dispatch and
//! the socket lifecycle.

pub mod backoff;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod protocol;

pub use backoff::{BackoffExhausted, ExponentialBackoff};
pub use connection::{ConnectionState, GatewayConfig, GatewayConnection};
pub use dispatcher::{EventDispatcher, ListenerId, RegistrationError, WaitError};
pub use error::{AuthenticationError, GatewayError, GatewayResult};
pub use events::{Event, EventType, EventVariant};
pub use protocol::ClientCommand;
