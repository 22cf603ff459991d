//! Event dispatch
//!
//! Listener registry, concurrent fan-out, and one-shot waits.

mod dispatcher;
mod listener;
mod wait;

pub use dispatcher::EventDispatcher;
pub use listener::{ListenerId, RegistrationError};
pub use wait::WaitError;
