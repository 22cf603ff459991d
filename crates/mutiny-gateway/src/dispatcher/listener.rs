//! Listener handles and registration errors

use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

use crate::events::Event;

/// Type-erased listener stored in the registry
pub(crate) type Listener =
    Arc<dyn Fn(Arc<Event>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Handle returned on registration, used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Listener registration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}
