//! Cache errors - lookups of entities the cache does not hold

use mutiny_core::{Id, ModelError};
use thiserror::Error;

/// State store errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Server not found: {0}")]
    ServerNotFound(Id),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Id),

    #[error("User not found: {0}")]
    UserNotFound(Id),

    #[error("Member {user} not found in server {server}")]
    MemberNotFound { server: Id, user: Id },

    #[error("Role {role} not found in server {server}")]
    RoleNotFound { server: Id, role: Id },

    /// No Ready event has identified the authenticated user yet
    #[error("Authenticated user is not cached")]
    CurrentUserUnknown,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
