//! # mutiny-cache
//!
//! In-memory cache of the entities visible to the connected client.
//!
//! ## Features
//!
//! - **State**: servers, channels and users keyed by id, plus the authenticated user
//! - **Members and roles**: owned by their server, never indexed globally
//! - **SharedState**: cheap-to-clone handle for listeners that read the cache
//!
//! ## Example
//!
//! ```ignore
//! use mutiny_cache::SharedState;
//!
//! let state = SharedState::new();
//!
//! // Listeners only read, and never hold the guard across an await
//! let name = state.read().current_user().map(|user| user.username.clone());
//! ```

pub mod state;

pub use state::{CacheError, CacheResult, SharedState, State};
