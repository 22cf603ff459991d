//! State store module.
//!
//! Holds the cached entities and the mutation primitives used while applying events.

mod error;
mod shared;
mod store;

pub use error::{CacheError, CacheResult};
pub use shared::SharedState;
pub use store::State;
