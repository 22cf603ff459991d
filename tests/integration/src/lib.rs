//! Integration test utilities for the mutiny client
//!
//! Runs an in-process mock of the REST API root and the WebSocket gateway so
//! the client can be exercised end to end.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
