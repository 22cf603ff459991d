//! # mutiny
//!
//! Async chat client. `Client` discovers the API configuration over REST, keeps
//! a gateway session alive, mirrors gateway events into a local cache and
//! fans them out to registered listeners.

mod client;
mod error;

pub use client::Client;
pub use error::{Error, Result};

pub use mutiny_cache::{SharedState, State};
pub use mutiny_common::{
    try_init_tracing, try_init_tracing_with_config, Authentication, ClientConfig, ReconnectConfig,
    TracingConfig, WireFormat,
};
pub use mutiny_core as models;
pub use mutiny_gateway::{events, ConnectionState, ListenerId};
pub use mutiny_rest::ApiConfiguration;
