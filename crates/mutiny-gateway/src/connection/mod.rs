//! Gateway connection
//!
//! Socket lifecycle, authentication handshake and heartbeat.

mod config;
mod connection;
mod heartbeat;
mod outbound;

pub use config::{GatewayConfig, PROTOCOL_VERSION};
pub use connection::{ConnectionState, GatewayConnection};
