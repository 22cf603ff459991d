//! # mutiny-common
//!
//! Shared utilities including credentials, configuration and telemetry.

pub mod auth;
pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Authentication, AuthenticationKind};
pub use config::{ClientConfig, ConfigError, ReconnectConfig, WireFormat};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
