//! # mutiny-rest
//!
//! Minimal REST client: discovers the API configuration (gateway and CDN URLs,
//! feature flags) and sends authenticated requests.

mod client;
mod configuration;
mod error;

pub use client::RestClient;
pub use configuration::{ApiConfiguration, CaptchaFeature, Features, ServiceFeature, VoiceFeature};
pub use error::{RestError, RestResult};
