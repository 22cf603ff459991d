//! Gateway connection settings

use mutiny_common::WireFormat;
use std::time::Duration;

/// Protocol version requested from the gateway
pub const PROTOCOL_VERSION: u32 = 1;

/// Where and how to open the gateway socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base socket URL advertised by the API configuration (`ws`)
    pub url: String,
    pub format: WireFormat,
    pub heartbeat_interval: Duration,
}

impl GatewayConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: WireFormat::default(),
            heartbeat_interval: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Socket URL with the version and format query parameters
    #[must_use]
    pub fn connection_url(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}version={PROTOCOL_VERSION}&format={}",
            self.url,
            self.format.as_query()
        )
    }
}
