//! Client configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::Authentication;

/// Encoding used for gateway frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// Text frames carrying JSON
    #[default]
    Json,
    /// Binary frames carrying MessagePack
    MessagePack,
}

impl WireFormat {
    /// Value of the `format` query parameter
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::MessagePack => "msgpack",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for WireFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "msgpack" | "messagepack" => Ok(Self::MessagePack),
            other => Err(ConfigError::InvalidValue(
                "MUTINY_GATEWAY_FORMAT",
                other.to_string(),
            )),
        }
    }
}

/// Reconnect policy applied by the client after a connection is lost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    pub enabled: bool,
    /// `None` retries forever
    pub max_attempts: Option<u32>,
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: default_max_attempts(),
            max_delay: default_max_delay(),
        }
    }
}

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub authentication: Authentication,
    pub format: WireFormat,
    pub heartbeat_interval: Duration,
    pub reconnect: ReconnectConfig,
}

// Default value functions
fn default_api_url() -> String {
    "https://api.revolt.chat".to_string()
}

fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(10)
}

#[allow(clippy::unnecessary_wraps)]
fn default_max_attempts() -> Option<u32> {
    Some(5)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(64)
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but credentials
    pub fn new(authentication: Authentication) -> Self {
        Self {
            api_url: default_api_url(),
            authentication,
            format: WireFormat::default(),
            heartbeat_interval: default_heartbeat_interval(),
            reconnect: ReconnectConfig::default(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if credentials are missing, conflicting, or a value fails to parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let authentication = match (
            lookup("MUTINY_BOT_TOKEN"),
            lookup("MUTINY_USER_ID"),
            lookup("MUTINY_SESSION_TOKEN"),
        ) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(ConfigError::ConflictingCredentials)
            }
            (Some(token), None, None) => Authentication::bot(token),
            (None, Some(user_id), Some(session_token)) => {
                Authentication::user(user_id, session_token)
            }
            (None, Some(_), None) => return Err(ConfigError::MissingVar("MUTINY_SESSION_TOKEN")),
            (None, None, _) => return Err(ConfigError::MissingVar("MUTINY_BOT_TOKEN")),
        };

        let format = lookup("MUTINY_GATEWAY_FORMAT")
            .map(|s| s.parse::<WireFormat>())
            .transpose()?
            .unwrap_or_default();

        let heartbeat_interval = lookup("MUTINY_HEARTBEAT_INTERVAL_SECS")
            .map(|s| parse_secs("MUTINY_HEARTBEAT_INTERVAL_SECS", &s))
            .transpose()?
            .unwrap_or_else(default_heartbeat_interval);

        let reconnect = ReconnectConfig {
            enabled: lookup("MUTINY_RECONNECT")
                .map(|s| parse_bool("MUTINY_RECONNECT", &s))
                .transpose()?
                .unwrap_or(true),
            max_attempts: match lookup("MUTINY_RECONNECT_MAX_ATTEMPTS") {
                Some(s) => parse_attempts(&s)?,
                None => default_max_attempts(),
            },
            max_delay: lookup("MUTINY_RECONNECT_MAX_DELAY_SECS")
                .map(|s| parse_secs("MUTINY_RECONNECT_MAX_DELAY_SECS", &s))
                .transpose()?
                .unwrap_or_else(default_max_delay),
        };

        Ok(Self {
            api_url: lookup("MUTINY_API_URL").unwrap_or_else(default_api_url),
            authentication,
            format,
            heartbeat_interval,
            reconnect,
        })
    }
}

fn parse_secs(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 => Ok(Duration::from_secs_f64(secs)),
        _ => Err(ConfigError::InvalidValue(key, value.to_string())),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key, value.to_string())),
    }
}

fn parse_attempts(value: &str) -> Result<Option<u32>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match trimmed.parse::<u32>() {
        Ok(0) => Ok(None),
        Ok(attempts) => Ok(Some(attempts)),
        Err(_) => Err(ConfigError::InvalidValue(
            "MUTINY_RECONNECT_MAX_ATTEMPTS",
            value.to_string(),
        )),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Bot token and user session credentials are mutually exclusive")]
    ConflictingCredentials,
}
