//! API configuration served at the API root

use serde::Deserialize;
use serde_json::Value;

/// Node configuration returned by `GET {api_url}/`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfiguration {
    /// Server version
    pub revolt: String,
    #[serde(default)]
    pub features: Features,
    /// Gateway socket URL
    pub ws: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub vapid: Option<String>,
    #[serde(skip)]
    pub(crate) raw: Value,
}

impl ApiConfiguration {
    /// Decode the configuration, keeping the raw document
    pub fn from_value(raw: Value) -> serde_json::Result<Self> {
        let mut configuration: Self = serde_json::from_value(raw.clone())?;
        configuration.raw = raw;
        Ok(configuration)
    }

    pub fn gateway_url(&self) -> &str {
        &self.ws
    }

    /// File server URL, when the node runs one
    pub fn cdn_url(&self) -> Option<&str> {
        self.features.autumn.url.as_deref()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub captcha: CaptchaFeature,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub invite_only: bool,
    /// File server
    #[serde(default)]
    pub autumn: ServiceFeature,
    /// Link embed proxy
    #[serde(default)]
    pub january: ServiceFeature,
    /// Voice server
    #[serde(default)]
    pub voso: VoiceFeature,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptchaFeature {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceFeature {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceFeature {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ws: Option<String>,
}
