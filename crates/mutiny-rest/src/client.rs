//! REST client

use mutiny_common::Authentication;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

use crate::configuration::ApiConfiguration;
use crate::error::{RestError, RestResult};

const USER_AGENT: &str = concat!("mutiny/", env!("CARGO_PKG_VERSION"));

/// Authenticated HTTP client bound to one API base URL
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_url: String,
    authentication: Authentication,
}

impl RestClient {
    pub fn new(api_url: impl Into<String>, authentication: Authentication) -> RestResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            authentication,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in self.authentication.headers() {
            match HeaderValue::from_str(&value) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(HeaderName::from_static(name), value);
                }
                Err(_) => tracing::warn!(
                    header = name,
                    "Skipping credential header with invalid characters"
                ),
            }
        }
        headers
    }

    /// Send an authenticated request to `{api_url}{path}` and decode the JSON body
    ///
    /// Any status other than 200 or 204 is an error. An empty body yields `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> RestResult<Value> {
        let url = format!("{}{path}", self.api_url);
        tracing::debug!(method = %method, url = %url, "REST request");

        let mut request = self.http.request(method, &url).headers(self.auth_headers());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::NO_CONTENT {
            return Err(RestError::Status { status, url });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch the node configuration from the API root
    pub async fn fetch_configuration(&self) -> RestResult<ApiConfiguration> {
        let raw = self.request(Method::GET, "/", None).await?;
        let configuration = ApiConfiguration::from_value(raw)?;

        tracing::info!(
            version = %configuration.revolt,
            gateway_url = %configuration.gateway_url(),
            "Fetched API configuration"
        );

        Ok(configuration)
    }
}
