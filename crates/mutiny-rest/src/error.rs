//! REST error types

use reqwest::StatusCode;

/// REST errors
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type RestResult<T> = Result<T, RestError>;
