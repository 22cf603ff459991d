//! Model errors - failures while decoding or patching entities

use thiserror::Error;

/// Model layer errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// The payload was not a JSON object
    #[error("Expected an object for {model}, found {found}")]
    NotAnObject { model: &'static str, found: String },

    /// A required field was missing or had the wrong shape
    #[error("Invalid {model} payload: {source}")]
    Decode {
        model: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A value failed a domain check after decoding
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ModelError {
    pub(crate) fn decode(model: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { model, source }
    }

    /// Check if this error came from a missing required field
    pub fn is_missing_field(&self) -> bool {
        match self {
            Self::Decode { source, .. } => source.to_string().starts_with("missing field"),
            _ => false,
        }
    }
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
