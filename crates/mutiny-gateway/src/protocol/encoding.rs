//! Frame encoding
//!
//! JSON travels in text frames, MessagePack in binary frames. The format is fixed
//! per connection through the `format` query parameter.

use mutiny_common::WireFormat;
use serde::Serialize;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

/// Frame encoding errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),
}

/// Encode an outbound value into a frame of the configured format
pub fn encode<T: Serialize>(format: WireFormat, value: &T) -> Result<Message, FrameError> {
    Ok(match format {
        WireFormat::Json => Message::Text(serde_json::to_string(value)?),
        WireFormat::MessagePack => Message::Binary(rmp_serde::to_vec_named(value)?),
    })
}

pub fn decode_text(text: &str) -> Result<Value, FrameError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_binary(bytes: &[u8]) -> Result<Value, FrameError> {
    Ok(rmp_serde::from_slice(bytes)?)
}
