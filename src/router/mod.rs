//! Frame decoding for the job update stream.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;
use crate::types::{ErrorReport, FinalResult, InboundMessage, PartialResult, StatusUpdate};

/// Pure decoder from raw frames to [`InboundMessage`]s.
///
/// Decoding never touches job state. Callers log the error and keep
/// reading; one bad frame does not end the stream.
pub struct MessageRouter;

impl MessageRouter {
    /// Decode a text frame.
    pub fn decode(raw: &str) -> Result<InboundMessage, DecodeError> {
        let value: Value = serde_json::from_str(raw).map_err(DecodeError::Malformed)?;
        Self::decode_value(value)
    }

    /// Decode a binary frame carrying UTF-8 JSON.
    pub fn decode_bytes(raw: &[u8]) -> Result<InboundMessage, DecodeError> {
        let text = std::str::from_utf8(raw).map_err(|_| DecodeError::NotUtf8)?;
        Self::decode(text)
    }

    /// Decode an already-parsed payload.
    pub fn decode_value(value: Value) -> Result<InboundMessage, DecodeError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingType)?
            .to_string();

        match kind.as_str() {
            "status_update" => payload::<StatusUpdate>(&kind, value).map(InboundMessage::StatusUpdate),
            "partial_result" => {
                payload::<PartialResult>(&kind, value).map(InboundMessage::PartialResult)
            }
            "final_result" => payload::<FinalResult>(&kind, value).map(InboundMessage::FinalResult),
            "error" => payload::<ErrorReport>(&kind, value).map(InboundMessage::Error),
            _ => Err(DecodeError::UnknownType(kind)),
        }
    }
}

fn payload<T: DeserializeOwned>(kind: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::InvalidPayload {
        kind: kind.to_string(),
        source,
    })
}
