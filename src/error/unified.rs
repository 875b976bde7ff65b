//! Error classification and frame decode failures.

use thiserror::Error;

/// Broad error category, mirroring how a failure surfaces to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected locally before any network action.
    Validation,
    /// Job creation, connection open, or abnormal close.
    Transport,
    /// Malformed or unrecognized stream frame.
    Protocol,
    /// Ruled out by the client's own state, e.g. a duplicate upload id.
    /// Agent-reported failures stay in job state and never become errors.
    Application,
    Configuration,
    Storage,
}

/// Why a raw stream frame could not be turned into an inbound message.
///
/// Every variant is a warning: the frame is dropped and the stream stays open.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("frame has no `type` discriminator")]
    MissingType,

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("invalid `{kind}` payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("binary frame is not UTF-8")]
    NotUtf8,
}
