//! Error types for Docent.

pub mod unified;

pub use unified::{DecodeError, ErrorCategory};

use thiserror::Error;

/// Primary error type for all Docent operations.
#[derive(Error, Debug)]
pub enum DocentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DocentError {
    /// Create an API error from a status code and diagnostic message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Configuration(_) => ErrorCategory::Configuration,
            // Api only comes from job creation and stream handshakes.
            Self::Network(_) | Self::Stream(_) | Self::Api { .. } => ErrorCategory::Transport,
            Self::Decode(_) | Self::Serialization(_) => ErrorCategory::Protocol,
            Self::Io(_) | Self::NotFound(_) => ErrorCategory::Storage,
            Self::InvalidState(_) => ErrorCategory::Application,
        }
    }

    /// Whether the user can reasonably try the same operation again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transport | ErrorCategory::Protocol | ErrorCategory::Validation
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DocentError>;
