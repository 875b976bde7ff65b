//! Inbound messages on the job update stream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Named artifact kinds the agent produces while working.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultType {
    Explanation,
    Concepts,
    Storyboard,
    EnhancedStoryboard,
    GeneratedCode,
    ReviewComments,
}

impl ResultType {
    /// The narrative kind is echoed into the transcript as well as the
    /// artifact bundle.
    pub fn is_narrative(self) -> bool {
        matches!(self, Self::Explanation)
    }
}

/// `status_update` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Backend stage name, e.g. `PROCESSING_EXPLANATION`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusUpdate {
    /// The human-readable line for this update.
    pub fn display_text(&self) -> &str {
        self.message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(&self.status)
    }
}

/// `partial_result` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResult {
    pub result_type: ResultType,
    pub content: String,
}

/// `final_result` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refactored_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manim_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `error` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_message: String,
}

/// One decoded frame, discriminated on the wire by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    StatusUpdate(StatusUpdate),
    PartialResult(PartialResult),
    FinalResult(FinalResult),
    Error(ErrorReport),
}

impl InboundMessage {
    /// Wire name of this message's `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StatusUpdate(_) => "status_update",
            Self::PartialResult(_) => "partial_result",
            Self::FinalResult(_) => "final_result",
            Self::Error(_) => "error",
        }
    }

    /// `final_result` and `error` end the job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FinalResult(_) | Self::Error(_))
    }
}
