//! Job status state machine values.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle of one agent processing job.
///
/// ```text
/// idle -> initiating -> connecting -> processing -> {completed | failed}
/// ```
///
/// `initiating` can also fall straight to `failed`, and a stream close
/// while `connecting`/`processing` falls back to `idle`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Initiating,
    Connecting,
    Processing,
    Completed,
    Failed,
}

impl AgentStatus {
    /// `completed` or `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// A job request or stream is outstanding.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Initiating | Self::Connecting | Self::Processing)
    }

    /// Whether `start()` may begin a new job from this status.
    pub fn accepts_start(self) -> bool {
        !self.is_in_flight()
    }

    /// Whether the update stream is (or is about to be) live.
    pub fn is_streaming(self) -> bool {
        matches!(self, Self::Connecting | Self::Processing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_settled_statuses_accept_start() {
        let accepting: Vec<_> = [
            AgentStatus::Idle,
            AgentStatus::Initiating,
            AgentStatus::Connecting,
            AgentStatus::Processing,
            AgentStatus::Completed,
            AgentStatus::Failed,
        ]
        .into_iter()
        .filter(|status| status.accepts_start())
        .collect();

        assert_eq!(
            accepting,
            vec![AgentStatus::Idle, AgentStatus::Completed, AgentStatus::Failed]
        );
    }

    #[test]
    fn display_matches_wire_names() {
        assert_eq!(AgentStatus::Processing.to_string(), "processing");
        assert_eq!("failed".parse::<AgentStatus>().unwrap(), AgentStatus::Failed);
    }
}
