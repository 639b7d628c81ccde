//! Embed status state machine

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedStatus {
    /// Nothing running
    #[default]
    Idle,
    /// Waiting for the widget to call back
    Loading,
    /// Widget reported load/ready
    Success,
    /// Widget error, script failure or timeout
    Error,
}

impl EmbedStatus {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: EmbedStatus) -> bool {
        match (self, target) {
            (EmbedStatus::Idle, EmbedStatus::Loading) => true,
            // Script load failures happen before any run starts
            (EmbedStatus::Idle, EmbedStatus::Error) => true,
            (EmbedStatus::Loading, EmbedStatus::Success) => true,
            (EmbedStatus::Loading, EmbedStatus::Error) => true,
            // Only through retry
            (EmbedStatus::Error, EmbedStatus::Loading) => true,
            // Teardown and token changes
            (_, EmbedStatus::Idle) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, EmbedStatus::Success | EmbedStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedStatus::Idle => "idle",
            EmbedStatus::Loading => "loading",
            EmbedStatus::Success => "success",
            EmbedStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for EmbedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
