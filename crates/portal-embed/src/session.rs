//! Observable state of one embedding view

use serde::{Deserialize, Serialize};

use crate::status::EmbedStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedSession {
    pub status: EmbedStatus,
    pub error_message: Option<String>,
    pub script_loaded: bool,
    /// Idempotency latch: set while a run is in flight, released on error,
    /// retry or teardown
    pub initialized: bool,
}

impl EmbedSession {
    pub fn is_loading(&self) -> bool {
        self.status == EmbedStatus::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.status == EmbedStatus::Success
    }

    /// Message for the error banner, with a generic fallback
    pub fn display_error(&self) -> Option<&str> {
        if self.status != EmbedStatus::Error {
            return None;
        }
        Some(
            self.error_message
                .as_deref()
                .unwrap_or("Failed to load the dashboard. Please try again later."),
        )
    }
}
