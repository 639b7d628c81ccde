//! Event handling for the embed state machine
//!
//! Callbacks and the timeout timer race to settle the same run. Whichever
//! arrives first decides the outcome; everything after it is ignored.

use tokio::task::JoinHandle;

use crate::controller::InitOptions;
use crate::session::EmbedSession;
use crate::status::EmbedStatus;
use crate::widget::WidgetErrorInfo;
use crate::TIMEOUT_MESSAGE;

/// Events the widget reports through its callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Loaded,
    Ready,
    Failed(WidgetErrorInfo),
    Navigated(String),
}

/// Parameters of the last successful `initialize`, replayed by retry.
#[derive(Debug, Clone)]
pub(crate) struct InitRequest {
    pub container_id: String,
    pub token: String,
    pub options: InitOptions,
}

#[derive(Default)]
pub(crate) struct EmbedMachine {
    pub session: EmbedSession,
    /// Identifies the current run; bumped on every initialize and teardown
    pub generation: u64,
    pub mounted: Option<String>,
    pub script_url: Option<String>,
    pub last_request: Option<InitRequest>,
    pub last_navigation: Option<String>,
    pub timer: Option<JoinHandle<()>>,
    /// Identifies the armed timer; a retry may re-arm within one generation
    pub timer_seq: u64,
}

impl EmbedMachine {
    pub fn transition_to(&mut self, status: EmbedStatus) -> bool {
        let from = self.session.status;
        if !from.can_transition_to(status) {
            tracing::warn!(from = %from, to = %status, "Rejected embed state transition");
            return false;
        }

        if from != status {
            tracing::debug!(
                generation = self.generation,
                from = %from,
                to = %status,
                "Embed state transition"
            );
        }
        self.session.status = status;
        true
    }

    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Record an error and release the latch so a retry can run.
    pub fn fail(&mut self, message: String) {
        self.cancel_timer();
        if self.transition_to(EmbedStatus::Error) {
            self.session.error_message = Some(message);
            self.session.initialized = false;
        }
    }

    /// Back to idle; callbacks bound to the old generation become stale.
    pub fn reset(&mut self) {
        self.cancel_timer();
        self.generation += 1;
        self.transition_to(EmbedStatus::Idle);
        self.session.error_message = None;
        self.session.initialized = false;
        self.last_navigation = None;
    }

    /// Apply an event for `generation`. Returns whether state changed.
    pub fn apply(&mut self, generation: u64, event: WidgetEvent) -> bool {
        if generation != self.generation {
            tracing::debug!(
                event_generation = generation,
                current_generation = self.generation,
                "Ignoring event from a stale embed run"
            );
            return false;
        }

        match event {
            WidgetEvent::Navigated(url) => {
                tracing::info!(url = %url, "Embedded dashboard navigated");
                self.last_navigation = Some(url);
            }
            _ if self.session.status != EmbedStatus::Loading => {
                tracing::debug!(
                    generation,
                    status = %self.session.status,
                    "Ignoring event for a settled embed run"
                );
                return false;
            }
            WidgetEvent::Loaded | WidgetEvent::Ready => {
                self.cancel_timer();
                self.session.error_message = None;
                self.transition_to(EmbedStatus::Success);
                tracing::info!(generation, "Dashboard ready");
            }
            WidgetEvent::Failed(info) => {
                let message = info.user_message();
                tracing::warn!(
                    generation,
                    code = ?info.code,
                    kind = ?info.kind(),
                    detail = ?info.message,
                    "Dashboard reported an error"
                );
                self.fail(message);
            }
        }

        true
    }

    /// Timer expiry. Only the most recently armed timer of the current run counts.
    pub fn expire(&mut self, generation: u64, timer_seq: u64) -> bool {
        if generation != self.generation
            || timer_seq != self.timer_seq
            || self.session.status != EmbedStatus::Loading
        {
            return false;
        }

        // The timer task is the caller; dropping its handle is enough
        self.timer = None;
        tracing::warn!(generation, "Dashboard load timed out");
        self.fail(TIMEOUT_MESSAGE.to_string());
        true
    }
}
