//! Contract of the third-party dashboard widget

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Weak;
use std::time::Duration;

use crate::machine::{EmbedMachine, WidgetEvent};
use crate::TIMEOUT_MESSAGE;

/// Error payload passed to `on_error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetErrorInfo {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl WidgetErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: Some(message.into()),
        }
    }

    pub fn kind(&self) -> WidgetErrorKind {
        self.code
            .as_deref()
            .map(WidgetErrorKind::from_code)
            .unwrap_or(WidgetErrorKind::Generic)
    }

    /// Text shown in the embed error banner
    pub fn user_message(&self) -> String {
        match self.kind() {
            WidgetErrorKind::Auth => {
                "Authentication failed. Your session may have expired; please log in again."
                    .to_string()
            }
            WidgetErrorKind::Timeout => TIMEOUT_MESSAGE.to_string(),
            WidgetErrorKind::IframeLoad => "Failed to load the dashboard iframe".to_string(),
            WidgetErrorKind::Generic => self
                .message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| {
                    "Failed to load the dashboard. Please try again later.".to_string()
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetErrorKind {
    /// Token rejected by the dashboard; fixed by logging in again
    Auth,
    /// The widget gave up waiting for its own content
    Timeout,
    /// The dashboard frame or its network requests failed
    IframeLoad,
    Generic,
}

impl WidgetErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "AUTH_ERROR" | "UNAUTHORIZED" | "INVALID_TOKEN" | "TOKEN_EXPIRED" => {
                WidgetErrorKind::Auth
            }
            "LOAD_TIMEOUT" | "TIMEOUT" => WidgetErrorKind::Timeout,
            "IFRAME_LOAD_ERROR" | "IFRAME_ERROR" | "NETWORK_ERROR" => WidgetErrorKind::IframeLoad,
            _ => WidgetErrorKind::Generic,
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, WidgetErrorKind::Auth)
    }
}

/// Handle the widget uses to report lifecycle events.
///
/// Bound to one initialization run. After the run is torn down or replaced,
/// every call is a no-op.
#[derive(Clone)]
pub struct WidgetCallbacks {
    machine: Weak<Mutex<EmbedMachine>>,
    generation: u64,
}

impl WidgetCallbacks {
    pub(crate) fn new(machine: Weak<Mutex<EmbedMachine>>, generation: u64) -> Self {
        Self {
            machine,
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns whether the event changed controller state.
    pub fn deliver(&self, event: WidgetEvent) -> bool {
        match self.machine.upgrade() {
            Some(machine) => machine.lock().apply(self.generation, event),
            None => false,
        }
    }

    pub fn on_load(&self) -> bool {
        self.deliver(WidgetEvent::Loaded)
    }

    pub fn on_ready(&self) -> bool {
        self.deliver(WidgetEvent::Ready)
    }

    pub fn on_error(&self, error: WidgetErrorInfo) -> bool {
        self.deliver(WidgetEvent::Failed(error))
    }

    pub fn on_navigate(&self, url: impl Into<String>) -> bool {
        self.deliver(WidgetEvent::Navigated(url.into()))
    }
}

impl std::fmt::Debug for WidgetCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetCallbacks")
            .field("generation", &self.generation)
            .finish()
    }
}

/// Configuration handed to [`EmbedWidget::init`].
#[derive(Clone)]
pub struct WidgetConfig {
    pub container_id: String,
    pub token: String,
    pub partner_id: Option<String>,
    pub debug: bool,
    pub timeout: Duration,
    pub callbacks: WidgetCallbacks,
}

impl std::fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("container_id", &self.container_id)
            .field("partner_id", &self.partner_id)
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

/// The dashboard widget registered by the bootstrap script.
///
/// Only `init` is mandatory. The default `destroy` does nothing and the
/// default widget has no native refresh.
pub trait EmbedWidget: Send + Sync {
    /// Start rendering into the container. Lifecycle events are reported
    /// through `config.callbacks`, possibly before this returns.
    fn init(&self, config: WidgetConfig) -> Result<(), WidgetErrorInfo>;

    fn destroy(&self) {}

    fn supports_refresh(&self) -> bool {
        false
    }

    fn refresh(&self) -> Result<(), WidgetErrorInfo> {
        Ok(())
    }

    fn version(&self) -> Option<String> {
        None
    }
}
