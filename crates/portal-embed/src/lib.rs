//! Developer Portal Dashboard Embedding
//!
//! Drives the lifecycle of the third-party dashboard widget:
//!
//! ```text
//! Idle ──initialize──▶ Loading ──on_load / on_ready──▶ Success
//!  ▲                      │
//!  │                      ├──on_error / timeout──▶ Error ──retry──▶ Loading
//!  └──── destroy / token change / unmount (from any state)
//! ```
//!
//! Widget callbacks are events delivered to the controller through a
//! [`WidgetCallbacks`] handle. Each initialization run has its own
//! generation; events from an older run, or arriving after the run settled,
//! are dropped.

mod controller;
mod error;
mod machine;
mod script;
mod session;
mod snippet;
mod status;
mod widget;

pub use controller::{EmbedConfig, EmbedController, InitOptions, InitOutcome, RetryPolicy};
pub use error::EmbedError;
pub use machine::WidgetEvent;
pub use script::{HttpScriptLoader, ScriptLoader};
pub use session::EmbedSession;
pub use snippet::{iframe_url, EmbedSnippet, DEFAULT_CONTAINER_ID, SCRIPT_PATH};
pub use status::EmbedStatus;
pub use widget::{EmbedWidget, WidgetCallbacks, WidgetConfig, WidgetErrorInfo, WidgetErrorKind};

pub type Result<T> = std::result::Result<T, EmbedError>;

/// Local fallback used when the widget never calls back.
pub const TIMEOUT_MESSAGE: &str = "Dashboard took too long to load. Please try again.";
