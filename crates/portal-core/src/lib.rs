//! Developer Portal Core
//!
//! Composition root for the portal front-end core. Configuration, logging
//! and the [`Portal`] container that wires the token store, session manager,
//! navigation state and embed controller together.

mod config;
mod error;
mod portal;

pub use config::Config;
pub use error::CoreError;
pub use portal::Portal;

// Re-export core components
pub use portal_embed::{
    iframe_url, EmbedConfig, EmbedController, EmbedError, EmbedSession, EmbedSnippet,
    EmbedStatus, EmbedWidget, HttpScriptLoader, InitOptions, InitOutcome, RetryPolicy,
    ScriptLoader, WidgetCallbacks, WidgetConfig, WidgetErrorInfo, WidgetErrorKind,
};
pub use portal_navigation::{DocSection, FeatureFlags, Layout, NavigationError, NavigationState};
pub use portal_session::{
    bearer_header, AuthClient, LoginAttempt, Session, SessionError, SessionManager,
    SessionState, TokenStore,
};
pub use portal_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
