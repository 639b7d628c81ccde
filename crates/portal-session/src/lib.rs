//! Developer Portal Session Management
//!
//! Owns the authentication state of the portal:
//! - A single bearer token, persisted across reloads by the [`TokenStore`]
//! - Login against the remote credential endpoint, logout without a network call
//! - A restored token is trusted until the first authenticated request proves otherwise
//! - Token changes are broadcast to dependants through [`SessionManager::subscribe`]

mod client;
mod error;
mod login;
mod manager;
mod session;
mod state;
mod token_store;

pub use client::{bearer_header, AuthClient};
pub use error::SessionError;
pub use login::LoginAttempt;
pub use manager::{SessionManager, COPY_FEEDBACK};
pub use session::Session;
pub use state::SessionState;
pub use token_store::{TokenStore, TOKEN_KEY};

pub type Result<T> = std::result::Result<T, SessionError>;
