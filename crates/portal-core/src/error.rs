//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] portal_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] portal_session::SessionError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] portal_navigation::NavigationError),

    #[error("Embed error: {0}")]
    Embed(#[from] portal_embed::EmbedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
