//! Embed error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Failed to load the dashboard script: {0}")]
    ScriptLoad(String),

    #[error("Invalid dashboard URL: {0}")]
    InvalidUrl(String),

    #[error("Nothing to retry")]
    NothingToRetry,
}
