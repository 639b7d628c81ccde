//! Developer Portal Storage Layer
//!
//! SQLite-backed key-value persistence for client-side state that must
//! survive a reload (the session credential, view preferences).

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
