//! Durable storage for the session credential

use portal_storage::Database;

use crate::Result;

/// Settings key the token is stored under.
pub const TOKEN_KEY: &str = "dev_portal_token";

/// Passive persistence for a single bearer token.
///
/// A store built with [`TokenStore::unavailable`] has no backing medium:
/// writes are no-ops and reads return `None`.
#[derive(Clone)]
pub struct TokenStore {
    db: Option<Database>,
}

impl TokenStore {
    pub fn new(db: Database) -> Self {
        Self { db: Some(db) }
    }

    pub fn unavailable() -> Self {
        Self { db: None }
    }

    pub fn is_available(&self) -> bool {
        self.db.is_some()
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(db) = &self.db {
            db.set_setting(TOKEN_KEY, token)?;
        }
        Ok(())
    }

    /// Read failures are logged and reported as absent.
    pub fn load(&self) -> Option<String> {
        let db = self.db.as_ref()?;
        match db.get_setting(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        if let Some(db) = &self.db {
            db.delete_setting(TOKEN_KEY)?;
        }
        Ok(())
    }
}
