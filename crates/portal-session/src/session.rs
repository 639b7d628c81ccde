//! Session data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PREVIEW_PREFIX: usize = 12;
const PREVIEW_SUFFIX: usize = 8;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token issued by the auth service
    pub token: String,
    /// When the token was obtained (or restored)
    pub authenticated_at: DateTime<Utc>,
    /// Whether the token came from storage rather than a login
    pub restored: bool,
}

impl Session {
    pub fn new(token: String) -> Self {
        Self {
            token,
            authenticated_at: Utc::now(),
            restored: false,
        }
    }

    /// Session rebuilt from a stored token, not yet validated by the server
    pub fn restored(token: String) -> Self {
        Self {
            restored: true,
            ..Self::new(token)
        }
    }

    /// Short form for display: the first 12 characters followed by `...`
    pub fn token_preview(&self) -> String {
        let prefix: String = self.token.chars().take(PREVIEW_PREFIX).collect();
        format!("{}...", prefix)
    }

    /// Token with its middle elided, for code samples shown on screen.
    pub fn masked_bearer(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        if chars.len() <= PREVIEW_PREFIX + PREVIEW_SUFFIX {
            return self.token_preview();
        }

        let prefix: String = chars[..PREVIEW_PREFIX].iter().collect();
        let suffix: String = chars[chars.len() - PREVIEW_SUFFIX..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}

// Keep the raw token out of logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token_preview())
            .field("authenticated_at", &self.authenticated_at)
            .field("restored", &self.restored)
            .finish()
    }
}
