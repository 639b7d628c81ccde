//! Session State Machine
//!
//! ```text
//! Anonymous ──login──▶ Authenticating ──2xx──▶ Authenticated
//!     ▲                      │                      │
//!     │                      └──failure──▶ AuthFailed
//!     └──────────────── logout ─────────────────────┘
//! ```
//!
//! A token found in storage at startup moves straight to Authenticated.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    /// No token held
    Anonymous,
    /// A credential exchange is in flight
    Authenticating,
    /// A token is held
    Authenticated,
    /// The last exchange failed and no token is held
    AuthFailed,
}

impl SessionState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        match (self, target) {
            // Any state may start a login
            (_, SessionState::Authenticating) => true,
            // Login settles
            (SessionState::Authenticating, SessionState::Authenticated) => true,
            (SessionState::Authenticating, SessionState::AuthFailed) => true,
            // Logout is always allowed
            (_, SessionState::Anonymous) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated => "authenticated",
            SessionState::AuthFailed => "auth-failed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anonymous" => Ok(SessionState::Anonymous),
            "authenticating" => Ok(SessionState::Authenticating),
            "authenticated" => Ok(SessionState::Authenticated),
            "auth-failed" => Ok(SessionState::AuthFailed),
            _ => Err(format!("Unknown session state: {}", s)),
        }
    }
}
