//! Session error types

use thiserror::Error;

/// Shown when the auth service gives no better explanation.
pub const GENERIC_LOGIN_FAILURE: &str =
    "Authentication failed. Please check your credentials and try again.";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Credentials rejected (HTTP {status})")]
    Rejected { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed auth response: {0}")]
    MalformedResponse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] portal_storage::StorageError),
}

impl SessionError {
    /// Text suitable for the login dialog.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            SessionError::Network(_) => {
                "Unable to reach the authentication service. Please try again.".to_string()
            }
            SessionError::MissingCredentials
            | SessionError::InvalidEmail
            | SessionError::PasswordTooShort(_) => self.to_string(),
            _ => GENERIC_LOGIN_FAILURE.to_string(),
        }
    }

    /// Whether re-entering credentials can fix this error.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            SessionError::Rejected { status, .. } if *status == 401 || *status == 403
        ) || matches!(
            self,
            SessionError::MissingCredentials
                | SessionError::InvalidEmail
                | SessionError::PasswordTooShort(_)
        )
    }
}
