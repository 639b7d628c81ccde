//! Login attempts submitted from the login dialog

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::Result;

pub const MIN_PASSWORD_LEN: usize = 6;

/// A login form submission. Lives for one request: a success discards it,
/// a failure keeps it around with `error` set.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub email: String,
    /// Never serialized; dropped once the request is issued
    #[serde(skip)]
    pub password: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl LoginAttempt {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
            loading: false,
            error: None,
        }
    }

    /// Preconditions the session manager itself enforces.
    pub fn ensure_present(&self) -> Result<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        Ok(())
    }

    /// Full form validation, as done by the login dialog before submitting.
    pub fn validate(&self) -> Result<()> {
        self.ensure_present()?;

        if !looks_like_email(&self.email) {
            return Err(SessionError::InvalidEmail);
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SessionError::PasswordTooShort(MIN_PASSWORD_LEN));
        }

        Ok(())
    }

    /// Copy without the password, for keeping in session state.
    pub(crate) fn redacted(&self) -> Self {
        Self {
            email: self.email.clone(),
            password: String::new(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl std::fmt::Debug for LoginAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginAttempt")
            .field("email", &self.email)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
