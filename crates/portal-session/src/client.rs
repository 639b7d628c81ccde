//! Credential exchange against the remote auth endpoint

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SessionError;
use crate::Result;

const LOGIN_PATH: &str = "/auth/login";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// `Authorization` header value for a bearer token.
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {}", token)
}

#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, LOGIN_PATH)
    }

    /// Exchange credentials for an access token.
    pub async fn exchange(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .http
            .post(self.login_url())
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        if !status.is_success() {
            // The body is optional on failure and may not be JSON at all
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .and_then(|r| r.message);
            return Err(SessionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: LoginResponse = serde_json::from_slice(&body)
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;

        parsed
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SessionError::MalformedResponse("missing access_token".to_string()))
    }
}
