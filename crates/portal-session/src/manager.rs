//! Session Manager
//!
//! Owns the session exclusively; the token store is only written through it.
//! One durable write per successful login, one durable delete per logout.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::client::AuthClient;
use crate::login::LoginAttempt;
use crate::session::Session;
use crate::state::SessionState;
use crate::token_store::TokenStore;
use crate::Result;

/// How long the "copied" confirmation stays visible
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

#[derive(Default)]
struct SessionInner {
    session: Option<Session>,
    /// Logins issued but not yet settled
    in_flight: usize,
    /// Most recent submission; cleared on success
    attempt: Option<LoginAttempt>,
    copied_at: Option<Instant>,
}

pub struct SessionManager {
    inner: Arc<RwLock<SessionInner>>,
    token_store: TokenStore,
    client: AuthClient,
    token_tx: Arc<watch::Sender<Option<String>>>,
}

impl SessionManager {
    /// Build a manager and restore any stored token without contacting the server.
    pub fn new(token_store: TokenStore, client: AuthClient) -> Self {
        let session = token_store.load().map(Session::restored);

        if session.is_some() {
            tracing::info!("Restored session from stored token");
        }

        let (token_tx, _) = watch::channel(session.as_ref().map(|s| s.token.clone()));

        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                session,
                ..SessionInner::default()
            })),
            token_store,
            client,
            token_tx: Arc::new(token_tx),
        }
    }

    pub fn state(&self) -> SessionState {
        Self::derive_state(&self.inner.read())
    }

    fn derive_state(inner: &SessionInner) -> SessionState {
        if inner.in_flight > 0 {
            SessionState::Authenticating
        } else if inner.session.is_some() {
            SessionState::Authenticated
        } else if inner.attempt.as_ref().is_some_and(|a| a.error.is_some()) {
            SessionState::AuthFailed
        } else {
            SessionState::Anonymous
        }
    }

    /// Exactly `current_token().is_some()`.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().session.is_some()
    }

    pub fn current_token(&self) -> Option<String> {
        self.inner.read().session.as_ref().map(|s| s.token.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.read().session.clone()
    }

    /// Shortened token for the sidebar card
    pub fn token_preview(&self) -> Option<String> {
        self.inner.read().session.as_ref().map(Session::token_preview)
    }

    pub fn masked_bearer(&self) -> Option<String> {
        self.inner.read().session.as_ref().map(Session::masked_bearer)
    }

    /// Token to put on the clipboard. Starts the copy confirmation.
    pub fn copy_token(&self) -> Option<String> {
        let mut inner = self.inner.write();
        let token = inner.session.as_ref().map(|s| s.token.clone())?;
        inner.copied_at = Some(Instant::now());
        tracing::debug!("Token copied");
        Some(token)
    }

    /// Whether the copy confirmation is still showing.
    pub fn copy_feedback(&self) -> bool {
        self.inner
            .read()
            .copied_at
            .is_some_and(|at| at.elapsed() < COPY_FEEDBACK)
    }

    /// Loading flag and last error for the login dialog.
    pub fn login_attempt(&self) -> Option<LoginAttempt> {
        self.inner.read().attempt.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner
            .read()
            .attempt
            .as_ref()
            .and_then(|a| a.error.clone())
    }

    /// Receiver that observes every token change (login, logout).
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token_tx.subscribe()
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Exchange credentials for a token.
    ///
    /// On failure any previously held token is kept; overlapping calls
    /// settle independently and the last one to settle decides the state.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let mut attempt = LoginAttempt::new(email, password);
        attempt.ensure_present()?;
        attempt.loading = true;

        {
            let mut inner = self.inner.write();
            let from = Self::derive_state(&inner);
            inner.in_flight += 1;
            inner.attempt = Some(attempt.redacted());
            tracing::debug!(from = %from, to = %SessionState::Authenticating, "Session state transition");
        }

        let result = self
            .client
            .exchange(&attempt.email, &attempt.password)
            .await;

        match result {
            Ok(token) => {
                {
                    let mut inner = self.inner.write();
                    inner.in_flight = inner.in_flight.saturating_sub(1);

                    if let Err(e) = self.token_store.save(&token) {
                        // The in-memory session still works until reload
                        tracing::error!(error = %e, "Failed to persist session token");
                    }

                    inner.session = Some(Session::new(token.clone()));
                    inner.attempt = None;
                }

                self.token_tx.send_replace(Some(token));
                tracing::info!(email = %attempt.email, "Logged in");
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                {
                    let mut inner = self.inner.write();
                    inner.in_flight = inner.in_flight.saturating_sub(1);
                    attempt.loading = false;
                    attempt.error = Some(message);
                    inner.attempt = Some(attempt.redacted());
                }

                tracing::warn!(email = %attempt.email, error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// Drop the token locally. No network call.
    pub fn logout(&self) {
        {
            let mut inner = self.inner.write();
            inner.session = None;
            inner.attempt = None;
            inner.copied_at = None;
        }

        if let Err(e) = self.token_store.clear() {
            tracing::error!(error = %e, "Failed to clear stored token");
        }

        self.token_tx.send_replace(None);
        tracing::info!("Logged out");
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token_store: self.token_store.clone(),
            client: self.client.clone(),
            token_tx: Arc::clone(&self.token_tx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use portal_storage::Database;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn manager_for(server_url: String) -> (SessionManager, TokenStore) {
        let store = TokenStore::new(Database::open_in_memory().unwrap());
        let manager = SessionManager::new(store.clone(), AuthClient::new(server_url));
        (manager, store)
    }

    async fn mock_success(server: &mut mockito::ServerGuard, token: &str) -> mockito::Mock {
        server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"access_token": "{}"}}"#, token))
            .create_async()
            .await
    }

    async fn mock_never_called(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body(r#"{"access_token": "never"}"#)
            .expect(0)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut server = mockito::Server::new_async().await;
        mock_success(&mut server, "abc.def.ghi").await;

        let (manager, store) = manager_for(server.url());
        assert_eq!(manager.state(), SessionState::Anonymous);

        manager.login("dev@example.com", "secret123").await.unwrap();

        assert_eq!(manager.state(), SessionState::Authenticated);
        assert!(manager.is_authenticated());
        assert_eq!(manager.current_token().as_deref(), Some("abc.def.ghi"));
        assert_eq!(store.load().as_deref(), Some("abc.def.ghi"));
        assert!(manager.login_attempt().is_none());
        assert_eq!(manager.token_preview().as_deref(), Some("abc.def.ghi..."));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_body(r#"{"message": "Invalid credentials"}"#)
            .create_async()
            .await;

        let (manager, store) = manager_for(server.url());
        let err = manager.login("dev@example.com", "wrong-password").await.unwrap_err();

        assert!(matches!(err, SessionError::Rejected { status: 401, .. }));
        assert_eq!(manager.state(), SessionState::AuthFailed);
        assert_eq!(manager.current_token(), None);
        assert!(!manager.is_authenticated());
        assert_eq!(store.load(), None);

        let attempt = manager.login_attempt().unwrap();
        assert!(!attempt.loading);
        assert!(!attempt.error.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_relogin_keeps_prior_token() {
        let mut server = mockito::Server::new_async().await;
        let ok = mock_success(&mut server, "first-token").await;

        let (manager, store) = manager_for(server.url());
        manager.login("dev@example.com", "secret123").await.unwrap();
        ok.remove_async().await;

        server
            .mock("POST", "/auth/login")
            .with_status(500)
            .create_async()
            .await;

        assert!(manager.login("dev@example.com", "secret123").await.is_err());
        assert_eq!(manager.current_token().as_deref(), Some("first-token"));
        assert_eq!(manager.state(), SessionState::Authenticated);
        assert!(manager.last_error().is_some());
        assert_eq!(store.load().as_deref(), Some("first-token"));
    }

    #[tokio::test]
    async fn test_network_error_fails_login() {
        // Nothing listens on port 9 on the loopback interface
        let (manager, _) = manager_for("http://127.0.0.1:9".to_string());

        let err = manager.login("dev@example.com", "secret123").await.unwrap_err();
        assert!(matches!(err, SessionError::Network(_)));
        assert_eq!(manager.state(), SessionState::AuthFailed);
        assert_eq!(manager.current_token(), None);
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_never_called(&mut server).await;

        let (manager, _) = manager_for(server.url());
        let err = manager.login("", "secret123").await.unwrap_err();

        assert!(matches!(err, SessionError::MissingCredentials));
        assert_eq!(manager.state(), SessionState::Anonymous);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_logout_clears_store() {
        let mut server = mockito::Server::new_async().await;
        mock_success(&mut server, "abc.def.ghi").await;

        let (manager, store) = manager_for(server.url());
        manager.login("dev@example.com", "secret123").await.unwrap();
        manager.logout();

        assert_eq!(manager.state(), SessionState::Anonymous);
        assert_eq!(manager.current_token(), None);
        assert_eq!(store.load(), None);
    }

    #[tokio::test]
    async fn test_restore_without_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_never_called(&mut server).await;

        let store = TokenStore::new(Database::open_in_memory().unwrap());
        store.save("stored.token.value").unwrap();

        // Simulates a page reload
        let manager = SessionManager::new(store, AuthClient::new(server.url()));

        assert_eq!(manager.state(), SessionState::Authenticated);
        assert_eq!(manager.current_token().as_deref(), Some("stored.token.value"));
        assert!(manager.session().unwrap().restored);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_works_without_storage() {
        let mut server = mockito::Server::new_async().await;
        mock_success(&mut server, "memory-only").await;

        let manager = SessionManager::new(TokenStore::unavailable(), AuthClient::new(server.url()));
        manager.login("dev@example.com", "secret123").await.unwrap();
        assert_eq!(manager.current_token().as_deref(), Some("memory-only"));

        manager.logout();
        assert_eq!(manager.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_subscribers_see_token_changes() {
        let mut server = mockito::Server::new_async().await;
        mock_success(&mut server, "abc.def.ghi").await;

        let (manager, _) = manager_for(server.url());
        let mut rx = manager.subscribe();
        assert_eq!(*rx.borrow_and_update(), None);

        manager.login("dev@example.com", "secret123").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("abc.def.ghi"));

        manager.logout();
        assert_eq!(rx.borrow_and_update().as_deref(), None);
    }

    /// Auth endpoint that answers `slow@` logins after `delay` and others at once.
    async fn spawn_staggered_auth_server(delay: Duration) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut len = 0;
                    loop {
                        let n = socket.read(&mut buf[len..]).await.unwrap_or(0);
                        len += n;
                        let text = String::from_utf8_lossy(&buf[..len]);
                        if n == 0 || (text.contains("\r\n\r\n") && text.trim_end().ends_with('}')) {
                            break;
                        }
                    }

                    let request = String::from_utf8_lossy(&buf[..len]).to_string();
                    let token = if request.contains("slow@") {
                        tokio::time::sleep(delay).await;
                        "slow-token"
                    } else {
                        "fast-token"
                    };

                    let body = format!(r#"{{"access_token": "{}"}}"#, token);
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_last_settling_login_wins() {
        let url = spawn_staggered_auth_server(Duration::from_millis(300)).await;
        let (manager, store) = manager_for(url);
        let mut tokens = manager.subscribe();

        // The slow login is issued first but settles last
        let (slow, fast) = tokio::join!(
            manager.login("slow@example.com", "secret123"),
            manager.login("fast@example.com", "secret123"),
        );

        assert!(slow.is_ok());
        assert!(fast.is_ok());
        assert_eq!(manager.current_token().as_deref(), Some("slow-token"));
        assert_eq!(store.load().as_deref(), Some("slow-token"));
        assert_eq!(manager.state(), SessionState::Authenticated);
        assert_eq!(tokens.borrow_and_update().as_deref(), Some("slow-token"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_feedback_resets() {
        let store = TokenStore::new(Database::open_in_memory().unwrap());
        store.save("stored.token.value").unwrap();
        let manager = SessionManager::new(store, AuthClient::new("http://127.0.0.1:9"));

        assert!(!manager.copy_feedback());
        assert_eq!(manager.copy_token().as_deref(), Some("stored.token.value"));
        assert!(manager.copy_feedback());

        tokio::time::sleep(COPY_FEEDBACK + Duration::from_millis(1)).await;
        assert!(!manager.copy_feedback());

        manager.copy_token();
        manager.logout();
        assert!(!manager.copy_feedback());
        assert_eq!(manager.copy_token(), None);
    }

    #[tokio::test]
    async fn test_overlapping_logins_settle_independently() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({"password": "secret123"})))
            .with_status(200)
            .with_body(r#"{"access_token": "good-token"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/auth/login")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({"password": "wrong-one"})))
            .with_status(401)
            .create_async()
            .await;

        let (manager, _) = manager_for(server.url());
        let (good, bad) = tokio::join!(
            manager.login("dev@example.com", "secret123"),
            manager.login("dev@example.com", "wrong-one"),
        );

        assert!(good.is_ok());
        assert!(bad.is_err());
        // Whichever settled last, the good token is never discarded by a failure
        assert_eq!(manager.current_token().as_deref(), Some("good-token"));
        assert_eq!(manager.state(), SessionState::Authenticated);
    }
}
