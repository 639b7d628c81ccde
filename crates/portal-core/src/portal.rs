//! Portal state container
//!
//! One instance per view tree. Owns the session, navigation and embed
//! components and forwards token changes from the session to the embed.

use parking_lot::RwLock;
use std::sync::Arc;

use portal_embed::{
    iframe_url, EmbedConfig, EmbedController, EmbedSnippet, EmbedWidget, HttpScriptLoader,
    InitOptions, InitOutcome, ScriptLoader,
};
use portal_navigation::{DocSection, Layout, NavigationState};
use portal_session::{bearer_header, AuthClient, SessionManager, SessionState, TokenStore};
use portal_storage::Database;

use crate::config::Config;
use crate::Result;

const ACTIVE_SECTION_KEY: &str = "portal.active_section";

pub struct Portal {
    config: Config,
    db: Database,
    session_manager: SessionManager,
    navigation: Arc<RwLock<NavigationState>>,
    embed: EmbedController,
}

impl Portal {
    /// Open the database under the configured path and wire everything up.
    pub fn new(config: Config, widget: Arc<dyn EmbedWidget>) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Ok(Self::with_parts(
            config,
            db,
            widget,
            Arc::new(HttpScriptLoader::new()),
        ))
    }

    pub fn with_parts(
        config: Config,
        db: Database,
        widget: Arc<dyn EmbedWidget>,
        loader: Arc<dyn ScriptLoader>,
    ) -> Self {
        let session_manager = SessionManager::new(
            TokenStore::new(db.clone()),
            AuthClient::new(config.auth_base_url.clone()),
        );
        let navigation = NavigationState::new(config.feature_flags.clone());
        let embed = EmbedController::new(
            widget,
            loader,
            EmbedConfig {
                timeout: config.embed_timeout(),
                retry_policy: config.retry_policy,
            },
        );

        Self {
            config,
            db,
            session_manager,
            navigation: Arc::new(RwLock::new(navigation)),
            embed,
        }
    }

    /// Restore persisted view state.
    pub fn initialize(&self) -> Result<()> {
        if let Some(stored) = self.db.get_setting(ACTIVE_SECTION_KEY)? {
            let restored = stored
                .parse::<DocSection>()
                .and_then(|section| self.navigation.write().select(section));

            if let Err(e) = restored {
                tracing::warn!(section = %stored, error = %e, "Ignoring stored section");
            }
        }

        tracing::info!(
            session_state = %self.session_manager.state(),
            section = %self.navigation.read().active(),
            "Portal initialized"
        );

        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // === Session ===

    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }

    pub fn session_state(&self) -> SessionState {
        self.session_manager.state()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let result = self.session_manager.login(email, password).await;
        self.sync_embed_token();
        Ok(result?)
    }

    pub fn logout(&self) {
        self.session_manager.logout();
        self.sync_embed_token();
    }

    fn sync_embed_token(&self) {
        let token = self.session_manager.current_token();
        self.embed.token_changed(token.as_deref());
    }

    /// Keep the embed in step with logins and logouts made directly on
    /// the session manager. Ends when the session manager is dropped.
    pub fn forward_token_changes(&self) -> tokio::task::JoinHandle<()> {
        let mut tokens = self.session_manager.subscribe();
        let embed = self.embed.clone();

        tokio::spawn(async move {
            while tokens.changed().await.is_ok() {
                let token = tokens.borrow_and_update().clone();
                embed.token_changed(token.as_deref());
            }
        })
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.session_manager
            .current_token()
            .map(|token| bearer_header(&token))
    }

    /// Attach the bearer header when a session exists.
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.authorization_header() {
            Some(header) => request.header(reqwest::header::AUTHORIZATION, header),
            None => request,
        }
    }

    // === Navigation ===

    pub fn navigation(&self) -> NavigationState {
        self.navigation.read().clone()
    }

    pub fn select_section(&self, section: DocSection) -> Result<DocSection> {
        let selected = self.navigation.write().select(section)?;

        if let Err(e) = self.db.set_setting(ACTIVE_SECTION_KEY, selected.as_str()) {
            tracing::warn!(error = %e, "Failed to persist active section");
        }

        Ok(selected)
    }

    pub fn toggle_sidebar(&self) -> bool {
        self.navigation.write().toggle_sidebar()
    }

    pub fn set_layout(&self, layout: Layout) {
        self.navigation.write().set_layout(layout);
    }

    // === Embed ===

    pub fn embed(&self) -> &EmbedController {
        &self.embed
    }

    pub async fn attach_embed_script(&self) -> Result<()> {
        Ok(self
            .embed
            .attach_script(&self.config.embed_script_url())
            .await?)
    }

    /// Start the widget with the current token and configured options.
    pub fn initialize_embed(&self, container_id: &str) -> InitOutcome {
        let token = self.session_manager.current_token();
        let options = InitOptions {
            partner_id: self.config.partner_id.clone(),
            debug: self.config.debug,
            timeout: None,
        };

        self.embed.initialize(container_id, token.as_deref(), options)
    }

    /// Iframe fallback for the current session, if any.
    pub fn iframe_url(&self) -> Result<Option<String>> {
        match self.session_manager.current_token() {
            Some(token) => Ok(Some(iframe_url(&self.config.dashboard_url, &token)?)),
            None => Ok(None),
        }
    }

    pub fn snippet(&self) -> Result<EmbedSnippet> {
        let token = self.session_manager.current_token();
        Ok(EmbedSnippet::new(&self.config.embed_base_url)?.with_token(token.as_deref()))
    }
}

impl Clone for Portal {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            db: self.db.clone(),
            session_manager: self.session_manager.clone(),
            navigation: Arc::clone(&self.navigation),
            embed: self.embed.clone(),
        }
    }
}
