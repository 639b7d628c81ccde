//! Portal configuration

use portal_embed::RetryPolicy;
use portal_navigation::FeatureFlags;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

const DEFAULT_AUTH_URL: &str = "https://qapi.vparking.co";
const DEFAULT_DASHBOARD_URL: &str = "http://localhost:3000/embed/dashboard";
const DEFAULT_EMBED_BASE_URL: &str = "https://partner.vparking.co";
const LOCAL_EMBED_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_EMBED_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Base URL of the credential exchange service
    pub auth_base_url: String,
    /// Dashboard page used by the iframe fallback
    pub dashboard_url: String,
    /// Host serving the widget bootstrap script
    pub embed_base_url: String,
    pub embed_timeout_ms: u64,
    pub retry_policy: RetryPolicy,
    pub partner_id: Option<String>,
    /// Forwarded to the widget
    pub debug: bool,
    pub feature_flags: FeatureFlags,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("portal.db"),
            auth_base_url: DEFAULT_AUTH_URL.to_string(),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            embed_base_url: DEFAULT_EMBED_BASE_URL.to_string(),
            embed_timeout_ms: DEFAULT_EMBED_TIMEOUT_MS,
            retry_policy: RetryPolicy::default(),
            partner_id: None,
            debug: false,
            feature_flags: FeatureFlags::default(),
        }
    }

    /// Defaults overridden by `PORTAL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = var("PORTAL_AUTH_URL") {
            config.auth_base_url = url;
        }
        if let Some(url) = var("PORTAL_DASHBOARD_URL") {
            config.dashboard_url = url;
        }
        if let Some(ms) = var("PORTAL_EMBED_TIMEOUT_MS") {
            config.embed_timeout_ms = ms
                .parse()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| CoreError::Config(format!("PORTAL_EMBED_TIMEOUT_MS: {ms}")))?;
        }
        config.partner_id = var("PORTAL_PARTNER_ID");
        config.debug = var("PORTAL_DEBUG").is_some_and(|v| parse_flag(&v));
        config.feature_flags = FeatureFlags::new(
            var("PORTAL_ENABLE_API_REFERENCE").is_some_and(|v| parse_flag(&v)),
            var("PORTAL_HOST"),
        );

        config.embed_base_url = match var("PORTAL_EMBED_BASE_URL") {
            Some(url) => url,
            None if config.is_local() => LOCAL_EMBED_BASE_URL.to_string(),
            None => DEFAULT_EMBED_BASE_URL.to_string(),
        };

        Ok(config)
    }

    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }

    pub fn embed_script_url(&self) -> String {
        format!(
            "{}{}",
            self.embed_base_url.trim_end_matches('/'),
            portal_embed::SCRIPT_PATH
        )
    }

    fn is_local(&self) -> bool {
        self.feature_flags.host.as_deref() == Some("localhost")
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("dev-portal"))
            .unwrap_or_else(|| PathBuf::from(".dev-portal"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
