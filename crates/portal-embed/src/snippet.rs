//! Embed instructions and the iframe fallback URL

use serde::Serialize;
use url::Url;

use crate::error::EmbedError;
use crate::Result;

pub const SCRIPT_PATH: &str = "/embed/vanguard-embed.js";
pub const DEFAULT_CONTAINER_ID: &str = "vanguard-dashboard";
const TOKEN_PLACEHOLDER: &str = "YOUR_API_TOKEN";

/// Dashboard URL with the embedded flag and token as query parameters.
pub fn iframe_url(dashboard_url: &str, token: &str) -> Result<String> {
    let mut url = Url::parse(dashboard_url)
        .map_err(|e| EmbedError::InvalidUrl(format!("{dashboard_url}: {e}")))?;

    if url.cannot_be_a_base() {
        return Err(EmbedError::InvalidUrl(dashboard_url.to_string()));
    }

    url.query_pairs_mut()
        .append_pair("embedded", "true")
        .append_pair("token", token);

    Ok(url.into())
}

/// The three copy-paste steps shown on the embedding guide.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedSnippet {
    base_url: String,
    container_id: String,
    token: Option<String>,
}

impl EmbedSnippet {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| EmbedError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(EmbedError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            token: None,
        })
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    /// Fill in the reader's own token instead of the placeholder
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty()).map(str::to_string);
        self
    }

    pub fn script_url(&self) -> String {
        format!("{}{}", self.base_url, SCRIPT_PATH)
    }

    pub fn script_tag(&self) -> String {
        format!(r#"<script src="{}"></script>"#, self.script_url())
    }

    pub fn container_tag(&self) -> String {
        format!(r#"<div id="{}"></div>"#, self.container_id)
    }

    pub fn init_call(&self) -> String {
        let token = self.token.as_deref().unwrap_or(TOKEN_PLACEHOLDER);
        format!(
            "VanguardEmbed.init({{\n  container: {},\n  accessToken: {},\n  baseUrl: {}\n}});",
            js_string(&format!("#{}", self.container_id)),
            js_string(token),
            js_string(&self.base_url),
        )
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n\n{}\n\n<script>\n{}\n</script>\n",
            self.script_tag(),
            self.container_tag(),
            self.init_call()
        )
    }
}

fn js_string(value: &str) -> String {
    // JSON string literals are valid JavaScript
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}
