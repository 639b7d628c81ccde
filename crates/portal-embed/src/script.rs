//! Loading the widget bootstrap script

use futures_util::future::BoxFuture;
use std::time::Duration;

use crate::error::EmbedError;
use crate::Result;

const SCRIPT_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches the bootstrap script that registers the widget.
pub trait ScriptLoader: Send + Sync {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Loads the script over HTTP. Anything but a non-empty 2xx body fails.
#[derive(Clone)]
pub struct HttpScriptLoader {
    http: reqwest::Client,
}

impl HttpScriptLoader {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(SCRIPT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self { http }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for HttpScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptLoader for HttpScriptLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let parsed =
                url::Url::parse(url).map_err(|e| EmbedError::InvalidUrl(format!("{url}: {e}")))?;

            let response = self
                .http
                .get(parsed)
                .send()
                .await
                .map_err(|e| EmbedError::ScriptLoad(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(EmbedError::ScriptLoad(format!("HTTP {}", status.as_u16())));
            }

            let body = response
                .text()
                .await
                .map_err(|e| EmbedError::ScriptLoad(e.to_string()))?;

            if body.trim().is_empty() {
                return Err(EmbedError::ScriptLoad("empty script body".to_string()));
            }

            tracing::debug!(url = %url, bytes = body.len(), "Loaded embed script");
            Ok(())
        })
    }
}
