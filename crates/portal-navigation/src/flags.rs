//! Feature flags gating unfinished sections

use serde::{Deserialize, Serialize};

use crate::section::DocSection;

const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Explicit opt-in for the API reference
    pub api_reference: bool,
    /// Host the portal is served from, if known
    pub host: Option<String>,
}

impl FeatureFlags {
    pub fn new(api_reference: bool, host: Option<String>) -> Self {
        Self {
            api_reference,
            host,
        }
    }

    fn is_local_host(&self) -> bool {
        self.host
            .as_deref()
            .is_some_and(|h| LOCAL_HOSTS.contains(&h.trim()))
    }

    /// The API reference ships on local development hosts, or when opted in.
    pub fn api_reference_enabled(&self) -> bool {
        self.api_reference || self.is_local_host()
    }

    pub fn is_enabled(&self, section: DocSection) -> bool {
        match section {
            DocSection::ApiReference => self.api_reference_enabled(),
            DocSection::Webhooks => false,
            _ => true,
        }
    }
}
