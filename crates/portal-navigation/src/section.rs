//! Documentation sections

use serde::{Deserialize, Serialize};

use crate::error::NavigationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocSection {
    Overview,
    Authentication,
    Embedding,
    ApiReference,
    Webhooks,
}

impl DocSection {
    pub const ALL: [DocSection; 5] = [
        DocSection::Overview,
        DocSection::Authentication,
        DocSection::Embedding,
        DocSection::ApiReference,
        DocSection::Webhooks,
    ];

    /// Position in the sidebar
    pub fn index(&self) -> usize {
        match self {
            DocSection::Overview => 0,
            DocSection::Authentication => 1,
            DocSection::Embedding => 2,
            DocSection::ApiReference => 3,
            DocSection::Webhooks => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocSection::Overview => "Overview",
            DocSection::Authentication => "Authentication",
            DocSection::Embedding => "Embedding",
            DocSection::ApiReference => "API Reference",
            DocSection::Webhooks => "Webhooks",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocSection::Overview => "overview",
            DocSection::Authentication => "authentication",
            DocSection::Embedding => "embedding",
            DocSection::ApiReference => "api-reference",
            DocSection::Webhooks => "webhooks",
        }
    }
}

impl std::fmt::Display for DocSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocSection {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overview" => Ok(DocSection::Overview),
            "authentication" | "auth" => Ok(DocSection::Authentication),
            "embedding" | "embed" => Ok(DocSection::Embedding),
            "api-reference" | "api" => Ok(DocSection::ApiReference),
            "webhooks" => Ok(DocSection::Webhooks),
            _ => Err(NavigationError::UnknownSection(s.to_string())),
        }
    }
}
