//! Developer Portal Navigation
//!
//! Tracks which documentation section is showing and whether the sidebar is
//! open. Independent of authentication: an anonymous visitor can browse every
//! enabled section.
//!
//! Sections, in sidebar order:
//! 0. Overview
//! 1. Authentication
//! 2. Embedding
//! 3. API Reference (behind a feature flag)
//! 4. Webhooks (not yet available)

mod error;
mod flags;
mod section;
mod state;

pub use error::NavigationError;
pub use flags::FeatureFlags;
pub use section::DocSection;
pub use state::{Layout, NavigationState};

pub type Result<T> = std::result::Result<T, NavigationError>;
