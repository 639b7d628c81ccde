//! Navigation error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Section is not available: {0}")]
    SectionDisabled(String),
}
