//! Sidebar and active-section state

use serde::{Deserialize, Serialize};

use crate::error::NavigationError;
use crate::flags::FeatureFlags;
use crate::section::DocSection;
use crate::Result;

/// Compact layouts show the sidebar as an overlay that closes after each pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Wide,
    Compact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationState {
    active: DocSection,
    sidebar_open: bool,
    layout: Layout,
    flags: FeatureFlags,
}

impl NavigationState {
    pub fn new(flags: FeatureFlags) -> Self {
        Self {
            active: DocSection::Overview,
            sidebar_open: true,
            layout: Layout::Wide,
            flags,
        }
    }

    pub fn active(&self) -> DocSection {
        self.active
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Wide layouts always show the sidebar regardless of the open flag.
    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_open || self.layout == Layout::Wide
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    pub fn is_enabled(&self, section: DocSection) -> bool {
        self.flags.is_enabled(section)
    }

    /// Sidebar entries with their enabled flag, in display order
    pub fn sections(&self) -> Vec<(DocSection, bool)> {
        DocSection::ALL
            .iter()
            .map(|s| (*s, self.is_enabled(*s)))
            .collect()
    }

    pub fn select(&mut self, section: DocSection) -> Result<DocSection> {
        if !self.is_enabled(section) {
            return Err(NavigationError::SectionDisabled(section.label().to_string()));
        }

        if self.active != section {
            tracing::debug!(from = %self.active, to = %section, "Section change");
            self.active = section;
        }

        if self.layout == Layout::Compact {
            self.sidebar_open = false;
        }

        Ok(section)
    }

    pub fn select_index(&mut self, index: usize) -> Result<DocSection> {
        let section = DocSection::from_index(index)
            .ok_or_else(|| NavigationError::UnknownSection(index.to_string()))?;
        self.select(section)
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.sidebar_open = open;
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }

    /// Switching to a compact layout starts with the sidebar closed.
    pub fn set_layout(&mut self, layout: Layout) {
        if layout != self.layout && layout == Layout::Compact {
            self.sidebar_open = false;
        }
        self.layout = layout;
    }

    pub fn set_flags(&mut self, flags: FeatureFlags) {
        self.flags = flags;
        if !self.is_enabled(self.active) {
            tracing::info!(section = %self.active, "Active section disabled, returning to overview");
            self.active = DocSection::Overview;
        }
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(FeatureFlags::default())
    }
}
