//! Navigation tab state.
//!
//! Templates record which tab was active when they were captured and restore
//! it after applying. The template service only sees the [`NavigationSink`]
//! trait, so the engine never depends on navigation.

use blackbox_core::models::TabId;

/// What the template service needs from navigation.
pub trait NavigationSink {
    fn active_tab(&self) -> TabId;

    fn restore_tab(&mut self, tab: TabId);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    active_tab: TabId,
    revision: u64,
}

impl Navigation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_active_tab(tab: TabId) -> Self {
        Self {
            active_tab: tab,
            revision: 0,
        }
    }

    #[must_use]
    pub const fn active_tab(&self) -> TabId {
        self.active_tab
    }

    /// Switch tabs; returns whether the tab changed.
    pub fn set_active_tab(&mut self, tab: TabId) -> bool {
        if self.active_tab == tab {
            return false;
        }
        tracing::debug!(from = %self.active_tab, to = %tab, "switching tab");
        self.active_tab = tab;
        self.revision += 1;
        true
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}

impl NavigationSink for Navigation {
    fn active_tab(&self) -> TabId {
        self.active_tab
    }

    fn restore_tab(&mut self, tab: TabId) {
        self.set_active_tab(tab);
    }
}
