//! A dashboard workspace bound to a data directory.
//!
//! [`Workspace`] owns the engine, the template service and navigation, loads
//! them from their namespaces on open and writes back only the namespaces
//! whose revision moved since the last save.

use std::path::PathBuf;

use blackbox_core::config::Config;
use blackbox_core::models::DashboardState;
use blackbox_core::timestamps::now_millis;
use blackbox_core::Result;

use crate::engine::{DashboardEngine, EngineConfig};
use crate::navigation::Navigation;
use crate::persist::{
    NamespaceStore, PersistedDashboard, PersistedNavigation, PersistedTemplates, SCHEMA_VERSION,
};
use crate::registry;
use crate::templates::TemplateService;

/// Revisions last written to disk; `None` means the namespace was never saved.
#[derive(Debug, Clone, Copy, Default)]
struct SavedRevisions {
    engine: Option<u64>,
    templates: Option<u64>,
    navigation: Option<u64>,
}

#[derive(Debug)]
pub struct Workspace {
    config: Config,
    store: NamespaceStore,
    engine: DashboardEngine,
    templates: TemplateService,
    navigation: Navigation,
    saved: SavedRevisions,
}

impl Workspace {
    /// Open (or initialize) the workspace in `config.data_dir`.
    ///
    /// A missing or corrupt dashboard starts from the stock layout; missing
    /// templates and navigation start empty and on the dashboard tab.
    pub fn open(config: Config) -> Result<Self> {
        let store = NamespaceStore::open(config.data_dir.clone())?;
        let engine_config = EngineConfig::from(&config);
        let mut saved = SavedRevisions::default();

        let engine = match store.load::<PersistedDashboard>() {
            Some(doc) => {
                saved.engine = Some(0);
                DashboardEngine::from_parts(
                    engine_config,
                    doc.state,
                    doc.history_past,
                    doc.history_future,
                )?
            }
            None => DashboardEngine::with_state(
                engine_config,
                registry::default_state(engine_config.grid_step, now_millis())?,
            )?,
        };

        let templates = match store.load::<PersistedTemplates>() {
            Some(doc) => {
                saved.templates = Some(0);
                TemplateService::new(doc.templates)
            }
            None => TemplateService::default(),
        };

        let navigation = match store.load::<PersistedNavigation>() {
            Some(doc) => {
                saved.navigation = Some(0);
                Navigation::with_active_tab(doc.active_tab)
            }
            None => Navigation::new(),
        };

        tracing::debug!(
            data_dir = %store.root().display(),
            instances = engine.state().len(),
            templates = templates.user_templates().len(),
            "workspace opened"
        );
        Ok(Self {
            config,
            store,
            engine,
            templates,
            navigation,
            saved,
        })
    }

    /// Open `dir` with the remaining settings taken from the environment.
    pub fn open_at(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Config::from_env().with_data_dir(dir))
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn engine(&self) -> &DashboardEngine {
        &self.engine
    }

    pub const fn engine_mut(&mut self) -> &mut DashboardEngine {
        &mut self.engine
    }

    #[must_use]
    pub const fn templates(&self) -> &TemplateService {
        &self.templates
    }

    pub const fn templates_mut(&mut self) -> &mut TemplateService {
        &mut self.templates
    }

    #[must_use]
    pub const fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub const fn navigation_mut(&mut self) -> &mut Navigation {
        &mut self.navigation
    }

    // ── Template shortcuts ──────────────────────────────────────────────

    /// Save the current board (and tab) as a template.
    pub fn create_template(&mut self, name: &str) -> Result<String> {
        self.templates
            .create_from_current(name, &self.engine, &self.navigation)
    }

    /// Apply a template to the board and restore its tab.
    pub fn apply_template(&mut self, id: &str) -> Result<()> {
        self.templates
            .apply_template(id, &mut self.engine, &mut self.navigation)
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Whether any namespace has unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.saved.engine != Some(self.engine.revision())
            || self.saved.templates != Some(self.templates.revision())
            || self.saved.navigation != Some(self.navigation.revision())
    }

    /// Write every namespace that changed; returns how many were written.
    pub fn flush(&mut self) -> Result<usize> {
        let mut written = 0;

        let revision = self.engine.revision();
        if self.saved.engine != Some(revision) {
            let history = self.engine.history();
            self.store.save(&PersistedDashboard {
                version: SCHEMA_VERSION,
                state: self.engine.state().clone(),
                history_past: history.past().cloned().collect::<Vec<DashboardState>>(),
                history_future: history.future().to_vec(),
            })?;
            self.saved.engine = Some(revision);
            written += 1;
        }

        let revision = self.templates.revision();
        if self.saved.templates != Some(revision) {
            self.store.save(&PersistedTemplates {
                version: SCHEMA_VERSION,
                templates: self.templates.user_templates().to_vec(),
            })?;
            self.saved.templates = Some(revision);
            written += 1;
        }

        let revision = self.navigation.revision();
        if self.saved.navigation != Some(revision) {
            self.store.save(&PersistedNavigation {
                version: SCHEMA_VERSION,
                active_tab: self.navigation.active_tab(),
            })?;
            self.saved.navigation = Some(revision);
            written += 1;
        }

        if written > 0 {
            tracing::debug!(written, data_dir = %self.store.root().display(), "workspace flushed");
        }
        Ok(written)
    }
}
