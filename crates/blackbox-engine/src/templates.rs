//! Dashboard templates: named snapshots of a whole board.
//!
//! # Architecture
//!
//! - [`TemplatePreset`]: serializable snapshot plus name and bookkeeping
//! - [`TemplateService`]: CRUD, import/export, and apply
//! - Built-in templates (always available, read-only)
//!
//! The service never touches engine internals: it reads the board through
//! [`DashboardEngine::export_snapshot`] and writes it back with
//! [`DashboardEngine::replace_state`], so applying a template is exactly one
//! undoable step.

use blackbox_core::ids::generate_unique_id;
use blackbox_core::models::{DashboardSnapshot, DashboardState, Geometry, WidgetInstance, WidgetKind};
use blackbox_core::timestamps::now_millis;
use blackbox_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::DashboardEngine;
use crate::navigation::NavigationSink;

pub const MINIMAL_TEMPLATE_ID: &str = "template_minimal";
pub const DEVELOPER_TEMPLATE_ID: &str = "template_dev";
pub const INBOX_TEMPLATE_ID: &str = "template_inbox";

const TEMPLATE_ID_PREFIX: &str = "tpl";
const COPY_SUFFIX: &str = " (Copy)";

// ── Template preset ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreset {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
    /// Built-in templates are read-only.
    #[serde(default)]
    pub is_default: bool,
    pub snapshot: DashboardSnapshot,
}

impl TemplatePreset {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, snapshot: DashboardSnapshot) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            is_default: false,
            snapshot,
        }
    }

    /// Mark as built-in.
    #[must_use]
    pub const fn as_builtin(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Touch the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

// ── Built-in templates ──────────────────────────────────────────────────

fn snapshot_of(widgets: &[(&str, WidgetKind, [f64; 4])]) -> DashboardSnapshot {
    let mut state = DashboardState::default();
    for (z, (id, kind, [x, y, w, h])) in (1_i64..).zip(widgets) {
        let mut instance =
            WidgetInstance::new((*id).into(), *kind, Geometry::new(*x, *y, *w, *h), 0);
        instance.z_index = z;
        state.layout.push(instance.instance_id.clone());
        state.instances.insert(instance.instance_id.clone(), instance);
    }
    DashboardSnapshot::from_state(&state)
}

fn builtin(id: &str, name: &str, snapshot: DashboardSnapshot) -> TemplatePreset {
    TemplatePreset {
        id: id.to_string(),
        name: name.to_string(),
        created_at: 0,
        updated_at: 0,
        is_default: false,
        snapshot,
    }
    .as_builtin()
}

/// Clock, to-dos and links: the bare essentials.
#[must_use]
pub fn builtin_minimal() -> TemplatePreset {
    builtin(
        MINIMAL_TEMPLATE_ID,
        "Minimalist Focus",
        snapshot_of(&[
            ("clock_min", WidgetKind::QuoteClock, [20.0, 20.0, 360.0, 260.0]),
            ("todo_min", WidgetKind::Todo, [400.0, 20.0, 360.0, 400.0]),
            ("links_min", WidgetKind::QuickLinks, [20.0, 300.0, 360.0, 200.0]),
        ]),
    )
}

/// GitHub activity and projects up front.
#[must_use]
pub fn builtin_developer() -> TemplatePreset {
    builtin(
        DEVELOPER_TEMPLATE_ID,
        "Developer Station",
        snapshot_of(&[
            ("github_dev", WidgetKind::Github, [20.0, 20.0, 360.0, 300.0]),
            ("projects_dev", WidgetKind::ProjectsOverview, [400.0, 20.0, 740.0, 300.0]),
            ("todo_dev", WidgetKind::Todo, [20.0, 340.0, 360.0, 400.0]),
            ("clock_dev", WidgetKind::QuoteClock, [400.0, 340.0, 360.0, 260.0]),
        ]),
    )
}

/// A wide mailbox with to-dos alongside.
#[must_use]
pub fn builtin_inbox() -> TemplatePreset {
    builtin(
        INBOX_TEMPLATE_ID,
        "Inbox Zero",
        snapshot_of(&[
            ("gmail_main", WidgetKind::Gmail, [20.0, 20.0, 740.0, 500.0]),
            ("todo_side", WidgetKind::Todo, [780.0, 20.0, 360.0, 500.0]),
            ("calendar_widget", WidgetKind::QuoteClock, [20.0, 540.0, 360.0, 260.0]),
        ]),
    )
}

/// Returns all built-in templates.
#[must_use]
pub fn all_builtins() -> Vec<TemplatePreset> {
    vec![builtin_minimal(), builtin_developer(), builtin_inbox()]
}

// ── Template service ────────────────────────────────────────────────────

/// Owns the user templates; built-ins are always available alongside them.
#[derive(Debug, Clone)]
pub struct TemplateService {
    builtins: Vec<TemplatePreset>,
    templates: Vec<TemplatePreset>,
    revision: u64,
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TemplateService {
    /// A service holding `templates` (typically loaded from disk).
    ///
    /// Entries flagged as built-in or colliding with a built-in id are dropped.
    #[must_use]
    pub fn new(templates: Vec<TemplatePreset>) -> Self {
        let builtins = all_builtins();
        let templates = templates
            .into_iter()
            .filter(|t| !t.is_default && !builtins.iter().any(|b| b.id == t.id))
            .collect();
        Self {
            builtins,
            templates,
            revision: 0,
        }
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Built-ins first, then user templates in creation order.
    pub fn list(&self) -> impl Iterator<Item = &TemplatePreset> {
        self.builtins.iter().chain(&self.templates)
    }

    #[must_use]
    pub fn user_templates(&self) -> &[TemplatePreset] {
        &self.templates
    }

    /// Look up a template, preferring user templates over built-ins.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TemplatePreset> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .or_else(|| self.builtins.iter().find(|t| t.id == id))
    }

    fn is_builtin(&self, id: &str) -> bool {
        self.builtins.iter().any(|t| t.id == id)
    }

    fn user_index(&self, id: &str) -> Result<usize> {
        if self.is_builtin(id) {
            return Err(Error::BuiltinTemplate(id.to_string()));
        }
        self.templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::TemplateNotFound(id.to_string()))
    }

    fn fresh_id(&self) -> String {
        generate_unique_id(TEMPLATE_ID_PREFIX, |candidate| self.get(candidate).is_some())
    }

    fn push(&mut self, template: TemplatePreset) {
        self.templates.push(template);
        self.revision += 1;
    }

    // ── Capture and apply ───────────────────────────────────────────────

    /// Snapshot of the board plus the active tab.
    #[must_use]
    pub fn capture(engine: &DashboardEngine, navigation: &dyn NavigationSink) -> DashboardSnapshot {
        engine
            .export_snapshot()
            .with_active_tab(Some(navigation.active_tab()))
    }

    /// Save the current board as a new template; returns its id.
    pub fn create_from_current(
        &mut self,
        name: &str,
        engine: &DashboardEngine,
        navigation: &dyn NavigationSink,
    ) -> Result<String> {
        let name = validate_name(name)?;
        let template = TemplatePreset::new(self.fresh_id(), name, Self::capture(engine, navigation));
        let id = template.id.clone();
        tracing::info!(template = %id, name, instances = template.snapshot.instances.len(), "template created");
        self.push(template);
        Ok(id)
    }

    /// Replace the board with a template's snapshot, then restore its tab.
    ///
    /// The tab is only restored once the board replacement succeeded.
    pub fn apply_template(
        &self,
        id: &str,
        engine: &mut DashboardEngine,
        navigation: &mut dyn NavigationSink,
    ) -> Result<()> {
        let template = self
            .get(id)
            .ok_or_else(|| Error::TemplateNotFound(id.to_string()))?;
        engine.replace_state(template.snapshot.to_state())?;
        if let Some(tab) = template.snapshot.active_tab {
            navigation.restore_tab(tab);
        }
        tracing::info!(template = id, name = %template.name, "template applied");
        Ok(())
    }

    // ── CRUD ────────────────────────────────────────────────────────────

    /// Copy any template (built-ins included) as a new user template.
    pub fn duplicate_template(&mut self, id: &str) -> Result<String> {
        let source = self
            .get(id)
            .ok_or_else(|| Error::TemplateNotFound(id.to_string()))?;
        let copy = TemplatePreset::new(
            self.fresh_id(),
            format!("{}{COPY_SUFFIX}", source.name),
            source.snapshot.clone(),
        );
        let copy_id = copy.id.clone();
        self.push(copy);
        Ok(copy_id)
    }

    pub fn delete_template(&mut self, id: &str) -> Result<()> {
        let index = self.user_index(id)?;
        self.templates.remove(index);
        self.revision += 1;
        tracing::info!(template = id, "template deleted");
        Ok(())
    }

    pub fn rename_template(&mut self, id: &str, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let index = self.user_index(id)?;
        let template = &mut self.templates[index];
        name.clone_into(&mut template.name);
        template.touch();
        self.revision += 1;
        Ok(())
    }

    /// Drop every user template; returns how many were removed.
    pub fn reset_templates(&mut self) -> usize {
        let removed = self.templates.len();
        if removed > 0 {
            self.templates.clear();
            self.revision += 1;
            tracing::info!(removed, "user templates reset");
        }
        removed
    }

    // ── Import / export ─────────────────────────────────────────────────

    /// User templates as a pretty JSON array.
    pub fn export_templates(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.templates)?)
    }

    /// [`try_import_templates`](Self::try_import_templates) reduced to success/failure.
    pub fn import_templates(&mut self, json: &str) -> bool {
        match self.try_import_templates(json) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "template import rejected");
                false
            }
        }
    }

    /// Import a JSON array of templates, all or nothing.
    ///
    /// Every element needs a non-empty `id` and `name` and a `snapshot` that
    /// describes a valid board. Imported templates get fresh ids and are never
    /// built-in. Returns the number imported.
    pub fn try_import_templates(&mut self, json: &str) -> Result<usize> {
        let parsed: Value = serde_json::from_str(json)
            .map_err(|e| Error::ImportRejected(format!("not valid JSON: {e}")))?;
        let Value::Array(entries) = parsed else {
            return Err(Error::ImportRejected("expected a JSON array".into()));
        };

        let now = now_millis();
        let mut staged: Vec<TemplatePreset> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let (name, snapshot) = parse_import_entry(index, entry)?;
            let id = generate_unique_id(TEMPLATE_ID_PREFIX, |candidate| {
                self.get(candidate).is_some() || staged.iter().any(|t| t.id == candidate)
            });
            staged.push(TemplatePreset {
                id,
                name,
                created_at: now,
                updated_at: now,
                is_default: false,
                snapshot,
            });
        }

        let count = staged.len();
        if count > 0 {
            self.templates.extend(staged);
            self.revision += 1;
        }
        tracing::info!(count, "templates imported");
        Ok(count)
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(Error::InvalidArgument("template name must not be empty".into()))
    } else {
        Ok(trimmed)
    }
}

fn non_empty_str<'a>(entry: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_import_entry(index: usize, entry: Value) -> Result<(String, DashboardSnapshot)> {
    let reject = |reason: String| Error::ImportRejected(format!("entry {index}: {reason}"));
    let Value::Object(mut fields) = entry else {
        return Err(reject("expected an object".into()));
    };
    if non_empty_str(&fields, "id").is_none() {
        return Err(reject("missing id".into()));
    }
    let name = non_empty_str(&fields, "name")
        .ok_or_else(|| reject("missing name".into()))?
        .to_string();
    let snapshot = match fields.remove("snapshot") {
        Some(value @ Value::Object(_)) => serde_json::from_value::<DashboardSnapshot>(value)
            .map_err(|e| reject(format!("malformed snapshot: {e}")))?,
        _ => return Err(reject("missing snapshot".into())),
    };
    snapshot
        .to_state()
        .validate()
        .map_err(|e| reject(e.to_string()))?;
    Ok((name, snapshot))
}
