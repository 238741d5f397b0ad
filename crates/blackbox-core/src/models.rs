//! Dashboard data model.
//!
//! These types mirror the persisted dashboard document: keys are camelCase
//! (`instanceId`, `zIndex`, `lockedGroups`, ...) so state written by earlier
//! versions of the dashboard loads unchanged.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ── Widget kinds ────────────────────────────────────────────────────────

/// The closed set of widget kinds a canvas can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    QuoteClock,
    Todo,
    HabitTracker,
    Github,
    Weather,
    QuickLinks,
    FocusSummary,
    ProjectsOverview,
    CustomApi,
    Gmail,
    SectionDivider,
    Kanban,
    Insights,
}

impl WidgetKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 13] = [
        Self::QuoteClock,
        Self::Todo,
        Self::HabitTracker,
        Self::Github,
        Self::Weather,
        Self::QuickLinks,
        Self::FocusSummary,
        Self::ProjectsOverview,
        Self::CustomApi,
        Self::Gmail,
        Self::SectionDivider,
        Self::Kanban,
        Self::Insights,
    ];

    /// Wire name (`quote_clock`, `todo`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QuoteClock => "quote_clock",
            Self::Todo => "todo",
            Self::HabitTracker => "habit_tracker",
            Self::Github => "github",
            Self::Weather => "weather",
            Self::QuickLinks => "quick_links",
            Self::FocusSummary => "focus_summary",
            Self::ProjectsOverview => "projects_overview",
            Self::CustomApi => "custom_api",
            Self::Gmail => "gmail",
            Self::SectionDivider => "section_divider",
            Self::Kanban => "kanban",
            Self::Insights => "insights",
        }
    }

    /// Title shown when an instance has none of its own.
    #[must_use]
    pub const fn default_title(self) -> &'static str {
        match self {
            Self::QuoteClock => "Quote & Clock",
            Self::Todo => "To-Do List",
            Self::HabitTracker => "Habit Tracker",
            Self::Github => "GitHub",
            Self::Weather => "Weather",
            Self::QuickLinks => "Quick Links",
            Self::FocusSummary => "Focus Summary",
            Self::ProjectsOverview => "Projects",
            Self::CustomApi => "Custom API",
            Self::Gmail => "Gmail",
            Self::SectionDivider => "Section Divider",
            Self::Kanban => "Kanban Board",
            Self::Insights => "Insights",
        }
    }

    /// Whether more than one instance of this kind may live on a board.
    #[must_use]
    pub const fn allows_multiple(self) -> bool {
        matches!(
            self,
            Self::Weather | Self::CustomApi | Self::Gmail | Self::SectionDivider | Self::Kanban
        )
    }

    /// Smallest `(w, h)` an instance of this kind may be resized to.
    #[must_use]
    pub const fn min_size(self) -> (f64, f64) {
        match self {
            Self::SectionDivider => (40.0, 20.0),
            _ => (40.0, 40.0),
        }
    }

    /// Size used when a widget is added without an explicit geometry.
    #[must_use]
    pub const fn default_size(self) -> (f64, f64) {
        match self {
            Self::Todo | Self::Kanban => (360.0, 400.0),
            Self::Github => (360.0, 300.0),
            Self::ProjectsOverview => (740.0, 300.0),
            Self::Gmail => (740.0, 500.0),
            Self::QuickLinks => (360.0, 200.0),
            Self::SectionDivider => (740.0, 60.0),
            _ => (360.0, 260.0),
        }
    }

    /// Config payload a fresh instance starts with.
    #[must_use]
    pub fn default_config(self) -> Map<String, Value> {
        let mut config = Map::new();
        match self {
            Self::Gmail => {
                for (key, value) in [
                    ("mode", "basic"),
                    ("mailbox", "inbox"),
                    ("status", "all"),
                    ("category", "all"),
                    ("query", ""),
                ] {
                    config.insert(key.to_string(), Value::String(value.to_string()));
                }
            }
            Self::SectionDivider => {
                config.insert("label".to_string(), Value::String("New Section".to_string()));
                config.insert("style".to_string(), Value::String("line".to_string()));
            }
            _ => {}
        }
        config
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| Error::InvalidType(s.to_string()))
    }
}

// ── Geometry ────────────────────────────────────────────────────────────

/// Position and size of an instance in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Geometry {
    #[must_use]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// All four fields finite and the size strictly positive.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.w, self.h].iter().all(|v| v.is_finite())
            && self.w > 0.0
            && self.h > 0.0
    }

    /// Overwrite the fields present in `patch`.
    #[must_use]
    pub fn merged(mut self, patch: &GeometryPatch) -> Self {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(w) = patch.w {
            self.w = w;
        }
        if let Some(h) = patch.h {
            self.h = h;
        }
        self
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.w, self.h)
    }
}

/// Partial geometry update; `None` fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
}

impl GeometryPatch {
    #[must_use]
    pub const fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            w: None,
            h: None,
        }
    }

    #[must_use]
    pub const fn size(w: f64, h: f64) -> Self {
        Self {
            x: None,
            y: None,
            w: Some(w),
            h: Some(h),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.w.is_none() && self.h.is_none()
    }

    /// Reject NaN and infinite fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the first malformed field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("x", self.x), ("y", self.y), ("w", self.w), ("h", self.h)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(Error::InvalidArgument(format!(
                        "geometry field {name} must be finite, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl From<Geometry> for GeometryPatch {
    fn from(g: Geometry) -> Self {
        Self {
            x: Some(g.x),
            y: Some(g.y),
            w: Some(g.w),
            h: Some(g.h),
        }
    }
}

// ── Widget instance ─────────────────────────────────────────────────────

/// Opaque, immutable identifier of a placed widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for InstanceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One placed, configured widget on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInstance {
    pub instance_id: InstanceId,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub config: Map<String, Value>,
    pub layout: Geometry,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub group_disabled: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_expanded_height: Option<f64>,
    /// Widget-owned payload (todo items, sort mode, ...); stored verbatim.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl WidgetInstance {
    /// A fresh, enabled, unlocked instance with the kind's default config.
    #[must_use]
    pub fn new(id: InstanceId, kind: WidgetKind, layout: Geometry, now: i64) -> Self {
        Self {
            instance_id: id,
            kind,
            title: None,
            enabled: true,
            created_at: now,
            updated_at: now,
            config: kind.default_config(),
            layout,
            z_index: 0,
            is_locked: false,
            group_disabled: false,
            is_collapsed: false,
            collapsed_height: None,
            saved_expanded_height: None,
            data: Map::new(),
        }
    }

    /// Display title (own title or the kind default).
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.kind.default_title())
    }
}

// ── Dashboard state ─────────────────────────────────────────────────────

/// The whole dashboard: instances, their traversal order, and lock groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    #[serde(default)]
    pub instances: BTreeMap<InstanceId, WidgetInstance>,
    #[serde(default)]
    pub layout: Vec<InstanceId>,
    #[serde(default)]
    pub locked_groups: BTreeMap<String, bool>,
}

impl DashboardState {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WidgetInstance> {
        self.instances.get(id)
    }

    /// Check the `layout` ⇄ `instances` bijection and per-instance sanity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.layout.len());
        for id in &self.layout {
            if !seen.insert(id.as_str()) {
                return Err(Error::InvalidState(format!(
                    "instance {id} appears more than once in layout"
                )));
            }
            if !self.instances.contains_key(id) {
                return Err(Error::InvalidState(format!(
                    "layout references unknown instance {id}"
                )));
            }
        }
        for (key, instance) in &self.instances {
            if !seen.contains(key.as_str()) {
                return Err(Error::InvalidState(format!(
                    "instance {key} is missing from layout"
                )));
            }
            if &instance.instance_id != key {
                return Err(Error::InvalidState(format!(
                    "instance stored under {key} carries id {}",
                    instance.instance_id
                )));
            }
            if !instance.layout.is_well_formed() {
                return Err(Error::InvalidState(format!(
                    "instance {key} has malformed geometry {}",
                    instance.layout
                )));
            }
        }
        Ok(())
    }

    /// Position of `id` in the traversal order.
    #[must_use]
    pub fn layout_position(&self, id: &str) -> Option<usize> {
        self.layout.iter().position(|candidate| candidate.as_str() == id)
    }

    /// Highest z-index on the board (0 when empty).
    #[must_use]
    pub fn max_z_index(&self) -> i64 {
        self.instances
            .values()
            .map(|instance| instance.z_index)
            .max()
            .unwrap_or(0)
    }
}

/// Partial replacement used by bulk admin flows; `None` keeps the current part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<BTreeMap<InstanceId, WidgetInstance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<InstanceId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_groups: Option<BTreeMap<String, bool>>,
}

impl DashboardStatePatch {
    /// Combine with `current`, taking every part present in the patch.
    #[must_use]
    pub fn apply_to(self, current: &DashboardState) -> DashboardState {
        DashboardState {
            instances: self.instances.unwrap_or_else(|| current.instances.clone()),
            layout: self.layout.unwrap_or_else(|| current.layout.clone()),
            locked_groups: self
                .locked_groups
                .unwrap_or_else(|| current.locked_groups.clone()),
        }
    }
}

// ── Navigation tabs ─────────────────────────────────────────────────────

/// Top-level navigation tabs of the dashboard shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabId {
    #[default]
    Dashboard,
    Projects,
    Focus,
    Calendar,
    Settings,
}

impl TabId {
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Projects,
        Self::Focus,
        Self::Calendar,
        Self::Settings,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Projects => "projects",
            Self::Focus => "focus",
            Self::Calendar => "calendar",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TabId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == needle)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown tab: {s}")))
    }
}

// ── Snapshot ────────────────────────────────────────────────────────────

/// Immutable, self-contained copy of a whole dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub instances: BTreeMap<InstanceId, WidgetInstance>,
    #[serde(default)]
    pub layout: Vec<InstanceId>,
    #[serde(default)]
    pub locked_groups: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<TabId>,
}

impl DashboardSnapshot {
    #[must_use]
    pub fn from_state(state: &DashboardState) -> Self {
        Self {
            instances: state.instances.clone(),
            layout: state.layout.clone(),
            locked_groups: state.locked_groups.clone(),
            active_tab: None,
        }
    }

    #[must_use]
    pub const fn with_active_tab(mut self, tab: Option<TabId>) -> Self {
        self.active_tab = tab;
        self
    }

    /// A fresh deep copy of the dashboard part of the snapshot.
    #[must_use]
    pub fn to_state(&self) -> DashboardState {
        DashboardState {
            instances: self.instances.clone(),
            layout: self.layout.clone(),
            locked_groups: self.locked_groups.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str, kind: WidgetKind) -> WidgetInstance {
        WidgetInstance::new(id.into(), kind, Geometry::new(0.0, 0.0, 100.0, 100.0), 1)
    }

    fn state_of(ids: &[&str]) -> DashboardState {
        let mut state = DashboardState::default();
        for id in ids {
            state
                .instances
                .insert((*id).into(), instance(id, WidgetKind::Todo));
            state.layout.push((*id).into());
        }
        state
    }

    // ── WidgetKind ──────────────────────────────────────────────────

    #[test]
    fn kind_parses_wire_names() {
        for kind in WidgetKind::ALL {
            assert_eq!(kind.as_str().parse::<WidgetKind>().unwrap(), kind);
        }
    }

    #[test]
    fn kind_rejects_unknown() {
        let err = "spreadsheet".parse::<WidgetKind>().unwrap_err();
        assert_eq!(err.error_type(), "INVALID_TYPE");
    }

    #[test]
    fn kind_serde_matches_as_str() {
        for kind in WidgetKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn min_sizes_are_non_zero() {
        for kind in WidgetKind::ALL {
            let (w, h) = kind.min_size();
            assert!(w > 0.0 && h > 0.0, "{kind}");
            let (dw, dh) = kind.default_size();
            assert!(dw >= w && dh >= h, "{kind}");
        }
    }

    #[test]
    fn gmail_default_config_has_mailbox() {
        let config = WidgetKind::Gmail.default_config();
        assert_eq!(config.get("mailbox"), Some(&Value::String("inbox".into())));
        assert!(WidgetKind::Todo.default_config().is_empty());
    }

    // ── Geometry ────────────────────────────────────────────────────

    #[test]
    fn geometry_merge_only_touches_present_fields() {
        let g = Geometry::new(1.0, 2.0, 3.0, 4.0);
        let merged = g.merged(&GeometryPatch::position(10.0, 20.0));
        assert_eq!(merged, Geometry::new(10.0, 20.0, 3.0, 4.0));
        assert_eq!(g.merged(&GeometryPatch::default()), g);
    }

    #[test]
    fn geometry_patch_rejects_nan() {
        let patch = GeometryPatch {
            w: Some(f64::NAN),
            ..GeometryPatch::default()
        };
        assert!(patch.validate().is_err());
        assert!(GeometryPatch::size(10.0, 10.0).validate().is_ok());
    }

    #[test]
    fn geometry_well_formed() {
        assert!(Geometry::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Geometry::new(0.0, 0.0, 0.0, 1.0).is_well_formed());
        assert!(!Geometry::new(f64::INFINITY, 0.0, 1.0, 1.0).is_well_formed());
    }

    // ── DashboardState ──────────────────────────────────────────────

    #[test]
    fn valid_state_passes() {
        assert!(state_of(&["a", "b"]).validate().is_ok());
        assert!(DashboardState::default().validate().is_ok());
    }

    #[test]
    fn duplicate_layout_entry_rejected() {
        let mut state = state_of(&["a"]);
        state.layout.push("a".into());
        assert_eq!(state.validate().unwrap_err().error_type(), "INVALID_STATE");
    }

    #[test]
    fn dangling_layout_entry_rejected() {
        let mut state = state_of(&["a"]);
        state.layout.push("ghost".into());
        assert!(state.validate().is_err());
    }

    #[test]
    fn instance_missing_from_layout_rejected() {
        let mut state = state_of(&["a", "b"]);
        state.layout.retain(|id| id.as_str() != "b");
        assert!(state.validate().is_err());
    }

    #[test]
    fn mismatched_key_rejected() {
        let mut state = state_of(&["a"]);
        let inst = instance("other", WidgetKind::Todo);
        state.instances.insert("a".into(), inst);
        assert!(state.validate().is_err());
    }

    #[test]
    fn locked_groups_without_members_are_legal() {
        let mut state = state_of(&["a"]);
        state.locked_groups.insert("nobody|here".into(), true);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn max_z_index_empty_is_zero() {
        assert_eq!(DashboardState::default().max_z_index(), 0);
    }

    #[test]
    fn patch_keeps_missing_parts() {
        let mut current = state_of(&["a"]);
        current.locked_groups.insert("a".into(), true);
        let patched = DashboardStatePatch {
            locked_groups: Some(BTreeMap::new()),
            ..DashboardStatePatch::default()
        }
        .apply_to(&current);
        assert_eq!(patched.instances, current.instances);
        assert!(patched.locked_groups.is_empty());
    }

    // ── Serialization shape ─────────────────────────────────────────

    #[test]
    fn instance_serializes_camel_case() {
        let json = serde_json::to_value(instance("a", WidgetKind::QuickLinks)).unwrap();
        assert_eq!(json["instanceId"], "a");
        assert_eq!(json["type"], "quick_links");
        assert!(json.get("zIndex").is_some());
        assert!(json.get("groupDisabled").is_some());
    }

    #[test]
    fn instance_loads_legacy_document_without_optional_flags() {
        let json = r#"{
            "instanceId": "clock_min",
            "type": "quote_clock",
            "enabled": true,
            "createdAt": 1,
            "updatedAt": 2,
            "config": {},
            "layout": {"x": 20, "y": 20, "w": 360, "h": 260}
        }"#;
        let inst: WidgetInstance = serde_json::from_str(json).unwrap();
        assert_eq!(inst.kind, WidgetKind::QuoteClock);
        assert_eq!(inst.z_index, 0);
        assert!(!inst.is_locked);
        assert!(!inst.group_disabled);
    }

    #[test]
    fn instance_keeps_widget_data_and_collapse_fields() {
        let json = r#"{
            "instanceId": "todo_1",
            "type": "todo",
            "enabled": true,
            "createdAt": 1,
            "updatedAt": 2,
            "config": {},
            "layout": {"x": 0, "y": 0, "w": 360, "h": 400},
            "isCollapsed": true,
            "collapsedHeight": 40,
            "savedExpandedHeight": 400,
            "data": {"todos": [{"id": "t1", "text": "call back"}], "sortMode": "manual"}
        }"#;
        let inst: WidgetInstance = serde_json::from_str(json).unwrap();
        assert!(inst.is_collapsed);
        assert_eq!(inst.collapsed_height, Some(40.0));

        let value = serde_json::to_value(&inst).unwrap();
        assert_eq!(value["isCollapsed"], true);
        assert_eq!(value["savedExpandedHeight"], 400.0);
        assert_eq!(value["data"]["todos"][0]["text"], "call back");
        assert_eq!(value["data"]["sortMode"], "manual");

        let fresh = serde_json::to_value(instance("a", WidgetKind::Todo)).unwrap();
        assert!(fresh.get("data").is_none());
        assert!(fresh.get("isCollapsed").is_none());
    }

    #[test]
    fn snapshot_state_copy_is_detached() {
        let state = state_of(&["a"]);
        let snapshot = DashboardSnapshot::from_state(&state).with_active_tab(Some(TabId::Focus));
        let mut copy = snapshot.to_state();
        copy.layout.clear();
        assert_eq!(snapshot.layout.len(), 1);
        assert_eq!(snapshot.active_tab, Some(TabId::Focus));
    }

    #[test]
    fn tab_parse_is_case_insensitive() {
        assert_eq!("Calendar".parse::<TabId>().unwrap(), TabId::Calendar);
        assert!("inbox".parse::<TabId>().is_err());
    }
}
