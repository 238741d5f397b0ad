//! The dashboard state engine.
//!
//! [`DashboardEngine`] owns the live [`DashboardState`], its undo/redo
//! [`History`] and at most one in-flight [`Gesture`]. Every mutation runs
//! against a draft copy and is swapped in only once it fully succeeded, so a
//! rejected operation leaves the engine exactly as it was.
//!
//! Tracked operations push the pre-mutation state onto the history. Visibility
//! (`set_enabled`), widget config and stacking order are applied in place
//! without a history entry.

use blackbox_core::config::{Config, DEFAULT_HISTORY_DEPTH};
use blackbox_core::models::{
    DashboardSnapshot, DashboardState, DashboardStatePatch, Geometry, GeometryPatch, InstanceId,
    WidgetInstance, WidgetKind,
};
use blackbox_core::snap::{DEFAULT_GRID_STEP, snap, validate_step};
use blackbox_core::timestamps::now_millis;
use blackbox_core::{Error, Result};
use serde_json::{Map, Value};

use crate::gesture::{Gesture, GestureKind};
use crate::history::History;
use crate::locks::{self, StackGroup};
use crate::{layout, registry};

/// Engine tuning, usually derived from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub grid_step: f64,
    pub history_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_step: DEFAULT_GRID_STEP,
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            grid_step: config.grid_step,
            history_depth: config.history_depth,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn with_grid_step(mut self, grid_step: f64) -> Self {
        self.grid_step = grid_step;
        self
    }

    #[must_use]
    pub const fn with_history_depth(mut self, history_depth: usize) -> Self {
        self.history_depth = history_depth;
        self
    }
}

#[derive(Debug, Clone)]
pub struct DashboardEngine {
    state: DashboardState,
    history: History<DashboardState>,
    gesture: Option<Gesture>,
    config: EngineConfig,
    revision: u64,
}

impl DashboardEngine {
    /// An engine over an empty board.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::from_parts(config, DashboardState::default(), Vec::new(), Vec::new())
    }

    /// An engine over `state` with an empty history.
    pub fn with_state(config: EngineConfig, state: DashboardState) -> Result<Self> {
        Self::from_parts(config, state, Vec::new(), Vec::new())
    }

    /// Rebuild an engine from a persisted state and history stacks.
    pub fn from_parts(
        config: EngineConfig,
        state: DashboardState,
        past: Vec<DashboardState>,
        future: Vec<DashboardState>,
    ) -> Result<Self> {
        validate_step(config.grid_step)?;
        state.validate()?;
        for entry in past.iter().chain(&future) {
            entry.validate()?;
        }
        Ok(Self {
            state,
            history: History::from_parts(past, future, config.history_depth),
            gesture: None,
            config,
            revision: 0,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &DashboardState {
        &self.state
    }

    #[must_use]
    pub const fn history(&self) -> &History<DashboardState> {
        &self.history
    }

    /// Bumped on every change to the live state (tracked or not).
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WidgetInstance> {
        self.state.get(id)
    }

    pub fn instance(&self, id: &str) -> Result<&WidgetInstance> {
        registry::get(&self.state, id)
    }

    /// Enabled instances bottom-to-top.
    #[must_use]
    pub fn render_order(&self) -> Vec<&WidgetInstance> {
        layout::render_order(&self.state)
    }

    /// Every instance id in keyboard/listing order.
    #[must_use]
    pub fn traversal_order(&self) -> &[InstanceId] {
        &self.state.layout
    }

    /// Deep copy of the current board (without navigation state).
    #[must_use]
    pub fn export_snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::from_state(&self.state)
    }

    // ── Commit plumbing ─────────────────────────────────────────────────

    fn commit<T>(
        &mut self,
        action: &'static str,
        apply: impl FnOnce(&mut DashboardState, &EngineConfig) -> Result<T>,
    ) -> Result<T> {
        let mut draft = self.state.clone();
        let out = apply(&mut draft, &self.config)?;
        draft.validate()?;
        let previous = std::mem::replace(&mut self.state, draft);
        self.history.record(previous);
        self.revision += 1;
        tracing::debug!(
            action,
            revision = self.revision,
            undo_depth = self.history.undo_len(),
            "committed dashboard change"
        );
        Ok(out)
    }

    fn mutate_untracked<T>(
        &mut self,
        action: &'static str,
        apply: impl FnOnce(&mut DashboardState) -> Result<T>,
    ) -> Result<T> {
        let mut draft = self.state.clone();
        let out = apply(&mut draft)?;
        self.state = draft;
        self.revision += 1;
        tracing::debug!(action, revision = self.revision, "updated dashboard in place");
        Ok(out)
    }

    fn spawn(
        state: &mut DashboardState,
        config: &EngineConfig,
        kind: WidgetKind,
        geometry: Geometry,
    ) -> Result<InstanceId> {
        let geometry = layout::normalize(geometry, kind, config.grid_step)?;
        let id = registry::fresh_id(state, kind);
        let mut instance = WidgetInstance::new(id.clone(), kind, geometry, now_millis());
        instance.z_index = layout::next_z_index(state);
        registry::insert(state, instance);
        Ok(id)
    }

    // ── Instance registry ───────────────────────────────────────────────

    /// Place a new widget of `kind` at `initial` (snapped and clamped).
    pub fn create_instance(&mut self, kind: WidgetKind, initial: Geometry) -> Result<InstanceId> {
        self.commit("create_instance", |state, config| {
            Self::spawn(state, config, kind, initial)
        })
    }

    /// [`create_instance`](Self::create_instance) with the kind given by name.
    pub fn create_instance_named(&mut self, kind: &str, initial: Geometry) -> Result<InstanceId> {
        let kind: WidgetKind = kind.parse()?;
        self.create_instance(kind, initial)
    }

    /// Add a widget with its default size below everything on the board.
    pub fn add_widget(&mut self, kind: WidgetKind) -> Result<InstanceId> {
        self.commit("add_widget", |state, config| {
            registry::ensure_can_add(state, kind)?;
            let (x, y) = layout::placement_below(state, config.grid_step);
            let (w, h) = kind.default_size();
            Self::spawn(state, config, kind, Geometry::new(x, y, w, h))
        })
    }

    /// Copy an instance one grid step right and down.
    pub fn duplicate_instance(&mut self, id: &str) -> Result<InstanceId> {
        self.commit("duplicate_instance", |state, config| {
            let source = registry::get(state, id)?.clone();
            registry::ensure_can_add(state, source.kind)?;
            let step = config.grid_step;
            let geometry = layout::translate(source.layout, step, step);
            let copy_id = Self::spawn(state, config, source.kind, geometry)?;
            let copy = registry::get_mut(state, copy_id.as_str())?;
            copy.title = source.title;
            copy.config = source.config;
            copy.enabled = source.enabled;
            Ok(copy_id)
        })
    }

    pub fn delete_instance(&mut self, id: &str) -> Result<()> {
        self.commit("delete_instance", |state, _| {
            locks::ensure_unlocked(state, id)?;
            registry::remove(state, id).map(drop)
        })?;
        if self
            .gesture
            .as_ref()
            .is_some_and(|g| g.instance_id().as_str() == id)
        {
            self.gesture = None;
        }
        Ok(())
    }

    /// Show or hide an instance without removing it.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
        if self.instance(id)?.enabled == enabled {
            return Ok(());
        }
        self.mutate_untracked("set_enabled", |state| {
            let instance = registry::get_mut(state, id)?;
            instance.enabled = enabled;
            instance.updated_at = now_millis();
            Ok(())
        })
    }

    /// Flip visibility; returns the new value.
    pub fn toggle_enabled(&mut self, id: &str) -> Result<bool> {
        let enabled = !self.instance(id)?.enabled;
        self.set_enabled(id, enabled)?;
        Ok(enabled)
    }

    /// Shallow-merge `partial` into the widget's config; `null` removes a key.
    ///
    /// Config belongs to the widget body, so this works on locked instances too.
    pub fn update_config(&mut self, id: &str, partial: Map<String, Value>) -> Result<()> {
        self.mutate_untracked("update_config", |state| {
            let instance = registry::get_mut(state, id)?;
            for (key, value) in partial {
                if value.is_null() {
                    instance.config.remove(&key);
                } else {
                    instance.config.insert(key, value);
                }
            }
            instance.updated_at = now_millis();
            Ok(())
        })
    }

    // ── Layout ──────────────────────────────────────────────────────────

    /// Merge and commit a geometry change; returns the stored geometry.
    pub fn update_layout(&mut self, id: &str, patch: &GeometryPatch) -> Result<Geometry> {
        self.commit("update_layout", |state, config| {
            locks::ensure_unlocked(state, id)?;
            let instance = registry::get_mut(state, id)?;
            let geometry = layout::apply_patch(instance.layout, patch, instance.kind, config.grid_step)?;
            instance.layout = geometry;
            instance.updated_at = now_millis();
            Ok(geometry)
        })
    }

    /// Raise `id` above every other instance; returns its new z-index.
    pub fn bring_to_front(&mut self, id: &str) -> Result<i64> {
        let current = self.instance(id)?.z_index;
        if layout::is_front_most(&self.state, id) {
            return Ok(current);
        }
        self.mutate_untracked("bring_to_front", |state| {
            let z_index = layout::next_z_index(state);
            let instance = registry::get_mut(state, id)?;
            instance.z_index = z_index;
            instance.updated_at = now_millis();
            Ok(z_index)
        })
    }

    // ── Locks and stacks ────────────────────────────────────────────────

    /// Set `lockedGroups[key]`; returns whether anything changed.
    pub fn lock_group(&mut self, key: &str, locked: bool) -> Result<bool> {
        locks::validate_key(key)?;
        let current = self.state.locked_groups.get(key).copied().unwrap_or(false);
        if current == locked {
            return Ok(false);
        }
        self.commit("lock_group", |state, _| {
            state.locked_groups.insert(key.to_string(), locked);
            Ok(())
        })?;
        tracing::debug!(group = key, locked, "group lock changed");
        Ok(true)
    }

    /// Flip a group lock; returns the new value.
    pub fn toggle_group_lock(&mut self, key: &str) -> Result<bool> {
        let locked = !self.state.locked_groups.get(key).copied().unwrap_or(false);
        self.lock_group(key, locked)?;
        Ok(locked)
    }

    /// Set an instance's own lock flag; returns whether anything changed.
    pub fn set_instance_locked(&mut self, id: &str, locked: bool) -> Result<bool> {
        if self.instance(id)?.is_locked == locked {
            return Ok(false);
        }
        self.commit("set_instance_locked", |state, _| {
            let instance = registry::get_mut(state, id)?;
            instance.is_locked = locked;
            instance.updated_at = now_millis();
            Ok(())
        })?;
        Ok(true)
    }

    pub fn toggle_instance_lock(&mut self, id: &str) -> Result<bool> {
        let locked = !self.instance(id)?.is_locked;
        self.set_instance_locked(id, locked)?;
        Ok(locked)
    }

    /// Pull an instance out of its stack and park it to the right.
    pub fn unlink_from_stack(&mut self, id: &str) -> Result<()> {
        if self.instance(id)?.group_disabled {
            return Ok(());
        }
        self.commit("unlink_from_stack", |state, config| {
            locks::ensure_unlocked(state, id)?;
            let instance = registry::get_mut(state, id)?;
            let target_x = snap(
                instance.layout.x + instance.layout.w + locks::UNLINK_CLEARANCE,
                config.grid_step,
            )?;
            instance.layout = layout::normalize(
                Geometry {
                    x: target_x,
                    ..instance.layout
                },
                instance.kind,
                config.grid_step,
            )?;
            instance.group_disabled = true;
            instance.updated_at = now_millis();
            Ok(())
        })
    }

    /// Let an unlinked instance take part in stacking again.
    pub fn relink_to_stacks(&mut self, id: &str) -> Result<()> {
        if !self.instance(id)?.group_disabled {
            return Ok(());
        }
        self.commit("relink_to_stacks", |state, _| {
            let instance = registry::get_mut(state, id)?;
            instance.group_disabled = false;
            instance.updated_at = now_millis();
            Ok(())
        })
    }

    #[must_use]
    pub fn stack_groups(&self) -> Vec<StackGroup> {
        locks::compute_groups(&self.state)
    }

    pub fn group_key(&self, id: &str) -> Result<String> {
        locks::group_key(&self.state, id)
    }

    pub fn is_locked(&self, id: &str) -> Result<bool> {
        locks::is_locked(&self.state, id)
    }

    // ── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.state);
        if undone {
            self.cancel_gesture();
            self.revision += 1;
            tracing::debug!(revision = self.revision, "undo");
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.state);
        if redone {
            self.cancel_gesture();
            self.revision += 1;
            tracing::debug!(revision = self.revision, "redo");
        }
        redone
    }

    #[must_use]
    pub fn has_undo(&self) -> bool {
        self.history.has_undo()
    }

    #[must_use]
    pub fn has_redo(&self) -> bool {
        self.history.has_redo()
    }

    pub fn clear_history(&mut self) {
        if self.history.has_undo() || self.history.has_redo() {
            self.history.clear();
            self.revision += 1;
        }
    }

    // ── Bulk replacement ────────────────────────────────────────────────

    /// Replace the whole board as one undoable step.
    ///
    /// `new_state` must satisfy the layout/instance bijection; geometry is
    /// normalized onto the grid.
    pub fn replace_state(&mut self, new_state: DashboardState) -> Result<()> {
        new_state.validate()?;
        self.commit("replace_state", |state, config| {
            let mut replacement = new_state;
            for instance in replacement.instances.values_mut() {
                instance.layout = layout::normalize(instance.layout, instance.kind, config.grid_step)?;
            }
            *state = replacement;
            Ok(())
        })?;
        self.cancel_gesture();
        Ok(())
    }

    /// Replace any subset of instances, layout and lock groups.
    pub fn replace_dashboard_state(&mut self, patch: DashboardStatePatch) -> Result<()> {
        let merged = patch.apply_to(&self.state);
        self.replace_state(merged)
    }

    /// Swap the board for the stock dashboard.
    pub fn reset_to_defaults(&mut self) -> Result<()> {
        self.commit("reset_to_defaults", |state, config| {
            *state = registry::default_state(config.grid_step, now_millis())?;
            Ok(())
        })?;
        self.cancel_gesture();
        tracing::info!(instances = self.state.len(), "dashboard reset to defaults");
        Ok(())
    }

    // ── Gestures ────────────────────────────────────────────────────────

    /// Start dragging or resizing `id`; returns its current geometry.
    pub fn begin_gesture(&mut self, id: &str, kind: GestureKind) -> Result<Geometry> {
        if let Some(active) = &self.gesture {
            return Err(Error::InvalidArgument(format!(
                "a {} gesture on {} is already in progress",
                active.kind(),
                active.instance_id()
            )));
        }
        let origin = self.instance(id)?.layout;
        locks::ensure_unlocked(&self.state, id)?;
        self.gesture = Some(Gesture::new(InstanceId::from(id), kind, origin));
        Ok(origin)
    }

    /// Feed a pointer update; returns the unsnapped preview.
    pub fn gesture_move(&mut self, patch: &GeometryPatch) -> Result<Geometry> {
        self.gesture
            .as_mut()
            .ok_or_else(|| Error::InvalidArgument("no gesture in progress".into()))?
            .update(patch)
    }

    #[must_use]
    pub const fn active_gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Drop the in-flight gesture without committing; returns whether one existed.
    pub fn cancel_gesture(&mut self) -> bool {
        self.gesture.take().is_some()
    }

    /// Snap and commit the gesture as a single history entry.
    ///
    /// Fields the pointer never touched keep whatever the instance holds now,
    /// so a layout commit made mid-gesture survives.
    ///
    /// A move carries the rest of the instance's stack along by the same
    /// snapped delta; members with their own lock stay where they are.
    /// Returns `false` when the snapped result equals the current layout.
    pub fn end_gesture(&mut self) -> Result<bool> {
        let gesture = self
            .gesture
            .take()
            .ok_or_else(|| Error::InvalidArgument("no gesture in progress".into()))?;
        let id = gesture.instance_id().as_str();
        let instance = self.instance(id)?;
        let (kind, current) = (instance.kind, instance.layout);
        locks::ensure_unlocked(&self.state, id)?;

        let target = layout::normalize(gesture.applied_to(current), kind, self.config.grid_step)?;
        if target == current {
            return Ok(false);
        }

        let companions: Vec<InstanceId> = match gesture.kind() {
            GestureKind::Move => locks::group_of(&self.state, id)?
                .members
                .into_iter()
                .filter(|member| member.as_str() != id)
                .collect(),
            GestureKind::Resize => Vec::new(),
        };
        let (dx, dy) = (target.x - current.x, target.y - current.y);

        self.commit("end_gesture", |state, config| {
            let now = now_millis();
            let instance = registry::get_mut(state, id)?;
            instance.layout = target;
            instance.updated_at = now;
            for member in &companions {
                let member = registry::get_mut(state, member.as_str())?;
                if member.is_locked {
                    continue;
                }
                member.layout = layout::normalize(
                    layout::translate(member.layout, dx, dy),
                    member.kind,
                    config.grid_step,
                )?;
                member.updated_at = now;
            }
            Ok(())
        })?;
        tracing::debug!(instance = id, gesture = %gesture.kind(), "gesture committed");
        Ok(true)
    }
}
