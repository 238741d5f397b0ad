//! Instance registry: lookup, insertion, and removal keeping `instances` and
//! `layout` in lockstep.

use blackbox_core::ids::generate_unique_id;
use blackbox_core::models::{DashboardState, InstanceId, WidgetInstance, WidgetKind};
use blackbox_core::{Error, Result};

use crate::layout;

/// Kinds placed on a fresh or reset dashboard, in traversal order.
pub const DEFAULT_KINDS: [WidgetKind; 10] = [
    WidgetKind::QuoteClock,
    WidgetKind::Todo,
    WidgetKind::HabitTracker,
    WidgetKind::Github,
    WidgetKind::Weather,
    WidgetKind::QuickLinks,
    WidgetKind::FocusSummary,
    WidgetKind::ProjectsOverview,
    WidgetKind::CustomApi,
    WidgetKind::Gmail,
];

const DEFAULT_COLUMNS: usize = 3;
const DEFAULT_COLUMN_WIDTH: f64 = 360.0;

pub fn get<'a>(state: &'a DashboardState, id: &str) -> Result<&'a WidgetInstance> {
    state
        .instances
        .get(id)
        .ok_or_else(|| Error::InstanceNotFound(id.to_string()))
}

pub fn get_mut<'a>(state: &'a mut DashboardState, id: &str) -> Result<&'a mut WidgetInstance> {
    state
        .instances
        .get_mut(id)
        .ok_or_else(|| Error::InstanceNotFound(id.to_string()))
}

/// Add `instance` to the map and append its id to the traversal order.
pub fn insert(state: &mut DashboardState, instance: WidgetInstance) {
    state.layout.push(instance.instance_id.clone());
    state
        .instances
        .insert(instance.instance_id.clone(), instance);
}

/// Remove `id` from both the map and the traversal order.
pub fn remove(state: &mut DashboardState, id: &str) -> Result<WidgetInstance> {
    let removed = state
        .instances
        .remove(id)
        .ok_or_else(|| Error::InstanceNotFound(id.to_string()))?;
    state.layout.retain(|entry| entry.as_str() != id);
    Ok(removed)
}

/// A fresh id for `kind`, unique within `state`.
#[must_use]
pub fn fresh_id(state: &DashboardState, kind: WidgetKind) -> InstanceId {
    InstanceId::new(generate_unique_id(kind.as_str(), |candidate| {
        state.instances.contains_key(candidate)
    }))
}

#[must_use]
pub fn count_of_kind(state: &DashboardState, kind: WidgetKind) -> usize {
    state.instances.values().filter(|i| i.kind == kind).count()
}

/// Refuse a second instance of a single-instance kind.
pub fn ensure_can_add(state: &DashboardState, kind: WidgetKind) -> Result<()> {
    if kind.allows_multiple() || count_of_kind(state, kind) == 0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "only one {kind} widget may be placed on the dashboard"
        )))
    }
}

/// The stock dashboard: one of each default kind on a three-column grid.
pub fn default_state(step: f64, now: i64) -> Result<DashboardState> {
    let heights: Vec<f64> = DEFAULT_KINDS.iter().map(|k| k.default_size().1).collect();
    let cells = layout::masonry(&heights, DEFAULT_COLUMNS, DEFAULT_COLUMN_WIDTH);

    let mut state = DashboardState::default();
    for (kind, cell) in DEFAULT_KINDS.into_iter().zip(cells) {
        let geometry = layout::normalize(cell, kind, step)?;
        let mut instance = WidgetInstance::new(fresh_id(&state, kind), kind, geometry, now);
        instance.z_index = layout::next_z_index(&state);
        insert(&mut state, instance);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackbox_core::models::Geometry;

    fn instance(id: &str, kind: WidgetKind) -> WidgetInstance {
        WidgetInstance::new(id.into(), kind, Geometry::new(0.0, 0.0, 100.0, 100.0), 0)
    }

    #[test]
    fn insert_and_remove_keep_bijection() {
        let mut state = DashboardState::default();
        insert(&mut state, instance("a", WidgetKind::Todo));
        insert(&mut state, instance("b", WidgetKind::Weather));
        assert!(state.validate().is_ok());

        let removed = remove(&mut state, "a").unwrap();
        assert_eq!(removed.instance_id.as_str(), "a");
        assert_eq!(state.layout, vec![InstanceId::from("b")]);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn missing_instance_is_not_found() {
        let mut state = DashboardState::default();
        assert_eq!(get(&state, "x").unwrap_err().error_type(), "NOT_FOUND");
        assert_eq!(remove(&mut state, "x").unwrap_err().error_type(), "NOT_FOUND");
    }

    #[test]
    fn fresh_id_uses_kind_prefix() {
        let state = DashboardState::default();
        let id = fresh_id(&state, WidgetKind::QuickLinks);
        assert!(id.as_str().starts_with("quick_links_"));
    }

    #[test]
    fn single_instance_kinds_are_enforced() {
        let mut state = DashboardState::default();
        insert(&mut state, instance("t", WidgetKind::Todo));
        insert(&mut state, instance("w", WidgetKind::Weather));
        assert!(ensure_can_add(&state, WidgetKind::Todo).is_err());
        assert!(ensure_can_add(&state, WidgetKind::Weather).is_ok());
        assert!(ensure_can_add(&state, WidgetKind::Github).is_ok());
    }

    #[test]
    fn default_state_is_valid_and_grid_aligned() {
        let state = default_state(20.0, 7).unwrap();
        assert!(state.validate().is_ok());
        assert_eq!(state.len(), DEFAULT_KINDS.len());
        for (pos, id) in state.layout.iter().enumerate() {
            let inst = &state.instances[id];
            assert_eq!(inst.kind, DEFAULT_KINDS[pos]);
            assert_eq!(inst.created_at, 7);
            for v in [inst.layout.x, inst.layout.y, inst.layout.w, inst.layout.h] {
                assert!(blackbox_core::snap::is_on_grid(v, 20.0), "{v}");
            }
        }
        let zs: Vec<i64> = state.layout.iter().map(|id| state.instances[id].z_index).collect();
        assert_eq!(zs, (1..=10).collect::<Vec<i64>>());
    }
}
