//! Stack grouping and lock resolution.
//!
//! Groups are derived from geometry: among visible instances that take part
//! in stacking, two are adjacent when their rectangles overlap by more than
//! [`STACK_OVERLAP_INSET`] on both axes and their areas differ by less than
//! [`STACK_AREA_TOLERANCE`]. Connected components form the stacks. A group's
//! key is its sorted member ids joined with `|`; instances excluded from
//! stacking (hidden, or unlinked via `groupDisabled`) get the singleton key
//! `standalone:<id>`.
//!
//! An instance is locked when its own `isLocked` flag is set or
//! `lockedGroups[group_key]` is `true`.

use std::collections::HashMap;

use blackbox_core::models::{DashboardState, Geometry, InstanceId, WidgetInstance};
use blackbox_core::{Error, Result};
use serde::Serialize;

use crate::registry;

/// Maximum area difference between two stacked widgets.
pub const STACK_AREA_TOLERANCE: f64 = 5000.0;

/// Overlap required on each axis before two widgets stack.
pub const STACK_OVERLAP_INSET: f64 = 20.0;

/// Horizontal clearance added when pulling an instance out of its stack.
pub const UNLINK_CLEARANCE: f64 = 260.0;

const STANDALONE_PREFIX: &str = "standalone:";

/// One derived stack of instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackGroup {
    pub key: String,
    pub members: Vec<InstanceId>,
    pub locked: bool,
}

impl StackGroup {
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.key.starts_with(STANDALONE_PREFIX)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m.as_str() == id)
    }
}

fn stacks_with(a: &Geometry, b: &Geometry) -> bool {
    let similar_size = (a.area() - b.area()).abs() < STACK_AREA_TOLERANCE;
    let overlap = a.x < b.right() - STACK_OVERLAP_INSET
        && a.right() > b.x + STACK_OVERLAP_INSET
        && a.y < b.bottom() - STACK_OVERLAP_INSET
        && a.bottom() > b.y + STACK_OVERLAP_INSET;
    similar_size && overlap
}

const fn participates(instance: &WidgetInstance) -> bool {
    instance.enabled && !instance.group_disabled
}

fn standalone_key(id: &str) -> String {
    format!("{STANDALONE_PREFIX}{id}")
}

fn join_key(members: &[InstanceId]) -> String {
    members
        .iter()
        .map(InstanceId::as_str)
        .collect::<Vec<_>>()
        .join("|")
}

/// Derive the stack groups of every visible instance.
///
/// Stacked groups come first, in traversal order of their first member,
/// followed by the standalone groups of unlinked instances.
#[must_use]
pub fn compute_groups(state: &DashboardState) -> Vec<StackGroup> {
    let visible: Vec<&WidgetInstance> = state
        .layout
        .iter()
        .filter_map(|id| state.instances.get(id))
        .filter(|i| i.enabled)
        .collect();
    let nodes: Vec<&WidgetInstance> = visible.iter().copied().filter(|i| participates(i)).collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            if stacks_with(&nodes[i].layout, &nodes[j].layout) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    let mut visited = vec![false; nodes.len()];
    let mut groups = Vec::new();
    for start in 0..nodes.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut pending = vec![start];
        let mut members = Vec::new();
        while let Some(node) = pending.pop() {
            members.push(nodes[node].instance_id.clone());
            for &next in &adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    pending.push(next);
                }
            }
        }
        members.sort();
        let key = join_key(&members);
        let locked = is_key_locked(state, &key);
        groups.push(StackGroup {
            key,
            members,
            locked,
        });
    }

    for instance in visible.iter().filter(|i| i.group_disabled) {
        let key = standalone_key(instance.instance_id.as_str());
        let locked = is_key_locked(state, &key);
        groups.push(StackGroup {
            key,
            members: vec![instance.instance_id.clone()],
            locked,
        });
    }
    groups
}

/// Map each grouped instance id to its group key.
#[must_use]
pub fn group_index(state: &DashboardState) -> HashMap<InstanceId, String> {
    compute_groups(state)
        .into_iter()
        .flat_map(|group| {
            let key = group.key;
            group
                .members
                .into_iter()
                .map(move |member| (member, key.clone()))
        })
        .collect()
}

/// The group `id` belongs to; hidden instances are standalone.
pub fn group_of(state: &DashboardState, id: &str) -> Result<StackGroup> {
    let instance = registry::get(state, id)?;
    if !participates(instance) {
        let key = standalone_key(id);
        let locked = is_key_locked(state, &key);
        return Ok(StackGroup {
            key,
            members: vec![instance.instance_id.clone()],
            locked,
        });
    }
    compute_groups(state)
        .into_iter()
        .find(|group| group.contains(id))
        .ok_or_else(|| Error::InvalidState(format!("instance {id} has no stack group")))
}

pub fn group_key(state: &DashboardState, id: &str) -> Result<String> {
    group_of(state, id).map(|group| group.key)
}

fn is_key_locked(state: &DashboardState, key: &str) -> bool {
    state.locked_groups.get(key).copied().unwrap_or(false)
}

pub fn is_locked(state: &DashboardState, id: &str) -> Result<bool> {
    let instance = registry::get(state, id)?;
    if instance.is_locked {
        return Ok(true);
    }
    Ok(group_of(state, id)?.locked)
}

/// Fail with [`Error::Locked`] when `id` may not be moved, resized or deleted.
pub fn ensure_unlocked(state: &DashboardState, id: &str) -> Result<()> {
    if is_locked(state, id)? {
        Err(Error::Locked(id.to_string()))
    } else {
        Ok(())
    }
}

/// Check a lock-group key before it is written.
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        Err(Error::InvalidArgument("lock group key must not be empty".into()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackbox_core::models::WidgetKind;

    fn board(entries: &[(&str, [f64; 4])]) -> DashboardState {
        let mut state = DashboardState::default();
        for (id, [x, y, w, h]) in entries {
            registry::insert(
                &mut state,
                WidgetInstance::new(
                    (*id).into(),
                    WidgetKind::Weather,
                    Geometry::new(*x, *y, *w, *h),
                    0,
                ),
            );
        }
        state
    }

    #[test]
    fn overlapping_similar_widgets_stack() {
        let state = board(&[
            ("b", [0.0, 0.0, 100.0, 100.0]),
            ("a", [40.0, 40.0, 100.0, 100.0]),
            ("c", [500.0, 0.0, 100.0, 100.0]),
        ]);
        let groups = compute_groups(&state);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "a|b");
        assert_eq!(groups[1].key, "c");
    }

    #[test]
    fn shallow_overlap_does_not_stack() {
        // Overlap of exactly the inset on x is not enough.
        let state = board(&[("a", [0.0, 0.0, 100.0, 100.0]), ("b", [80.0, 0.0, 100.0, 100.0])]);
        assert_eq!(compute_groups(&state).len(), 2);
    }

    #[test]
    fn very_different_sizes_do_not_stack() {
        let state = board(&[("a", [0.0, 0.0, 100.0, 100.0]), ("b", [0.0, 0.0, 300.0, 300.0])]);
        assert_eq!(compute_groups(&state).len(), 2);
    }

    #[test]
    fn stacking_is_transitive() {
        let state = board(&[
            ("a", [0.0, 0.0, 100.0, 100.0]),
            ("b", [60.0, 0.0, 100.0, 100.0]),
            ("c", [120.0, 0.0, 100.0, 100.0]),
        ]);
        let groups = compute_groups(&state);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 3);
    }

    #[test]
    fn unlinked_instance_is_standalone() {
        let mut state = board(&[("a", [0.0, 0.0, 100.0, 100.0]), ("b", [40.0, 40.0, 100.0, 100.0])]);
        state.instances.get_mut("b").unwrap().group_disabled = true;
        let groups = compute_groups(&state);
        assert_eq!(groups[0].key, "a");
        assert_eq!(groups[1].key, "standalone:b");
        assert!(groups[1].is_standalone());
        assert_eq!(group_key(&state, "b").unwrap(), "standalone:b");
    }

    #[test]
    fn hidden_instances_are_not_grouped() {
        let mut state = board(&[("a", [0.0, 0.0, 100.0, 100.0]), ("b", [40.0, 40.0, 100.0, 100.0])]);
        state.instances.get_mut("b").unwrap().enabled = false;
        let groups = compute_groups(&state);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "a");
        assert_eq!(group_key(&state, "b").unwrap(), "standalone:b");
    }

    #[test]
    fn group_lock_covers_every_member() {
        let mut state = board(&[
            ("a", [0.0, 0.0, 100.0, 100.0]),
            ("b", [40.0, 40.0, 100.0, 100.0]),
            ("c", [500.0, 0.0, 100.0, 100.0]),
        ]);
        state.locked_groups.insert("a|b".into(), true);
        assert!(is_locked(&state, "a").unwrap());
        assert!(is_locked(&state, "b").unwrap());
        assert!(!is_locked(&state, "c").unwrap());
        assert_eq!(ensure_unlocked(&state, "a").unwrap_err().error_type(), "LOCKED");
    }

    #[test]
    fn instance_lock_applies_alone() {
        let mut state = board(&[("a", [0.0, 0.0, 100.0, 100.0]), ("b", [40.0, 40.0, 100.0, 100.0])]);
        state.instances.get_mut("a").unwrap().is_locked = true;
        assert!(is_locked(&state, "a").unwrap());
        assert!(!is_locked(&state, "b").unwrap());
    }

    #[test]
    fn group_index_covers_visible_instances() {
        let state = board(&[("a", [0.0, 0.0, 100.0, 100.0]), ("b", [40.0, 40.0, 100.0, 100.0])]);
        let index = group_index(&state);
        assert_eq!(index.get(&InstanceId::from("a")).map(String::as_str), Some("a|b"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(validate_key("  ").is_err());
        assert!(validate_key("a|b").is_ok());
    }
}
