//! Property tests for the engine's undo/redo history.
//!
//! Covers:
//!
//! 1. **Undo walks back**: undoing k steps yields the state k commits ago
//! 2. **Redo walks forward**: redoing everything returns to the last state
//! 3. **Board stays valid**: the layout/instance bijection holds after every op
//! 4. **Rejections are inert**: a failed op changes neither state nor revision

#![allow(clippy::float_cmp)]

use blackbox_core::models::{DashboardState, Geometry, GeometryPatch, InstanceId, WidgetKind};
use blackbox_engine::{DashboardEngine, EngineConfig};
use proptest::prelude::*;

fn pt_config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        max_shrink_iters: 2000,
        ..ProptestConfig::default()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Create { kind: usize, x: f64, y: f64, w: f64, h: f64 },
    Move { target: usize, x: f64, y: f64 },
    Resize { target: usize, w: f64, h: f64 },
    Delete { target: usize },
    LockInstance { target: usize },
    LockGroup { target: usize },
    Unlink { target: usize },
    Relink { target: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let coord = 0.0..1200.0f64;
    let size = 10.0..500.0f64;
    prop_oneof![
        3 => (0..WidgetKind::ALL.len(), coord.clone(), coord.clone(), size.clone(), size.clone())
            .prop_map(|(kind, x, y, w, h)| Op::Create { kind, x, y, w, h }),
        3 => (any::<usize>(), coord.clone(), coord)
            .prop_map(|(target, x, y)| Op::Move { target, x, y }),
        2 => (any::<usize>(), size.clone(), size)
            .prop_map(|(target, w, h)| Op::Resize { target, w, h }),
        1 => any::<usize>().prop_map(|target| Op::Delete { target }),
        1 => any::<usize>().prop_map(|target| Op::LockInstance { target }),
        1 => any::<usize>().prop_map(|target| Op::LockGroup { target }),
        1 => any::<usize>().prop_map(|target| Op::Unlink { target }),
        1 => any::<usize>().prop_map(|target| Op::Relink { target }),
    ]
}

fn pick(engine: &DashboardEngine, target: usize) -> Option<InstanceId> {
    let order = engine.traversal_order();
    if order.is_empty() {
        None
    } else {
        Some(order[target % order.len()].clone())
    }
}

/// Run one op; `Ok(())` when it was accepted (it may still have been a no-op).
fn apply(engine: &mut DashboardEngine, op: &Op) -> blackbox_core::Result<()> {
    let target = match op {
        Op::Create { kind, x, y, w, h } => {
            return engine
                .create_instance(WidgetKind::ALL[*kind], Geometry::new(*x, *y, *w, *h))
                .map(drop);
        }
        Op::Move { target, .. }
        | Op::Resize { target, .. }
        | Op::Delete { target }
        | Op::LockInstance { target }
        | Op::LockGroup { target }
        | Op::Unlink { target }
        | Op::Relink { target } => *target,
    };
    let Some(id) = pick(engine, target) else {
        return Ok(());
    };
    let id = id.as_str();
    match op {
        Op::Create { .. } => Ok(()),
        Op::Move { x, y, .. } => engine.update_layout(id, &GeometryPatch::position(*x, *y)).map(drop),
        Op::Resize { w, h, .. } => engine.update_layout(id, &GeometryPatch::size(*w, *h)).map(drop),
        Op::Delete { .. } => engine.delete_instance(id),
        Op::LockInstance { .. } => engine.toggle_instance_lock(id).map(drop),
        Op::LockGroup { .. } => {
            let key = engine.group_key(id)?;
            engine.toggle_group_lock(&key).map(drop)
        }
        Op::Unlink { .. } => engine.unlink_from_stack(id),
        Op::Relink { .. } => engine.relink_to_stacks(id),
    }
}

fn engine() -> DashboardEngine {
    DashboardEngine::new(EngineConfig::default().with_history_depth(1000)).unwrap()
}

proptest! {
    #![proptest_config(pt_config())]

    #[test]
    fn prop_undo_and_redo_walk_the_commit_chain(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut engine = engine();
        let mut chain: Vec<DashboardState> = vec![engine.state().clone()];

        for op in &ops {
            let undo_len = engine.history().undo_len();
            if apply(&mut engine, op).is_ok() && engine.history().undo_len() > undo_len {
                chain.push(engine.state().clone());
            }
            prop_assert!(engine.state().validate().is_ok());
        }

        let commits = chain.len() - 1;
        prop_assert_eq!(engine.history().undo_len(), commits);
        for expected in chain.iter().rev().skip(1) {
            prop_assert!(engine.undo());
            prop_assert_eq!(engine.state(), expected);
        }
        prop_assert!(!engine.undo());

        for expected in chain.iter().skip(1) {
            prop_assert!(engine.redo());
            prop_assert_eq!(engine.state(), expected);
        }
        prop_assert!(!engine.redo());
    }

    #[test]
    fn prop_rejected_ops_change_nothing(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut engine = engine();
        for op in &ops {
            let before = engine.state().clone();
            let revision = engine.revision();
            let undo_len = engine.history().undo_len();
            if apply(&mut engine, op).is_err() {
                prop_assert_eq!(engine.state(), &before);
                prop_assert_eq!(engine.revision(), revision);
                prop_assert_eq!(engine.history().undo_len(), undo_len);
            }
        }
    }

    #[test]
    fn prop_new_commit_clears_redo(ops in prop::collection::vec(op_strategy(), 1..20)) {
        let mut engine = engine();
        for op in &ops {
            let _ = apply(&mut engine, op);
        }
        engine.undo();
        engine
            .create_instance(WidgetKind::Weather, Geometry::new(2000.0, 2000.0, 100.0, 100.0))
            .unwrap();
        prop_assert!(!engine.has_redo());
        prop_assert!(engine.has_undo());
    }

    #[test]
    fn prop_stored_geometry_is_on_grid(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut engine = engine();
        for op in &ops {
            let _ = apply(&mut engine, op);
        }
        for instance in engine.state().instances.values() {
            let g = instance.layout;
            for v in [g.x, g.y, g.w, g.h] {
                prop_assert_eq!(v % 20.0, 0.0);
            }
            prop_assert!(g.x >= 0.0 && g.y >= 0.0);
            let (min_w, min_h) = instance.kind.min_size();
            prop_assert!(g.w >= min_w && g.h >= min_h);
        }
    }
}
