//! Property tests for grid snapping and the model validator.
//!
//! Covers:
//!
//! 1. **Snap idempotence**: snapping a snapped value is a no-op
//! 2. **Grid membership**: every snapped value is a multiple of the step
//! 3. **Nearest multiple**: the snapped value is within half a step
//! 4. **State validation**: any well-formed generated board validates

#![allow(clippy::float_cmp, clippy::cast_precision_loss)]

use blackbox_core::models::{DashboardState, Geometry, WidgetInstance, WidgetKind};
use blackbox_core::snap::{is_on_grid, snap};
use proptest::prelude::*;

fn pt_config() -> ProptestConfig {
    ProptestConfig {
        cases: 512,
        max_shrink_iters: 2000,
        ..ProptestConfig::default()
    }
}

fn step_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(20.0), Just(10.0), Just(8.0), Just(5.0), Just(1.0)]
}

proptest! {
    #![proptest_config(pt_config())]

    #[test]
    fn prop_snap_is_idempotent(value in -1.0e6..1.0e6f64, step in step_strategy()) {
        let once = snap(value, step).unwrap();
        let twice = snap(once, step).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_snap_lands_on_grid(value in -1.0e6..1.0e6f64, step in step_strategy()) {
        let snapped = snap(value, step).unwrap();
        prop_assert!(is_on_grid(snapped, step));
        let multiple = snapped / step;
        prop_assert_eq!(multiple, multiple.round());
    }

    #[test]
    fn prop_snap_is_nearest(value in -1.0e6..1.0e6f64, step in step_strategy()) {
        let snapped = snap(value, step).unwrap();
        prop_assert!((snapped - value).abs() <= step / 2.0 + 1e-9);
    }

    #[test]
    fn prop_generated_board_validates(count in 0usize..24) {
        let mut state = DashboardState::default();
        for i in 0..count {
            let kind = WidgetKind::ALL[i % WidgetKind::ALL.len()];
            let id = format!("w{i}");
            let layout = Geometry::new((i as f64) * 20.0, 0.0, 100.0, 100.0);
            state
                .instances
                .insert(id.as_str().into(), WidgetInstance::new(id.as_str().into(), kind, layout, 1));
            state.layout.push(id.into());
        }
        prop_assert!(state.validate().is_ok());
    }
}
