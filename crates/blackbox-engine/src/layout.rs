//! Geometry normalization, placement, and stacking order.
//!
//! Every committed geometry passes through [`normalize`]: all four fields are
//! snapped to the grid, the position is clamped to the canvas origin and the
//! size is raised to the kind's minimum (rounded up onto the grid).

use std::collections::HashMap;

use blackbox_core::models::{DashboardState, Geometry, GeometryPatch, WidgetInstance, WidgetKind};
use blackbox_core::snap::snap;
use blackbox_core::{Error, Result};

/// Gap between cells when laying widgets out on a column grid.
pub const CELL_GAP: f64 = 20.0;

/// Snap and clamp `geometry` for an instance of `kind`.
pub fn normalize(geometry: Geometry, kind: WidgetKind, step: f64) -> Result<Geometry> {
    if ![geometry.x, geometry.y, geometry.w, geometry.h]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(Error::InvalidArgument(format!(
            "geometry must be finite, got {geometry}"
        )));
    }
    let (min_w, min_h) = kind.min_size();
    Ok(Geometry {
        x: snap(geometry.x, step)?.max(0.0),
        y: snap(geometry.y, step)?.max(0.0),
        w: snap(geometry.w, step)?.max(ceil_to_grid(min_w, step)),
        h: snap(geometry.h, step)?.max(ceil_to_grid(min_h, step)),
    })
}

/// Merge `patch` into `current` and normalize the result.
pub fn apply_patch(
    current: Geometry,
    patch: &GeometryPatch,
    kind: WidgetKind,
    step: f64,
) -> Result<Geometry> {
    patch.validate()?;
    normalize(current.merged(patch), kind, step)
}

/// Shift `geometry` by `(dx, dy)`.
#[must_use]
pub fn translate(geometry: Geometry, dx: f64, dy: f64) -> Geometry {
    Geometry {
        x: geometry.x + dx,
        y: geometry.y + dy,
        ..geometry
    }
}

fn ceil_to_grid(value: f64, step: f64) -> f64 {
    (value / step).ceil() * step
}

// ── Stacking order ──────────────────────────────────────────────────────

/// z-index that places a new or raised instance above everything else.
#[must_use]
pub fn next_z_index(state: &DashboardState) -> i64 {
    state.max_z_index().saturating_add(1)
}

/// Whether `id` is strictly above every other instance.
#[must_use]
pub fn is_front_most(state: &DashboardState, id: &str) -> bool {
    let Some(target) = state.get(id) else {
        return false;
    };
    state
        .instances
        .values()
        .filter(|other| other.instance_id.as_str() != id)
        .all(|other| other.z_index < target.z_index)
}

/// Enabled instances bottom-to-top: by `zIndex`, ties broken by layout position.
#[must_use]
pub fn render_order(state: &DashboardState) -> Vec<&WidgetInstance> {
    let positions: HashMap<&str, usize> = state
        .layout
        .iter()
        .enumerate()
        .map(|(pos, id)| (id.as_str(), pos))
        .collect();
    let mut visible: Vec<&WidgetInstance> =
        state.instances.values().filter(|i| i.enabled).collect();
    visible.sort_by_key(|i| {
        (
            i.z_index,
            positions
                .get(i.instance_id.as_str())
                .copied()
                .unwrap_or(usize::MAX),
        )
    });
    visible
}

// ── Placement ───────────────────────────────────────────────────────────

/// Left-edge slot directly below the lowest widget on the board.
#[must_use]
pub fn placement_below(state: &DashboardState, step: f64) -> (f64, f64) {
    let bottom = state
        .instances
        .values()
        .map(|i| i.layout.bottom())
        .fold(0.0_f64, f64::max);
    (0.0, ceil_to_grid(bottom, step))
}

/// Masonry layout: each cell goes into the currently shortest column.
///
/// Columns are `column_width` wide, separated and inset by [`CELL_GAP`].
#[must_use]
pub fn masonry(heights: &[f64], columns: usize, column_width: f64) -> Vec<Geometry> {
    let columns = columns.max(1);
    let mut bottoms = vec![CELL_GAP; columns];
    let mut cells = Vec::with_capacity(heights.len());
    for &h in heights {
        let (col, top) = bottoms
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (col, top)| {
                if top < best.1 { (col, top) } else { best }
            });
        #[allow(clippy::cast_precision_loss)]
        let x = (col as f64).mul_add(column_width + CELL_GAP, CELL_GAP);
        cells.push(Geometry::new(x, top, column_width, h));
        bottoms[col] = top + h + CELL_GAP;
    }
    cells
}
