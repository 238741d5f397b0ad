//! Grid snapping for canvas coordinates.
//!
//! Every committed geometry write goes through [`snap`], so persisted
//! coordinates are always multiples of the active grid step. Gesture previews
//! may carry unsnapped values; they are snapped on commit.

use crate::error::{Error, Result};

/// Default grid step of the dashboard canvas.
pub const DEFAULT_GRID_STEP: f64 = 20.0;

/// Round `value` to the nearest multiple of `step`.
///
/// Halfway values round away from zero (`snap(10.0, 20.0) == 20.0`).
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `step` is not a finite positive number
/// or `value` is not finite.
pub fn snap(value: f64, step: f64) -> Result<f64> {
    validate_step(step)?;
    if !value.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "cannot snap non-finite value {value}"
        )));
    }
    let snapped = (value / step).round() * step;
    // Normalize -0.0 so snapped values compare and serialize cleanly.
    Ok(if snapped == 0.0 { 0.0 } else { snapped })
}

/// [`snap`] with the default grid step.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `value` is not finite.
pub fn snap_default(value: f64) -> Result<f64> {
    snap(value, DEFAULT_GRID_STEP)
}

/// Check that `step` is usable as a grid step.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] unless `step` is finite and `> 0`.
pub fn validate_step(step: f64) -> Result<()> {
    if step.is_finite() && step > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "grid step must be a positive finite number, got {step}"
        )))
    }
}

/// Whether `value` already sits on the grid.
#[must_use]
pub fn is_on_grid(value: f64, step: f64) -> bool {
    snap(value, step).is_ok_and(|s| s == value)
}
