//! Grid snapping.

use sketchkit_core::Point;

/// Snaps `value` to the nearest multiple of `spacing`; exact halves round up.
/// A non-positive spacing leaves the value unchanged.
pub fn snap(value: f64, spacing: f64) -> f64 {
    if spacing <= 0.0 || !spacing.is_finite() {
        return value;
    }
    let remainder = value.rem_euclid(spacing);
    if remainder == 0.0 {
        value
    } else if remainder < spacing / 2.0 {
        value - remainder
    } else {
        value - remainder + spacing
    }
}

pub fn snap_point(p: Point, spacing: f64) -> Point {
    Point::new(snap(p.x, spacing), snap(p.y, spacing))
}
