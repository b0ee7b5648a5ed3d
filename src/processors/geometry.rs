//! Geometric measures over axis-aligned boxes.
//!
//! Pure functions shared by every pipeline stage: intersection-over-union,
//! directional containment, and compactness. All of them work on integer
//! pixel boxes and return `f32` ratios.

use crate::domain::BBox;
use std::f32::consts::PI;

/// Intersection-over-union of two boxes.
///
/// Returns 0.0 when the boxes do not intersect; symmetric in its
/// arguments.
pub fn overlap_ratio(a: &BBox, b: &BBox) -> f32 {
    let Some(inter) = a.intersection(b) else {
        return 0.0;
    };
    let intersection = inter.area_px();
    let union = a.area_px() + b.area_px() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f32 / union as f32
}

/// Fraction of `a`'s area covered by the intersection with `b`.
///
/// "a is inside b" when this exceeds the caller's containment threshold.
/// Not symmetric.
pub fn containment_ratio(a: &BBox, b: &BBox) -> f32 {
    let Some(inter) = a.intersection(b) else {
        return 0.0;
    };
    inter.area_px() as f32 / a.area_px() as f32
}

/// Whether `a` is inside `b` at the given containment threshold.
#[inline]
pub fn is_inside(a: &BBox, b: &BBox, threshold: f32) -> bool {
    containment_ratio(a, b) > threshold
}

/// Compactness (circularity) of a region: `4*pi*area / perimeter^2`.
///
/// 1.0 for a circle, lower for elongated or ragged shapes. Returns `None`
/// when the perimeter is zero, in which case the check is skipped.
pub fn compactness(area: u64, w: u32, h: u32) -> Option<f32> {
    let perimeter = 2 * (w as u64 + h as u64);
    if perimeter == 0 {
        return None;
    }
    Some(4.0 * PI * area as f32 / (perimeter * perimeter) as f32)
}
