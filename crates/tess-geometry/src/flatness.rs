//! Flatness metrics deciding whether a patch can be drawn as two triangles.
//!
//! All distances are squared so they compare directly against the squared
//! resolution threshold.

use tess_math::{abs2, unit, Plane, Point3};

use crate::normal::{Neighborhood, NormalEstimator};
use crate::patch::ControlPatch;

/// Control curves whose straightness bounds the patch flatness: the four
/// boundary curves followed by the four interior ones.
const CONTROL_CURVES: [[usize; 4]; 8] = [
    [0, 1, 2, 3],
    [0, 4, 8, 12],
    [3, 7, 11, 15],
    [12, 13, 14, 15],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
];

/// Neighbourhood of `p0` used for the tangent plane in the flatness test.
pub const CORNER0_NEIGHBORHOOD: [usize; 7] = [3, 2, 1, 0, 4, 8, 12];

/// Maximum squared distance of `c0` and `c1` from the evenly spaced chord
/// positions `z0 + (z1 - z0)/3` and `z1 - (z1 - z0)/3`.
pub fn straightness(z0: Point3, c0: Point3, c1: Point3, z1: Point3) -> f64 {
    let v = (z1 - z0) / 3.0;
    abs2(c0 - v - z0).max(abs2(z1 - v - c1))
}

/// Maximum squared perpendicular distance of `c0` and `c1` from the line
/// through `z0` and `z1`.
pub fn line_distance2(z0: Point3, c0: Point3, c1: Point3, z1: Point3) -> f64 {
    let q = unit(z1 - z0);
    let a = c0 - z0;
    let b = c1 - z0;
    abs2(a - a.dot(q) * q).max(abs2(b - b.dot(q) * q))
}

/// Squared deviation of `patch` from a planar quad with straight edges.
///
/// The maximum of the distance of `p15` from the tangent plane at `p0` and the
/// straightness of all eight control curves.
pub fn flatness(patch: &ControlPatch, estimator: &NormalEstimator) -> f64 {
    let n = estimator.normal(&Neighborhood::from_patch(patch, CORNER0_NEIGHBORHOOD));
    let plane = Plane::from_unit_normal(patch[0], n);

    CONTROL_CURVES
        .iter()
        .map(|&[a, b, c, d]| straightness(patch[a], patch[b], patch[c], patch[d]))
        .fold(plane.distance2(patch[15]), f64::max)
}
