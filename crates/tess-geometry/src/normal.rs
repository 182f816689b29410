//! Robust unit normals at patch corners.
//!
//! The first-derivative cross product vanishes at cusps, collapsed edges and
//! other singular corners. The estimator then retries with second- and
//! third-order finite differences taken along the same two control curves,
//! which recovers the orientation the surface approaches at that corner.

use tess_core::Tolerance;
use tess_math::{abs2, unit, Point3, Vector3};
use tracing::trace;

use crate::patch::ControlPatch;

/// Which derivative order produced a normal estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NormalOrder {
    First,
    Second,
    Third,
}

/// Seven control points through a corner: three along each boundary curve.
///
/// `left1..left3` walk away from `middle` along one curve and `right1..right3`
/// along the other. The estimated normal is `right x left` oriented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighborhood {
    pub left3: Point3,
    pub left2: Point3,
    pub left1: Point3,
    pub middle: Point3,
    pub right1: Point3,
    pub right2: Point3,
    pub right3: Point3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalEstimate {
    /// Unit normal, or the zero vector when every order degenerates.
    pub normal: Vector3,
    pub order: NormalOrder,
}

/// Normal estimator carrying the degeneracy epsilon of one top-level patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalEstimator {
    epsilon: f64,
}

impl Neighborhood {
    pub fn new(
        left3: Point3,
        left2: Point3,
        left1: Point3,
        middle: Point3,
        right1: Point3,
        right2: Point3,
        right3: Point3,
    ) -> Self {
        Self {
            left3,
            left2,
            left1,
            middle,
            right1,
            right2,
            right3,
        }
    }

    /// Gather a neighbourhood from patch indices in
    /// `left3, left2, left1, middle, right1, right2, right3` order.
    pub fn from_patch(patch: &ControlPatch, [l3, l2, l1, m, r1, r2, r3]: [usize; 7]) -> Self {
        Self::new(
            patch[l3], patch[l2], patch[l1], patch[m], patch[r1], patch[r2], patch[r3],
        )
    }
}

impl NormalEstimator {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Estimator whose epsilon scales with the patch's coordinate spread.
    pub fn for_patch(patch: &ControlPatch, tolerance: Tolerance) -> Self {
        Self::new(tolerance.degeneracy_epsilon(patch.spread2()))
    }

    pub fn estimate(&self, nb: &Neighborhood) -> NormalEstimate {
        let d = Derivatives::new(nb);

        for order in [NormalOrder::First, NormalOrder::Second] {
            let n = d.combination(order);
            if abs2(n) > self.epsilon {
                return NormalEstimate {
                    normal: unit(n),
                    order,
                };
            }
        }

        let normal = unit(d.combination(NormalOrder::Third));
        if normal == Vector3::ZERO {
            trace!(middle = ?nb.middle, "normal degenerate through third order");
        }
        NormalEstimate {
            normal,
            order: NormalOrder::Third,
        }
    }

    pub fn normal(&self, nb: &Neighborhood) -> Vector3 {
        self.estimate(nb).normal
    }

    /// Try each neighbourhood in turn, keeping the first whose first-order
    /// cross product is non-degenerate. Otherwise the last candidate's
    /// estimate is returned, whatever its order.
    pub fn normal_with_fallbacks(&self, candidates: &[Neighborhood]) -> Vector3 {
        let mut normal = Vector3::ZERO;
        for nb in candidates {
            let est = self.estimate(nb);
            normal = est.normal;
            if est.order == NormalOrder::First {
                break;
            }
        }
        normal
    }
}

/// Finite-difference derivative approximations along both curves.
struct Derivatives {
    lp: Vector3,
    rp: Vector3,
    lpp: Vector3,
    rpp: Vector3,
    lppp: Vector3,
    rppp: Vector3,
}

impl Derivatives {
    fn new(nb: &Neighborhood) -> Self {
        let m = nb.middle;
        Self {
            lp: nb.left1 - m,
            rp: nb.right1 - m,
            lpp: m + nb.left2 - 2.0 * nb.left1,
            rpp: m + nb.right2 - 2.0 * nb.right1,
            lppp: nb.left3 - m + 3.0 * (nb.left1 - nb.left2),
            rppp: nb.right3 - m + 3.0 * (nb.right1 - nb.right2),
        }
    }

    fn combination(&self, order: NormalOrder) -> Vector3 {
        match order {
            NormalOrder::First => self.rp.cross(self.lp),
            NormalOrder::Second => self.rpp.cross(self.lp) + self.rp.cross(self.lpp),
            NormalOrder::Third => {
                let a = self.rpp.cross(self.lpp);
                let b = self.rp.cross(self.lppp);
                let c = self.rppp.cross(self.lp);
                let d = self.rppp.cross(self.lpp);
                let e = self.rpp.cross(self.lppp);
                let f = self.rppp.cross(self.lppp);
                9.0 * a + 3.0 * (b + c + d + e) + f
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec3;

    fn flat_corner() -> Neighborhood {
        // left runs along +y, right along +x; right x left = +z
        Neighborhood::new(
            dvec3(0.0, 3.0, 0.0),
            dvec3(0.0, 2.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(3.0, 0.0, 0.0),
        )
    }

    #[test]
    fn test_first_order_normal() {
        let est = NormalEstimator::new(0.0).estimate(&flat_corner());
        assert_eq!(est.order, NormalOrder::First);
        assert_eq!(est.normal, dvec3(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_collapsed_left_tangent_uses_second_order() {
        // left1 coincides with middle: first derivative along left vanishes
        let mut nb = flat_corner();
        nb.left1 = nb.middle;
        let est = NormalEstimator::new(0.0).estimate(&nb);
        assert_eq!(est.order, NormalOrder::Second);
        assert_relative_eq!(est.normal.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(est.normal.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fully_collapsed_corner_uses_third_order() {
        // Both first and second differences along the left curve vanish.
        let mut nb = flat_corner();
        nb.left1 = nb.middle;
        nb.left2 = nb.middle;
        nb.right2 = dvec3(2.0, 0.0, 0.0);
        let est = NormalEstimator::new(0.0).estimate(&nb);
        assert_eq!(est.order, NormalOrder::Third);
        assert_relative_eq!(est.normal.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_points_equal_gives_zero_not_nan() {
        let p = dvec3(1.0, 2.0, 3.0);
        let nb = Neighborhood::new(p, p, p, p, p, p, p);
        let est = NormalEstimator::new(0.0).estimate(&nb);
        assert_eq!(est.order, NormalOrder::Third);
        assert_eq!(est.normal, Vector3::ZERO);
    }

    /// Parallelogram corner with a 1e-3 rad opening angle, scaled by `s`.
    fn skinny_corner(s: f64) -> (NormalEstimator, Neighborhood) {
        let angle: f64 = 1e-3;
        let patch = ControlPatch::planar(
            Point3::ZERO,
            dvec3(s, 0.0, 0.0),
            dvec3(s * angle.cos(), s * angle.sin(), 0.0),
        );
        let est = NormalEstimator::for_patch(&patch, Tolerance::default());
        (est, Neighborhood::from_patch(&patch, [3, 2, 1, 0, 4, 8, 12]))
    }

    #[test]
    fn test_epsilon_is_scale_invariant() {
        let (est, nb) = skinny_corner(1.0);
        let unit_scale = est.estimate(&nb);
        assert_eq!(unit_scale.order, NormalOrder::First);
        assert_relative_eq!(unit_scale.normal.z, -1.0, epsilon = 1e-12);

        for s in [1e-10, 1e6] {
            let (est, nb) = skinny_corner(s);
            let scaled = est.estimate(&nb);
            assert_eq!(scaled.order, unit_scale.order, "scale {s}");
            assert_relative_eq!(scaled.normal.z, unit_scale.normal.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fallback_candidates() {
        let p = dvec3(0.0, 0.0, 0.0);
        let degenerate = Neighborhood::new(p, p, p, p, p, p, p);
        let est = NormalEstimator::new(0.0);
        let n = est.normal_with_fallbacks(&[degenerate, flat_corner()]);
        assert_eq!(n, dvec3(0.0, 0.0, 1.0));
        let n = est.normal_with_fallbacks(&[degenerate, degenerate]);
        assert_eq!(n, Vector3::ZERO);
    }

    #[test]
    fn test_fallback_skips_first_order_degenerate_candidate() {
        // recoverable through second order, but its first-order cross vanishes
        let mut collapsed = flat_corner();
        collapsed.left1 = collapsed.middle;
        // left along +z, right along +x: right x left = -y
        let upright = Neighborhood::new(
            dvec3(0.0, 0.0, 3.0),
            dvec3(0.0, 0.0, 2.0),
            dvec3(0.0, 0.0, 1.0),
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(3.0, 0.0, 0.0),
        );
        let est = NormalEstimator::new(0.0);
        assert_eq!(est.estimate(&collapsed).order, NormalOrder::Second);
        assert_eq!(
            est.normal_with_fallbacks(&[collapsed, upright, upright]),
            dvec3(0.0, -1.0, 0.0)
        );
        // no candidate is first-order: the last one's estimate wins
        let mut collapsed_upright = upright;
        collapsed_upright.left1 = collapsed_upright.middle;
        let n = est.normal_with_fallbacks(&[collapsed_upright, collapsed]);
        assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
    }
}
