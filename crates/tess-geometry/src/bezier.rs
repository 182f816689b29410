//! Cubic Bezier curves and De Casteljau subdivision at the parameter midpoint.

use serde::{Deserialize, Serialize};
use tess_core::{Result, TessError};
use tess_math::{midpoint, Point3};

use crate::flatness::{line_distance2, straightness};

/// The six intermediate points of a De Casteljau split at `t = 0.5`.
///
/// For a curve `(z0, c0, c1, z1)` the first half is `(z0, m0, m3, m5)` and the
/// second half is `(m5, m4, m2, z1)`. `m5` is the curve point at `t = 0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub m0: Point3,
    pub m1: Point3,
    pub m2: Point3,
    pub m3: Point3,
    pub m4: Point3,
    pub m5: Point3,
}

impl Split {
    /// Split the cubic with control points `z0, c0, c1, z1`.
    #[inline]
    pub fn new(z0: Point3, c0: Point3, c1: Point3, z1: Point3) -> Self {
        let m0 = midpoint(z0, c0);
        let m1 = midpoint(c0, c1);
        let m2 = midpoint(c1, z1);
        let m3 = midpoint(m0, m1);
        let m4 = midpoint(m1, m2);
        let m5 = midpoint(m3, m4);
        Self {
            m0,
            m1,
            m2,
            m3,
            m4,
            m5,
        }
    }
}

/// A cubic Bezier curve `(z0, c0, c1, z1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub points: [Point3; 4],
}

impl CubicBezier {
    pub fn new(z0: Point3, c0: Point3, c1: Point3, z1: Point3) -> Self {
        Self {
            points: [z0, c0, c1, z1],
        }
    }

    /// Build a curve from exactly four control points.
    pub fn from_slice(points: &[Point3]) -> Result<Self> {
        let points: [Point3; 4] = points.try_into().map_err(|_| {
            TessError::InvalidInput(format!(
                "cubic curve needs 4 control points, got {}",
                points.len()
            ))
        })?;
        Ok(Self { points })
    }

    pub fn start(&self) -> Point3 {
        self.points[0]
    }

    pub fn end(&self) -> Point3 {
        self.points[3]
    }

    /// Evaluate the curve at `t` using the Bernstein form.
    pub fn point_at(&self, t: f64) -> Point3 {
        let [b0, b1, b2, b3] = bernstein(t);
        let [z0, c0, c1, z1] = self.points;
        b0 * z0 + b1 * c0 + b2 * c1 + b3 * z1
    }

    pub fn split(&self) -> Split {
        let [z0, c0, c1, z1] = self.points;
        Split::new(z0, c0, c1, z1)
    }

    /// The two half curves covering `[0, 0.5]` and `[0.5, 1]`.
    pub fn halves(&self) -> (CubicBezier, CubicBezier) {
        let s = self.split();
        let [z0, _, _, z1] = self.points;
        (
            CubicBezier::new(z0, s.m0, s.m3, s.m5),
            CubicBezier::new(s.m5, s.m4, s.m2, z1),
        )
    }

    /// Squared deviation of the inner control points from the evenly spaced
    /// chord positions.
    pub fn straightness(&self) -> f64 {
        let [z0, c0, c1, z1] = self.points;
        straightness(z0, c0, c1, z1)
    }

    /// Squared perpendicular distance of the inner control points from the chord.
    pub fn line_distance2(&self) -> f64 {
        let [z0, c0, c1, z1] = self.points;
        line_distance2(z0, c0, c1, z1)
    }
}

/// Cubic Bernstein basis at `t`.
#[inline]
pub(crate) fn bernstein(t: f64) -> [f64; 4] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * s * s * t, 3.0 * s * t * t, t * t * t]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec3;
    use proptest::prelude::*;

    fn x_axis_curve() -> CubicBezier {
        CubicBezier::new(
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(3.0, 0.0, 0.0),
        )
    }

    #[test]
    fn test_split_collinear_curve() {
        let s = x_axis_curve().split();
        assert_eq!(s.m0, dvec3(0.5, 0.0, 0.0));
        assert_eq!(s.m3, dvec3(1.0, 0.0, 0.0));
        assert_eq!(s.m5, dvec3(1.5, 0.0, 0.0));
        assert_eq!(s.m4, dvec3(2.0, 0.0, 0.0));
        assert_eq!(s.m2, dvec3(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_halves_of_collinear_curve() {
        let (a, b) = x_axis_curve().halves();
        let xs = |c: CubicBezier| c.points.map(|p| p.x);
        assert_eq!(xs(a), [0.0, 0.5, 1.0, 1.5]);
        assert_eq!(xs(b), [1.5, 2.0, 2.5, 3.0]);
        assert_eq!(a.end(), b.start());
    }

    #[test]
    fn test_from_slice_wrong_count() {
        let pts = [dvec3(0.0, 0.0, 0.0); 3];
        let err = CubicBezier::from_slice(&pts).unwrap_err();
        assert!(format!("{err}").contains("got 3"));
        assert!(CubicBezier::from_slice(&[dvec3(1.0, 2.0, 3.0); 4]).is_ok());
    }

    #[test]
    fn test_split_midpoint_is_curve_point() {
        let curve = CubicBezier::new(
            dvec3(0.0, 0.0, 0.0),
            dvec3(0.0, 2.0, 1.0),
            dvec3(3.0, 2.0, -1.0),
            dvec3(4.0, 0.0, 0.0),
        );
        let mid = curve.point_at(0.5);
        let s = curve.split();
        assert_relative_eq!(s.m5.x, mid.x, epsilon = 1e-12);
        assert_relative_eq!(s.m5.y, mid.y, epsilon = 1e-12);
        assert_relative_eq!(s.m5.z, mid.z, epsilon = 1e-12);
    }

    #[test]
    fn test_straight_curve_metrics_are_zero() {
        let curve = x_axis_curve();
        assert_eq!(curve.straightness(), 0.0);
        assert_eq!(curve.line_distance2(), 0.0);
    }

    proptest! {
        #[test]
        fn halves_reparametrise_the_curve(
            coords in proptest::array::uniform12(-10.0f64..10.0),
            t in 0.0f64..1.0,
        ) {
            let p = |i: usize| dvec3(coords[3 * i], coords[3 * i + 1], coords[3 * i + 2]);
            let curve = CubicBezier::new(p(0), p(1), p(2), p(3));
            let (first, second) = curve.halves();
            let expected_first = curve.point_at(0.5 * t);
            let expected_second = curve.point_at(0.5 + 0.5 * t);
            prop_assert!((first.point_at(t) - expected_first).length() < 1e-9);
            prop_assert!((second.point_at(t) - expected_second).length() < 1e-9);
        }
    }
}
