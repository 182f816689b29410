//! Total vector helpers shared by the splitter, estimators and tessellator.
//!
//! None of these fail: a zero vector passes through `unit` unchanged so that
//! degenerate geometry produces a well-defined (zero) direction instead of NaN.

use crate::{Point3, Vector3};

/// Scale `v` to unit length, or return it unchanged when its length is zero.
#[inline]
pub fn unit(v: Vector3) -> Vector3 {
    let norm = v.length();
    if norm != 0.0 {
        v / norm
    } else {
        v
    }
}

/// Squared length of `v`.
#[inline]
pub fn abs2(v: Vector3) -> f64 {
    v.length_squared()
}

#[inline]
pub fn midpoint(a: Point3, b: Point3) -> Point3 {
    0.5 * (a + b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec3;
    use proptest::prelude::*;

    #[test]
    fn test_unit_axis() {
        let n = unit(dvec3(0.0, 0.0, 4.0));
        assert_eq!(n, dvec3(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_unit_zero_is_zero() {
        let n = unit(Vector3::ZERO);
        assert_eq!(n, Vector3::ZERO);
        assert!(!n.is_nan());
    }

    #[test]
    fn test_abs2() {
        assert_relative_eq!(abs2(dvec3(1.0, 2.0, 2.0)), 9.0);
    }

    #[test]
    fn test_midpoint() {
        let m = midpoint(dvec3(0.0, 0.0, 0.0), dvec3(2.0, -4.0, 1.0));
        assert_eq!(m, dvec3(1.0, -2.0, 0.5));
    }

    proptest! {
        #[test]
        fn unit_has_length_one(
            x in -1.0e6f64..1.0e6,
            y in -1.0e6f64..1.0e6,
            z in -1.0e6f64..1.0e6,
        ) {
            let v = dvec3(x, y, z);
            prop_assume!(v.length() > 1e-9);
            prop_assert!((unit(v).length() - 1.0).abs() < 1e-12);
        }

        #[test]
        fn unit_preserves_direction(
            x in -1.0e3f64..1.0e3,
            y in -1.0e3f64..1.0e3,
            z in -1.0e3f64..1.0e3,
        ) {
            let v = dvec3(x, y, z);
            prop_assume!(v.length() > 1e-6);
            prop_assert!(unit(v).cross(v).length() < 1e-9 * v.length());
            prop_assert!(unit(v).dot(v) > 0.0);
        }
    }
}
