//! Bicubic Bezier control patches and their quadrant subdivision.

use std::ops::Index;

use serde::{Deserialize, Serialize};
use tess_core::traits::{BoundingBox, Validate};
use tess_core::{Result, TessError};
use tess_math::{abs2, Point3};

use crate::bezier::{bernstein, Split};

/// A tensor-product cubic Bezier patch.
///
/// `points[4 * row + col]` is the control point in row `row` and column `col`.
/// Points 0, 3, 12 and 15 are the corners. The tessellator walks the corners in
/// the cyclic order `p0, p12, p15, p3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point3>", into = "Vec<Point3>")]
pub struct ControlPatch {
    points: [Point3; 16],
}

/// The four sub-patches produced by one subdivision step.
///
/// Each quadrant keeps the corner layout of its parent: `s0` contains the
/// parent's `p0`, `s1` its `p12`, `s2` its `p15` and `s3` its `p3`. All four
/// meet at the parent's centre point.
#[derive(Debug, Clone, Copy)]
pub struct Quadrants {
    pub s0: ControlPatch,
    pub s1: ControlPatch,
    pub s2: ControlPatch,
    pub s3: ControlPatch,
}

impl ControlPatch {
    pub const CORNERS: [usize; 4] = [0, 12, 15, 3];

    pub fn new(points: [Point3; 16]) -> Self {
        Self { points }
    }

    /// Build a patch from exactly 16 finite control points.
    pub fn from_slice(points: &[Point3]) -> Result<Self> {
        let points: [Point3; 16] = points.try_into().map_err(|_| {
            TessError::InvalidInput(format!(
                "patch needs 16 control points, got {}",
                points.len()
            ))
        })?;
        let patch = Self { points };
        patch.validate()?;
        Ok(patch)
    }

    /// A planar patch spanning the parallelogram `origin + s*u + t*v`,
    /// with control points evenly spaced so every control curve is straight.
    pub fn planar(origin: Point3, u: Point3, v: Point3) -> Self {
        let mut points = [Point3::ZERO; 16];
        for (i, p) in points.iter_mut().enumerate() {
            let row = (i / 4) as f64 / 3.0;
            let col = (i % 4) as f64 / 3.0;
            *p = origin + col * u + row * v;
        }
        Self { points }
    }

    pub fn points(&self) -> &[Point3; 16] {
        &self.points
    }

    /// Evaluate the surface. `u` runs along rows (column index), `v` across
    /// rows (row index).
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        let bu = bernstein(u);
        let bv = bernstein(v);
        let mut p = Point3::ZERO;
        for (row, &wv) in bv.iter().enumerate() {
            for (col, &wu) in bu.iter().enumerate() {
                p += wv * wu * self.points[4 * row + col];
            }
        }
        p
    }

    /// Largest squared distance of any control point from `p0`.
    pub fn spread2(&self) -> f64 {
        let p0 = self.points[0];
        self.points[1..]
            .iter()
            .map(|&p| abs2(p - p0))
            .fold(0.0, f64::max)
    }

    /// Subdivide at the parametric centre into four quadrants.
    pub fn subdivide(&self) -> Quadrants {
        let p = &self.points;

        let c0 = Split::new(p[0], p[1], p[2], p[3]);
        let c1 = Split::new(p[4], p[5], p[6], p[7]);
        let c2 = Split::new(p[8], p[9], p[10], p[11]);
        let c3 = Split::new(p[12], p[13], p[14], p[15]);

        let c4 = Split::new(p[0], p[4], p[8], p[12]);
        let c5 = Split::new(c0.m0, c1.m0, c2.m0, c3.m0);
        let c6 = Split::new(c0.m3, c1.m3, c2.m3, c3.m3);
        let c7 = Split::new(c0.m5, c1.m5, c2.m5, c3.m5);
        let c8 = Split::new(c0.m4, c1.m4, c2.m4, c3.m4);
        let c9 = Split::new(c0.m2, c1.m2, c2.m2, c3.m2);
        let c10 = Split::new(p[3], p[7], p[11], p[15]);

        #[rustfmt::skip]
        let s0 = [
            p[0], c0.m0, c0.m3, c0.m5,
            c4.m0, c5.m0, c6.m0, c7.m0,
            c4.m3, c5.m3, c6.m3, c7.m3,
            c4.m5, c5.m5, c6.m5, c7.m5,
        ];
        #[rustfmt::skip]
        let s1 = [
            c4.m5, c5.m5, c6.m5, c7.m5,
            c4.m4, c5.m4, c6.m4, c7.m4,
            c4.m2, c5.m2, c6.m2, c7.m2,
            p[12], c3.m0, c3.m3, c3.m5,
        ];
        #[rustfmt::skip]
        let s2 = [
            c7.m5, c8.m5, c9.m5, c10.m5,
            c7.m4, c8.m4, c9.m4, c10.m4,
            c7.m2, c8.m2, c9.m2, c10.m2,
            c3.m5, c3.m4, c3.m2, p[15],
        ];
        #[rustfmt::skip]
        let s3 = [
            c0.m5, c0.m4, c0.m2, p[3],
            c7.m0, c8.m0, c9.m0, c10.m0,
            c7.m3, c8.m3, c9.m3, c10.m3,
            c7.m5, c8.m5, c9.m5, c10.m5,
        ];

        Quadrants {
            s0: Self::new(s0),
            s1: Self::new(s1),
            s2: Self::new(s2),
            s3: Self::new(s3),
        }
    }
}

impl Quadrants {
    /// The shared centre point of the parent patch.
    pub fn center(&self) -> Point3 {
        self.s0[15]
    }
}

impl Index<usize> for ControlPatch {
    type Output = Point3;

    fn index(&self, index: usize) -> &Point3 {
        &self.points[index]
    }
}

impl Validate for ControlPatch {
    fn validate(&self) -> Result<()> {
        match self.points.iter().position(|p| !p.is_finite()) {
            Some(i) => Err(TessError::InvalidInput(format!(
                "control point {i} is not finite: {:?}",
                self.points[i]
            ))),
            None => Ok(()),
        }
    }
}

impl BoundingBox for ControlPatch {
    type Point = Point3;

    fn bounding_box(&self) -> (Point3, Point3) {
        self.points[1..]
            .iter()
            .fold((self.points[0], self.points[0]), |(min, max), &p| {
                (min.min(p), max.max(p))
            })
    }
}

impl TryFrom<Vec<Point3>> for ControlPatch {
    type Error = TessError;

    fn try_from(points: Vec<Point3>) -> Result<Self> {
        Self::from_slice(&points)
    }
}

impl From<ControlPatch> for Vec<Point3> {
    fn from(patch: ControlPatch) -> Self {
        patch.points.to_vec()
    }
}
