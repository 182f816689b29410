use crate::{abs2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A plane in 3D space defined by a point and normal.
///
/// The normal is stored as given. Tangent-plane estimates at degenerate patch
/// corners may be the zero vector, in which case every distance is zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3,
    pub normal: Vector3,
}

impl Plane {
    /// Plane through `origin` with an already unit (or zero) `normal`.
    pub fn from_unit_normal(origin: Point3, normal: Vector3) -> Self {
        Self { origin, normal }
    }

    pub fn new(origin: Point3, normal: Vector3) -> Self {
        Self {
            origin,
            normal: crate::unit(normal),
        }
    }

    pub fn xy() -> Self {
        Self::new(Point3::ZERO, Vector3::Z)
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, point: Point3) -> f64 {
        (point - self.origin).dot(self.normal)
    }

    /// Squared perpendicular distance from a point to this plane.
    pub fn distance2(&self, point: Point3) -> f64 {
        let d = self.signed_distance(point);
        d * d
    }

    /// Project a point onto this plane.
    pub fn project_point(&self, point: Point3) -> Point3 {
        if abs2(self.normal) == 0.0 {
            return point;
        }
        point - self.normal * self.signed_distance(point)
    }
}
