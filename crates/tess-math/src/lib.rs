pub mod aabb;
pub mod plane;
pub mod vector;

pub use glam::{DMat4, DVec3, DVec4};
pub use aabb::Aabb3;
pub use plane::Plane;
pub use vector::{abs2, midpoint, unit};

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
/// Linear RGBA colour.
pub type Rgba = DVec4;
