//! Bezier tessellation geometry: cubic curves, control patches, flatness and
//! corner normals.

pub mod bezier;
pub mod flatness;
pub mod normal;
pub mod patch;

pub use bezier::{CubicBezier, Split};
pub use flatness::{flatness, line_distance2, straightness};
pub use normal::{Neighborhood, NormalEstimate, NormalEstimator, NormalOrder};
pub use patch::{ControlPatch, Quadrants};
