//! Adaptive tessellation of Bezier patches into shaded triangle meshes.

pub mod adaptive;
pub mod mesh;
pub mod params;
pub mod shading;

pub use adaptive::{tessellate_patch, EdgeFlags, TessellationStats};
pub use mesh::{PatchMesh, Vertex};
pub use params::TessellationParams;
pub use shading::{shade, BlinnPhong, Light, Material, Shader};
