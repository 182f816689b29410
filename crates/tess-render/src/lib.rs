//! Render pass around the patch tessellator: scenes, per-frame passes,
//! camera-driven resolution and GPU buffer preparation.

pub mod camera;
pub mod frame;
pub mod pipeline;
pub mod scene;

pub use camera::Camera;
pub use frame::{render_frame, render_view, tessellate_scenes, FrameBudget, FrameStats};
pub use pipeline::{prepare_mesh, CameraUniforms, GpuVertex, IndexBuffer, IndexCapability, RenderMesh};
pub use scene::{PatchScene, ScenePatch};
