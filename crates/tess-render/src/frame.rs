//! Per-frame tessellation pass over a scene.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tess_core::traits::Validate;
use tess_core::Result;
use tess_mesh::{tessellate_patch, PatchMesh, TessellationParams, TessellationStats};
use tracing::{debug, warn};

use crate::camera::Camera;
use crate::scene::PatchScene;

/// Upper bound on the work done in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameBudget {
    /// Stop starting new patches once this many triangles were emitted.
    /// A patch already in progress always completes.
    pub max_triangles: Option<usize>,
}

impl FrameBudget {
    pub const UNLIMITED: Self = Self {
        max_triangles: None,
    };

    pub fn triangles(max_triangles: usize) -> Self {
        Self {
            max_triangles: Some(max_triangles),
        }
    }

    fn exhausted(&self, triangles: usize) -> bool {
        self.max_triangles.is_some_and(|max| triangles >= max)
    }
}

/// Summary of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub tessellation: TessellationStats,
    /// Patches not drawn because the budget ran out.
    pub skipped_patches: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Reset `mesh` and tessellate every patch of `scene` into it.
///
/// The scene is validated before anything is emitted. Once `budget` is spent
/// the remaining patches are skipped whole.
pub fn render_frame(
    scene: &PatchScene,
    params: &TessellationParams,
    budget: FrameBudget,
    mesh: &mut PatchMesh,
) -> Result<FrameStats> {
    params.validate()?;
    scene.validate()?;
    mesh.reset();

    let mut stats = FrameStats::default();
    for (i, sp) in scene.patches.iter().enumerate() {
        if budget.exhausted(mesh.triangle_count()) {
            stats.skipped_patches = scene.patches.len() - i;
            warn!(
                skipped = stats.skipped_patches,
                triangles = mesh.triangle_count(),
                "frame budget spent, skipping remaining patches"
            );
            break;
        }
        let shader = scene.shader(sp)?;
        stats.tessellation += tessellate_patch(&sp.patch, sp.material, &shader, params, mesh)?;
    }

    stats.vertices = mesh.vertex_count();
    stats.triangles = mesh.triangle_count();
    debug!(
        patches = stats.tessellation.patches,
        vertices = stats.vertices,
        triangles = stats.triangles,
        "frame tessellated"
    );
    Ok(stats)
}

/// Tessellate a scene at the resolution the camera calls for.
///
/// `pixels` is the allowed surface error in screen pixels.
pub fn render_view(
    scene: &PatchScene,
    camera: &Camera,
    viewport_height: u32,
    pixels: f64,
    base: &TessellationParams,
    budget: FrameBudget,
    mesh: &mut PatchMesh,
) -> Result<FrameStats> {
    let params = TessellationParams {
        resolution: camera.resolution(viewport_height, pixels),
        ..*base
    };
    render_frame(scene, &params, budget, mesh)
}

/// Tessellate independent scenes in parallel, each into its own mesh.
pub fn tessellate_scenes(
    scenes: &[PatchScene],
    params: &TessellationParams,
    budget: FrameBudget,
) -> Vec<Result<(PatchMesh, FrameStats)>> {
    scenes
        .par_iter()
        .map(|scene| -> Result<(PatchMesh, FrameStats)> {
            let mut mesh = PatchMesh::new();
            let stats = render_frame(scene, params, budget, &mut mesh)?;
            Ok((mesh, stats))
        })
        .collect()
}
