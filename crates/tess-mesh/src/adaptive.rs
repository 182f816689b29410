//! Adaptive tessellation of bicubic Bezier patches.
//!
//! Recursively subdivides a patch into quadrants until each piece is flat to
//! within the squared resolution, then emits two triangles per leaf. Corners
//! shared by sibling quadrants are emitted once and reused by index.

use std::ops::AddAssign;

use tess_core::traits::Validate;
use tess_core::Result;
use tess_geometry::{flatness, line_distance2, ControlPatch, Neighborhood, NormalEstimator};
use tess_math::{midpoint, unit, Point3, Vector3};
use tracing::{debug, trace, warn};

use crate::mesh::{PatchMesh, Vertex};
use crate::params::TessellationParams;
use crate::shading::Shader;

/// Corner neighbourhoods for the top-level patch, in `p0, p12, p15, p3` order.
const CORNER_NEIGHBORHOODS: [[usize; 7]; 4] = [
    [3, 2, 1, 0, 4, 8, 12],
    [0, 4, 8, 12, 13, 14, 15],
    [12, 13, 14, 15, 11, 7, 3],
    [15, 11, 7, 3, 2, 1, 0],
];

// Candidate neighbourhoods for the four edge midpoints, looked up in the
// quadrant that owns each midpoint as a corner (s0, s1, s2, s3).
const EDGE0_CANDIDATES: [[usize; 7]; 3] = [
    [0, 4, 8, 12, 13, 14, 15],
    [0, 4, 8, 12, 11, 7, 3],
    [3, 2, 1, 0, 13, 14, 15],
];
const EDGE1_CANDIDATES: [[usize; 7]; 3] = [
    [12, 13, 14, 15, 11, 7, 3],
    [12, 13, 14, 15, 2, 1, 0],
    [0, 4, 8, 12, 11, 7, 3],
];
const EDGE2_CANDIDATES: [[usize; 7]; 3] = [
    [15, 11, 7, 3, 2, 1, 0],
    [15, 11, 7, 3, 4, 8, 12],
    [12, 13, 14, 15, 2, 1, 0],
];
const EDGE3_CANDIDATES: [[usize; 7]; 3] = [
    [3, 2, 1, 0, 4, 8, 12],
    [3, 2, 1, 0, 13, 14, 15],
    [15, 11, 7, 3, 4, 8, 12],
];
/// Centre neighbourhood, taken in `s2` where the centre is `p0`.
const CENTER_NEIGHBORHOOD: [usize; 7] = [3, 2, 1, 0, 4, 8, 12];

/// Per-edge "already found straight" state carried down one recursion path.
///
/// Edges follow the corner cycle: edge 0 runs `p0 -> p12`, edge 1
/// `p12 -> p15`, edge 2 `p15 -> p3` and edge 3 `p3 -> p0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeFlags {
    pub flat0: bool,
    pub flat1: bool,
    pub flat2: bool,
    pub flat3: bool,
}

impl EdgeFlags {
    pub const NONE: Self = Self {
        flat0: false,
        flat1: false,
        flat2: false,
        flat3: false,
    };

    pub fn new(flat0: bool, flat1: bool, flat2: bool, flat3: bool) -> Self {
        Self {
            flat0,
            flat1,
            flat2,
            flat3,
        }
    }
}

/// Counters collected while tessellating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TessellationStats {
    /// Top-level patches tessellated.
    pub patches: usize,
    /// Subdivisions performed; each emits five vertices.
    pub splits: usize,
    /// Leaves emitted as two triangles because they were flat.
    pub flat_leaves: usize,
    /// Leaves emitted as two triangles because the depth ceiling was hit.
    pub depth_limited: usize,
    /// Deepest leaf reached.
    pub max_depth: u32,
}

impl TessellationStats {
    pub fn leaves(&self) -> usize {
        self.flat_leaves + self.depth_limited
    }
}

impl AddAssign for TessellationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.patches += rhs.patches;
        self.splits += rhs.splits;
        self.flat_leaves += rhs.flat_leaves;
        self.depth_limited += rhs.depth_limited;
        self.max_depth = self.max_depth.max(rhs.max_depth);
    }
}

/// A corner already present in the mesh.
#[derive(Debug, Clone, Copy)]
struct Corner {
    index: u32,
    position: Point3,
}

/// Recursion state shared by every call for one top-level patch.
struct PatchTessellator<'a> {
    estimator: NormalEstimator,
    shader: &'a dyn Shader,
    material: u32,
    threshold: f64,
    nudge: f64,
    max_depth: u32,
    mesh: &'a mut PatchMesh,
    stats: TessellationStats,
}

impl<'a> PatchTessellator<'a> {
    fn emit(&mut self, position: Point3, normal: Vector3) -> Result<Corner> {
        let index = self.mesh.emit_vertex(Vertex {
            position,
            color: self.shader.shade(normal),
            normal,
            material: self.material,
        })?;
        Ok(Corner { index, position })
    }

    fn emit_leaf(&mut self, [c0, c1, c2, c3]: [Corner; 4], depth: u32) {
        self.mesh.emit_triangle(c0.index, c1.index, c2.index);
        self.mesh.emit_triangle(c0.index, c2.index, c3.index);
        self.stats.max_depth = self.stats.max_depth.max(depth);
    }

    fn candidates_normal(&self, patch: &ControlPatch, candidates: &[[usize; 7]; 3]) -> Vector3 {
        let hoods = candidates.map(|idx| Neighborhood::from_patch(patch, idx));
        self.estimator.normal_with_fallbacks(&hoods)
    }

    /// Position of the midpoint on one outer edge.
    ///
    /// Returns the position and the flag to hand to the quadrants touching
    /// that edge.
    fn edge_midpoint(
        &self,
        carried: bool,
        ends: (Point3, Point3),
        curve: [Point3; 4],
        exact: Point3,
        facing: Point3,
    ) -> (Point3, bool) {
        if carried {
            return (midpoint(ends.0, ends.1), true);
        }
        let [z0, c0, c1, z1] = curve;
        if line_distance2(z0, c0, c1, z1) < self.threshold {
            let away = unit(exact - facing);
            (midpoint(ends.0, ends.1) + self.nudge * away, true)
        } else {
            (exact, false)
        }
    }

    fn render(
        &mut self,
        p: &ControlPatch,
        corners: [Corner; 4],
        flags: EdgeFlags,
        depth: u32,
    ) -> Result<()> {
        let d = flatness(p, &self.estimator);
        if d < self.threshold {
            self.stats.flat_leaves += 1;
            self.emit_leaf(corners, depth);
            return Ok(());
        }
        if depth >= self.max_depth {
            trace!(depth, flatness = d, "depth ceiling reached, emitting as is");
            self.stats.depth_limited += 1;
            self.emit_leaf(corners, depth);
            return Ok(());
        }
        self.stats.splits += 1;

        let q = p.subdivide();
        let (s0, s1, s2, s3) = (&q.s0, &q.s1, &q.s2, &q.s3);

        let n0 = self.candidates_normal(s0, &EDGE0_CANDIDATES);
        let n1 = self.candidates_normal(s1, &EDGE1_CANDIDATES);
        let n2 = self.candidates_normal(s2, &EDGE2_CANDIDATES);
        let n3 = self.candidates_normal(s3, &EDGE3_CANDIDATES);
        let n4 = self
            .estimator
            .normal(&Neighborhood::from_patch(s2, CENTER_NEIGHBORHOOD));

        let [k0, k1, k2, k3] = corners;
        let (m0, f0) = self.edge_midpoint(
            flags.flat0,
            (k0.position, k1.position),
            [p[0], p[4], p[8], p[12]],
            s0[12],
            s2[3],
        );
        let (m1, f1) = self.edge_midpoint(
            flags.flat1,
            (k1.position, k2.position),
            [p[12], p[13], p[14], p[15]],
            s1[15],
            s3[0],
        );
        let (m2, f2) = self.edge_midpoint(
            flags.flat2,
            (k2.position, k3.position),
            [p[15], p[11], p[7], p[3]],
            s2[3],
            s0[12],
        );
        let (m3, f3) = self.edge_midpoint(
            flags.flat3,
            (k3.position, k0.position),
            [p[3], p[2], p[1], p[0]],
            s3[0],
            s1[15],
        );

        let i0 = self.emit(m0, n0)?;
        let i1 = self.emit(m1, n1)?;
        let i2 = self.emit(m2, n2)?;
        let i3 = self.emit(m3, n3)?;
        let i4 = self.emit(q.center(), n4)?;

        let next = depth + 1;
        self.render(s0, [k0, i0, i4, i3], EdgeFlags::new(f0, false, false, f3), next)?;
        self.render(s1, [i0, k1, i1, i4], EdgeFlags::new(f0, f1, false, false), next)?;
        self.render(s2, [i4, i1, k2, i2], EdgeFlags::new(false, f1, f2, false), next)?;
        self.render(s3, [i3, i4, i2, k3], EdgeFlags::new(false, false, f2, f3), next)
    }
}

/// Adaptively tessellate one patch into `mesh`.
///
/// Emits the four corners, then subdivides until every piece is flatter than
/// `params.threshold()`. Vertices are shaded with `shader` and tagged with
/// `material`.
///
/// # Errors
/// Returns [`tess_core::TessError::InvalidInput`] when `params` are invalid or
/// the patch has a non-finite control point. Nothing is written to `mesh` in
/// that case. Returns [`tess_core::TessError::IndexOverflow`] if the mesh runs
/// out of `u32` vertex indices part way through.
pub fn tessellate_patch(
    patch: &ControlPatch,
    material: u32,
    shader: &dyn Shader,
    params: &TessellationParams,
    mesh: &mut PatchMesh,
) -> Result<TessellationStats> {
    params.validate()?;
    patch.validate()?;

    let estimator = NormalEstimator::for_patch(patch, params.tolerance);
    let mut t = PatchTessellator {
        estimator,
        shader,
        material,
        threshold: params.threshold(),
        nudge: params.nudge(),
        max_depth: params.max_depth,
        mesh,
        stats: TessellationStats {
            patches: 1,
            ..Default::default()
        },
    };

    let mut corners = Vec::with_capacity(4);
    for (&i, &hood) in ControlPatch::CORNERS.iter().zip(&CORNER_NEIGHBORHOODS) {
        let normal = estimator.normal(&Neighborhood::from_patch(patch, hood));
        corners.push(t.emit(patch[i], normal)?);
    }
    t.render(patch, [corners[0], corners[1], corners[2], corners[3]], EdgeFlags::NONE, 0)?;

    let stats = t.stats;
    debug!(
        splits = stats.splits,
        leaves = stats.leaves(),
        max_depth = stats.max_depth,
        "tessellated patch"
    );
    if stats.depth_limited > 0 {
        warn!(
            count = stats.depth_limited,
            max_depth = params.max_depth,
            "patch pieces hit the depth ceiling before becoming flat"
        );
    }
    Ok(stats)
}
