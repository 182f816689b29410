//! Vertex and index accumulation for one tessellation pass.

use tess_core::traits::Validate;
use tess_core::{Result, TessError};
use tess_math::{Point3, Rgba, Vector3};

/// One emitted vertex: position, shaded colour, normal and material slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3,
    pub color: Rgba,
    pub normal: Vector3,
    pub material: u32,
}

/// Per-frame mesh accumulator filled by the tessellator.
///
/// Vertex attributes live in parallel sequences indexed by the `u32` handle
/// returned from [`PatchMesh::emit_vertex`]. Call [`PatchMesh::reset`] before
/// each full scene pass.
#[derive(Debug, Clone, Default)]
pub struct PatchMesh {
    pub positions: Vec<Point3>,
    pub colors: Vec<Rgba>,
    pub normals: Vec<Vector3>,
    pub materials: Vec<u32>,
    pub indices: Vec<u32>,
}

impl PatchMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest number of vertices addressable with `u32` indices.
    pub const MAX_VERTICES: usize = u32::MAX as usize + 1;

    /// Append a vertex and return its index in emission order.
    ///
    /// # Errors
    /// Returns [`TessError::IndexOverflow`] once the mesh already holds
    /// [`PatchMesh::MAX_VERTICES`] vertices. The mesh is left unchanged.
    pub fn emit_vertex(&mut self, vertex: Vertex) -> Result<u32> {
        let index = next_index(self.positions.len())?;
        self.positions.push(vertex.position);
        self.colors.push(vertex.color);
        self.normals.push(vertex.normal);
        self.materials.push(vertex.material);
        Ok(index)
    }

    pub fn emit_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Clear all sequences; the next emitted vertex gets index 0.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.normals.clear();
        self.materials.clear();
        self.indices.clear();
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Positions as 3 floats per vertex.
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| p.as_vec3().to_array())
            .collect()
    }

    /// Colours as 4 floats per vertex.
    pub fn flat_colors(&self) -> Vec<f32> {
        self.colors
            .iter()
            .flat_map(|c| c.as_vec4().to_array())
            .collect()
    }

    /// Normals as 3 floats per vertex.
    pub fn flat_normals(&self) -> Vec<f32> {
        self.normals
            .iter()
            .flat_map(|n| n.as_vec3().to_array())
            .collect()
    }
}

fn next_index(vertex_count: usize) -> Result<u32> {
    u32::try_from(vertex_count).map_err(|_| TessError::IndexOverflow {
        vertices: vertex_count + 1,
        max: PatchMesh::MAX_VERTICES,
    })
}

impl Validate for PatchMesh {
    /// Every attribute sequence has one entry per vertex and every index
    /// refers to an emitted vertex.
    fn validate(&self) -> Result<()> {
        let n = self.positions.len();
        for (name, len) in [
            ("colors", self.colors.len()),
            ("normals", self.normals.len()),
            ("materials", self.materials.len()),
        ] {
            if len != n {
                return Err(TessError::Geometry(format!(
                    "{name} has {len} entries for {n} vertices"
                )));
            }
        }
        if self.indices.len() % 3 != 0 {
            return Err(TessError::Geometry(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(TessError::Geometry(format!(
                "index {bad} out of bounds (n={n})"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tess_math::DVec3;

    fn vertex(x: f64, y: f64) -> Vertex {
        Vertex {
            position: DVec3::new(x, y, 0.0),
            color: Rgba::new(1.0, 0.5, 0.25, 1.0),
            normal: DVec3::Z,
            material: 0,
        }
    }

    fn single_triangle() -> PatchMesh {
        let mut mesh = PatchMesh::new();
        let a = mesh.emit_vertex(vertex(0.0, 0.0)).unwrap();
        let b = mesh.emit_vertex(vertex(1.0, 0.0)).unwrap();
        let c = mesh.emit_vertex(vertex(0.0, 1.0)).unwrap();
        mesh.emit_triangle(a, b, c);
        mesh
    }

    #[test]
    fn test_emit_assigns_sequential_indices() {
        let mut mesh = PatchMesh::new();
        assert_eq!(mesh.emit_vertex(vertex(0.0, 0.0)).unwrap(), 0);
        assert_eq!(mesh.emit_vertex(vertex(1.0, 0.0)).unwrap(), 1);
        assert_eq!(mesh.emit_vertex(vertex(2.0, 0.0)).unwrap(), 2);
    }

    #[test]
    fn test_vertex_and_triangle_count() {
        let mesh = single_triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_reset_restarts_indices() {
        let mut mesh = single_triangle();
        mesh.reset();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.emit_vertex(vertex(5.0, 5.0)).unwrap(), 0);
    }

    #[test]
    fn test_flat_buffers() {
        let mesh = single_triangle();
        let positions = mesh.flat_positions();
        let colors = mesh.flat_colors();
        let normals = mesh.flat_normals();
        assert_eq!(positions.len(), 3 * mesh.vertex_count());
        assert_eq!(colors.len(), 4 * mesh.vertex_count());
        assert_eq!(normals.len(), 3 * mesh.vertex_count());
        assert_eq!(&positions[3..6], &[1.0, 0.0, 0.0]);
        assert_eq!(&colors[0..4], &[1.0, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn test_index_past_u32_range_overflows() {
        assert_eq!(next_index(0).unwrap(), 0);
        assert_eq!(next_index(u32::MAX as usize).unwrap(), u32::MAX);
        let err = next_index(PatchMesh::MAX_VERTICES).unwrap_err();
        assert!(matches!(
            err,
            TessError::IndexOverflow { max, .. } if max == PatchMesh::MAX_VERTICES
        ));
    }

    #[test]
    fn test_validate_catches_bad_index() {
        let mut mesh = single_triangle();
        mesh.emit_triangle(0, 1, 7);
        let err = mesh.validate().unwrap_err();
        assert!(format!("{err}").contains("index 7 out of bounds"));
    }

    #[test]
    fn test_validate_catches_ragged_attributes() {
        let mut mesh = single_triangle();
        mesh.colors.pop();
        assert!(mesh.validate().is_err());
    }
}
