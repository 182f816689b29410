use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use tess_core::{Result, TessError};
use tess_mesh::PatchMesh;

use crate::camera::Camera;

/// Vertex with f32 data packed for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub material: u32,
}

/// What the device can draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCapability {
    /// Whether 32-bit element indices are available.
    pub supports_u32: bool,
}

impl Default for IndexCapability {
    fn default() -> Self {
        Self { supports_u32: true }
    }
}

/// Triangle indices in the narrowest format the device accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Largest vertex count addressable with 16-bit indices.
    pub const U16_MAX_VERTICES: usize = u16::MAX as usize + 1;

    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of one index in bytes.
    pub fn stride(&self) -> usize {
        match self {
            Self::U16(_) => 2,
            Self::U32(_) => 4,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U16(v) => bytemuck::cast_slice(v),
            Self::U32(v) => bytemuck::cast_slice(v),
        }
    }

    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Self::U16(v) => v.get(i).map(|&x| u32::from(x)),
            Self::U32(v) => v.get(i).copied(),
        }
    }
}

/// Prepared render data ready for GPU upload.
#[derive(Debug, Clone)]
pub struct RenderMesh {
    pub vertices: Vec<GpuVertex>,
    pub indices: IndexBuffer,
}

impl RenderMesh {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        self.indices.as_bytes()
    }
}

/// Convert a tessellated mesh to GPU-ready buffers.
///
/// Uses 32-bit indices when `capability` allows, otherwise 16-bit ones and
/// fails with [`TessError::IndexOverflow`] if the mesh is too large for them.
pub fn prepare_mesh(mesh: &PatchMesh, capability: IndexCapability) -> Result<RenderMesh> {
    let vertex_count = mesh.vertex_count();

    let indices = if capability.supports_u32 {
        IndexBuffer::U32(mesh.indices.clone())
    } else if vertex_count > IndexBuffer::U16_MAX_VERTICES {
        return Err(TessError::IndexOverflow {
            vertices: vertex_count,
            max: IndexBuffer::U16_MAX_VERTICES,
        });
    } else {
        let narrow = mesh
            .indices
            .iter()
            .map(|&i| {
                u16::try_from(i).map_err(|_| {
                    TessError::Geometry(format!("index {i} exceeds 16-bit range"))
                })
            })
            .collect::<Result<Vec<u16>>>()?;
        IndexBuffer::U16(narrow)
    };

    let vertices = mesh
        .positions
        .iter()
        .zip(&mesh.colors)
        .zip(&mesh.normals)
        .zip(&mesh.materials)
        .map(|(((p, c), n), &material)| GpuVertex {
            position: p.as_vec3().to_array(),
            color: c.as_vec4().to_array(),
            normal: n.as_vec3().to_array(),
            material,
        })
        .collect();

    Ok(RenderMesh { vertices, indices })
}

/// Uniform buffer for camera matrices, column-major.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_projection: [[f32; 4]; 4],
    pub eye_position: [f32; 4],
}

impl CameraUniforms {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view_matrix().as_mat4().to_cols_array_2d(),
            projection: camera.projection_matrix().as_mat4().to_cols_array_2d(),
            view_projection: camera.view_projection().as_mat4().to_cols_array_2d(),
            eye_position: camera.eye.as_vec3().extend(1.0).to_array(),
        }
    }
}
