//! Patch scenes: the set of patches, materials and light drawn each frame.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tess_core::traits::{BoundingBox, Validate};
use tess_core::{Result, TessError};
use tess_geometry::ControlPatch;
use tess_math::{Aabb3, DVec3};
use tess_mesh::{BlinnPhong, Light, Material};

/// One patch and the material slot it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePatch {
    #[serde(rename = "points")]
    pub patch: ControlPatch,
    #[serde(default)]
    pub material: u32,
}

/// A scene of Bezier patches.
///
/// When `materials` is empty every patch is drawn with
/// [`Material::default`], and only material slot 0 is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchScene {
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub light: Light,
    /// Global ambient light colour.
    #[serde(default = "default_ambient")]
    pub ambient: DVec3,
    #[serde(default)]
    pub patches: Vec<ScenePatch>,
}

fn default_ambient() -> DVec3 {
    DVec3::ONE
}

impl PatchScene {
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
            light: Light::default(),
            ambient: default_ambient(),
            patches: Vec::new(),
        }
    }

    /// Add a material and return its slot.
    pub fn add_material(&mut self, material: Material) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    pub fn add_patch(&mut self, patch: ControlPatch, material: u32) {
        self.patches.push(ScenePatch { patch, material });
    }

    /// Parse a scene from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let scene: Self =
            serde_json::from_str(json).map_err(|e| TessError::Parse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TessError::Parse(e.to_string()))
    }

    /// Material for slot `index`.
    pub fn material(&self, index: u32) -> Result<Material> {
        if self.materials.is_empty() && index == 0 {
            return Ok(Material::default());
        }
        self.materials
            .get(index as usize)
            .copied()
            .ok_or_else(|| {
                TessError::NotFound(format!(
                    "material {index} (scene has {})",
                    self.materials.len()
                ))
            })
    }

    /// Shader for a scene patch.
    pub fn shader(&self, patch: &ScenePatch) -> Result<BlinnPhong> {
        Ok(BlinnPhong {
            material: self.material(patch.material)?,
            light: self.light,
            ambient_light: self.ambient,
        })
    }

    /// Bounds of all control points; the surface lies inside them.
    pub fn bounds(&self) -> Option<Aabb3> {
        self.patches
            .iter()
            .map(|sp| {
                let (min, max) = sp.patch.bounding_box();
                Aabb3::new(min, max)
            })
            .reduce(|a, b| a.merge(&b))
    }
}

impl Default for PatchScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Validate for PatchScene {
    fn validate(&self) -> Result<()> {
        for (i, sp) in self.patches.iter().enumerate() {
            sp.patch
                .validate()
                .map_err(|e| TessError::InvalidInput(format!("patch {i}: {e}")))?;
            self.material(sp.material)?;
        }
        Ok(())
    }
}
