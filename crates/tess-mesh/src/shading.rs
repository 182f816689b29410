//! Vertex shading for tessellated patches.
//!
//! The tessellator only needs a colour for each new normal, so shading is a
//! pure function of the normal. [`BlinnPhong`] lights the patch with one
//! directional light and a viewer looking down `-z` (a headlamp).

use serde::{Deserialize, Serialize};
use tess_math::{unit, DVec3, Rgba, Vector3};

/// Colour source consumed by the tessellator for every emitted vertex.
pub trait Shader: Send + Sync {
    fn shade(&self, normal: Vector3) -> Rgba;
}

impl<F> Shader for F
where
    F: Fn(Vector3) -> Rgba + Send + Sync,
{
    fn shade(&self, normal: Vector3) -> Rgba {
        self(normal)
    }
}

/// Surface reflectance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub emissive: DVec3,
    pub ambient: DVec3,
    pub diffuse: DVec3,
    pub specular: DVec3,
    /// Normalised shininess; the specular exponent is `128 * shininess`.
    pub shininess: f64,
    pub opacity: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            emissive: DVec3::ZERO,
            ambient: DVec3::splat(0.1),
            diffuse: DVec3::splat(0.8),
            specular: DVec3::splat(0.5),
            shininess: 0.25,
            opacity: 1.0,
        }
    }
}

impl Material {
    /// Matte material of the given diffuse colour.
    pub fn diffuse(color: DVec3) -> Self {
        Self {
            diffuse: color,
            specular: DVec3::ZERO,
            ..Default::default()
        }
    }
}

/// A directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    /// Direction from the surface toward the light.
    pub direction: Vector3,
    pub color: DVec3,
    pub brightness: f64,
}

impl Light {
    /// Warm light shining from the viewer along `+z`.
    pub fn headlamp() -> Self {
        Self {
            direction: DVec3::Z,
            color: DVec3::new(1.0, 0.87, 0.745),
            brightness: 1.0,
        }
    }

    pub fn radiance(&self) -> DVec3 {
        self.color * self.brightness
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::headlamp()
    }
}

/// Blinn-Phong colour of a unit normal `n`.
///
/// `emissive + ambient * ambient_light + max(L.n, 0) * diffuse * light`, plus
/// a specular term `max(H.n, 0)^(128 shininess) * specular * light` when the
/// surface faces the light. `H` is the half vector between `L` and `+z`.
pub fn shade(normal: Vector3, light: &Light, material: &Material, ambient_light: DVec3) -> Rgba {
    let l = unit(light.direction);
    let radiance = light.radiance();
    let l_dot_n = l.dot(normal).max(0.0);

    let mut color =
        material.emissive + material.ambient * ambient_light + l_dot_n * material.diffuse * radiance;

    if l_dot_n > 0.0 {
        let h = unit(l + DVec3::Z);
        let f = h.dot(normal).max(0.0).powf(128.0 * material.shininess);
        color += f * material.specular * radiance;
    }

    color.extend(material.opacity)
}

/// Shader combining one material, one light and a global ambient term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinnPhong {
    pub material: Material,
    pub light: Light,
    pub ambient_light: DVec3,
}

impl BlinnPhong {
    pub fn new(material: Material, light: Light) -> Self {
        Self {
            material,
            light,
            ambient_light: DVec3::ONE,
        }
    }
}

impl Shader for BlinnPhong {
    fn shade(&self, normal: Vector3) -> Rgba {
        shade(normal, &self.light, &self.material, self.ambient_light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn white_light() -> Light {
        Light {
            direction: DVec3::Z,
            color: DVec3::ONE,
            brightness: 1.0,
        }
    }

    #[test]
    fn test_facing_light_gets_full_diffuse() {
        let material = Material::diffuse(DVec3::new(0.5, 0.25, 1.0));
        let c = shade(DVec3::Z, &white_light(), &material, DVec3::ZERO);
        assert_relative_eq!(c.x, 0.5);
        assert_relative_eq!(c.y, 0.25);
        assert_relative_eq!(c.z, 1.0);
        assert_relative_eq!(c.w, 1.0);
    }

    #[test]
    fn test_back_facing_gets_only_ambient_and_emissive() {
        let material = Material {
            emissive: DVec3::new(0.1, 0.0, 0.0),
            ambient: DVec3::splat(0.2),
            ..Default::default()
        };
        let c = shade(-DVec3::Z, &white_light(), &material, DVec3::splat(0.5));
        assert_relative_eq!(c.x, 0.2);
        assert_relative_eq!(c.y, 0.1);
        assert_relative_eq!(c.z, 0.1);
    }

    #[test]
    fn test_specular_highlight_on_half_vector() {
        let material = Material {
            ambient: DVec3::ZERO,
            diffuse: DVec3::ZERO,
            specular: DVec3::ONE,
            ..Default::default()
        };
        let c = shade(DVec3::Z, &white_light(), &material, DVec3::ZERO);
        assert_relative_eq!(c.x, 1.0);
    }

    #[test]
    fn test_zero_normal_is_finite() {
        let shader = BlinnPhong::new(Material::default(), Light::headlamp());
        let c = shader.shade(DVec3::ZERO);
        assert!(c.is_finite());
    }

    #[test]
    fn test_brightness_scales_diffuse() {
        let material = Material::diffuse(DVec3::ONE);
        let mut light = white_light();
        light.brightness = 0.5;
        let c = shade(DVec3::Z, &light, &material, DVec3::ZERO);
        assert_relative_eq!(c.x, 0.5);
    }

    #[test]
    fn test_closure_shader() {
        let shader = |n: Vector3| n.abs().extend(1.0);
        assert_eq!(shader.shade(DVec3::X), Rgba::new(1.0, 0.0, 0.0, 1.0));
    }
}
