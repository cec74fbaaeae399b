//! Blinn-Phong surface material.

use halo_math::Vec3;
use serde::{Deserialize, Serialize};

/// Color type alias (linear RGB, not bounded to [0, 1])
pub type Color = Vec3;

/// Blinn-Phong material with optional mirror reflection and transmission.
///
/// Shared between every triangle of a mesh through an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Lambertian reflectance per channel
    pub diffuse: Color,
    /// Specular color of the Blinn-Phong lobe
    pub specular: Color,
    /// Blinn-Phong exponent
    pub shininess: f32,
    /// Light-independent term added to every shaded sample
    pub ambient: Color,
    /// Fraction of the final color taken from the mirrored ray, in [0, 1]
    pub reflectivity: f32,
    /// Fraction of the final color taken from the refracted ray, in [0, 1]
    pub transmittance: f32,
    /// Index of refraction of the medium behind the surface
    pub ior: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Color::splat(0.5),
            specular: Color::ZERO,
            shininess: 1.0,
            ambient: Color::ZERO,
            reflectivity: 0.0,
            transmittance: 0.0,
            ior: 1.0,
        }
    }
}

impl Material {
    /// Create a purely diffuse material.
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse: color,
            ..Default::default()
        }
    }

    pub fn with_specular(mut self, specular: Color, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity.clamp(0.0, 1.0);
        self
    }

    pub fn with_transmittance(mut self, transmittance: f32, ior: f32) -> Self {
        self.transmittance = transmittance.clamp(0.0, 1.0);
        self.ior = ior;
        self
    }

    pub fn base_diffuse_reflection(&self) -> Color {
        self.diffuse
    }

    pub fn is_reflective(&self) -> bool {
        self.reflectivity > 0.0
    }

    pub fn is_transmissive(&self) -> bool {
        self.transmittance > 0.0
    }

    /// Ambient contribution, independent of any light.
    pub fn non_light_dependent_term(&self) -> Color {
        self.ambient
    }

    /// Light reflected towards `to_eye` from a light of color `light_color`
    /// arriving along `to_light`. All vectors are unit length; `normal`
    /// faces the viewer.
    pub fn compute_brdf(&self, to_light: Vec3, light_color: Color, normal: Vec3, to_eye: Vec3) -> Color {
        let n_dot_l = normal.dot(to_light).max(0.0);
        if n_dot_l <= 0.0 {
            return Color::ZERO;
        }
        let diffuse = self.diffuse * n_dot_l;

        let specular = if self.specular.max_element() > 0.0 {
            let half = (to_light + to_eye).normalize_or_zero();
            self.specular * normal.dot(half).max(0.0).powf(self.shininess)
        } else {
            Color::ZERO
        };

        light_color * (diffuse + specular)
    }
}
