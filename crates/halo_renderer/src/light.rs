//! Light sources.

use crate::sampling::random_unit_vector;
use crate::Color;
use halo_math::{Ray, Vec3, LARGE_EPSILON};
use rand::RngCore;

/// An idealised point emitter with no distance falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
}

impl PointLight {
    pub const fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }

    /// Append a shadow ray from `origin` (pushed off the surface along
    /// `normal`) towards the light.
    ///
    /// The ray direction is unit length and `max_t` is the distance to the
    /// light, so any hit on it is an occluder.
    pub fn compute_sample_rays(&self, out: &mut Vec<Ray>, origin: Vec3, normal: Vec3) {
        let start = origin + normal * LARGE_EPSILON;
        let to_light = self.position - start;
        let distance = to_light.length();
        if let Some(direction) = to_light.try_normalize() {
            out.push(Ray::bounded(start, direction, distance));
        }
    }

    /// Point lights do not fall off with distance.
    pub fn compute_light_attenuation(&self, _origin: Vec3) -> f32 {
        1.0
    }

    /// Photon ray leaving the light in a uniformly random direction.
    pub fn generate_random_photon_ray(&self, rng: &mut dyn RngCore) -> Ray {
        Ray::new(self.position, random_unit_vector(rng))
    }
}

/// Every light kind a scene can hold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
}

impl Light {
    pub fn color(&self) -> Color {
        match self {
            Light::Point(light) => light.color,
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            Light::Point(light) => light.position,
        }
    }

    pub fn compute_sample_rays(&self, out: &mut Vec<Ray>, origin: Vec3, normal: Vec3) {
        match self {
            Light::Point(light) => light.compute_sample_rays(out, origin, normal),
        }
    }

    pub fn compute_light_attenuation(&self, origin: Vec3) -> f32 {
        match self {
            Light::Point(light) => light.compute_light_attenuation(origin),
        }
    }

    pub fn generate_random_photon_ray(&self, rng: &mut dyn RngCore) -> Ray {
        match self {
            Light::Point(light) => light.generate_random_photon_ray(rng),
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}
