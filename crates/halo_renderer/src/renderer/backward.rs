//! Whitted-style backward ray tracing: direct light with shadow rays plus
//! bounded mirror reflection and refraction.

use super::Renderer;
use crate::config::RenderConfig;
use crate::intersection::IntersectionState;
use crate::scene::Scene;
use crate::Color;
use halo_math::{reflect, refract, Ray, Vec3, LARGE_EPSILON};
use std::sync::Arc;

/// Extra per-hit term a wrapping renderer adds on top of direct lighting.
pub(crate) type SurfaceTerm<'t> = &'t (dyn Fn(&IntersectionState<'_>, Vec3) -> Color + Sync);

pub struct BackwardRenderer {
    scene: Arc<Scene>,
    max_reflection_bounces: u32,
    max_refraction_bounces: u32,
}

impl BackwardRenderer {
    pub fn new(scene: Arc<Scene>, config: &RenderConfig) -> Self {
        Self {
            scene,
            max_reflection_bounces: config.max_reflection_bounces,
            max_refraction_bounces: config.max_refraction_bounces,
        }
    }

    /// Fresh state for a camera ray with the full bounce budgets.
    pub fn primary_state<'a>(&self, ray: Ray) -> IntersectionState<'a> {
        IntersectionState::new(ray, self.max_reflection_bounces, self.max_refraction_bounces)
    }

    /// Trace `ray` and shade it, also returning the deepest recursion level
    /// reached (0 when no secondary ray was traced).
    pub(crate) fn sample_with_depth(&self, ray: Ray, extra: SurfaceTerm<'_>) -> (Color, u32) {
        let mut state = self.primary_state(ray);
        let mut deepest = 0;
        let color = self.trace_and_shade(&mut state, 0, &mut deepest, extra);
        (color, deepest)
    }

    fn trace_and_shade<'a>(
        &'a self,
        state: &mut IntersectionState<'a>,
        depth: u32,
        deepest: &mut u32,
        extra: SurfaceTerm<'_>,
    ) -> Color {
        *deepest = (*deepest).max(depth);
        self.scene.trace(state);
        self.shade(state, depth, deepest, extra)
    }

    /// Shade a traced state: ambient, then every light through the material,
    /// then reflection and refraction while their budgets last.
    pub(crate) fn shade(
        &self,
        state: &IntersectionState<'_>,
        depth: u32,
        deepest: &mut u32,
        extra: SurfaceTerm<'_>,
    ) -> Color {
        let Some(hit) = state.hit() else {
            return self.scene.environment().sample(state.ray.direction);
        };
        let material = hit.material;
        let point = state.hit_point();
        let incident = state.ray.direction.normalize_or_zero();
        let to_eye = -incident;
        // Face the normal towards the incoming ray so back faces light up too
        let normal = if hit.front_face { hit.normal } else { -hit.normal };

        let mut color = material.non_light_dependent_term();

        let mut sample_rays = Vec::new();
        for light in self.scene.lights() {
            sample_rays.clear();
            light.compute_sample_rays(&mut sample_rays, point, normal);
            if sample_rays.is_empty() {
                continue;
            }
            let mut light_color = Color::ZERO;
            for ray in &sample_rays {
                if self.scene.is_occluded(ray) {
                    continue;
                }
                let attenuation = light.compute_light_attenuation(point);
                light_color += material.compute_brdf(ray.direction, light.color(), normal, to_eye) * attenuation;
            }
            color += light_color / sample_rays.len() as f32;
        }

        color += extra(state, normal);

        if state.remaining_reflection_bounces > 0 && material.is_reflective() {
            let mut child = state.spawn(Ray::new(point + normal * LARGE_EPSILON, reflect(incident, normal)));
            child.remaining_reflection_bounces -= 1;
            let reflected = self.trace_and_shade(&mut child, depth + 1, deepest, extra);
            color = color.lerp(reflected, material.reflectivity);
        }

        if state.remaining_refraction_bounces > 0 && material.is_transmissive() {
            let (from_ior, to_ior) = if hit.front_face {
                (state.current_ior, material.ior)
            } else {
                (state.current_ior, 1.0)
            };

            let mut child = match refract(incident, normal, from_ior / to_ior) {
                Some(direction) => {
                    let mut child = state.spawn(Ray::new(point - normal * LARGE_EPSILON, direction));
                    child.current_ior = to_ior;
                    child
                }
                // Total internal reflection: stay in the current medium
                None => state.spawn(Ray::new(point + normal * LARGE_EPSILON, reflect(incident, normal))),
            };
            child.remaining_refraction_bounces -= 1;
            let refracted = self.trace_and_shade(&mut child, depth + 1, deepest, extra);
            color = color.lerp(refracted, material.transmittance);
        }

        color
    }
}

/// Adds nothing.
pub(crate) fn no_extra(_: &IntersectionState<'_>, _: Vec3) -> Color {
    Color::ZERO
}

impl Renderer for BackwardRenderer {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn compute_sample_color(&self, state: &IntersectionState<'_>) -> Color {
        let mut deepest = 0;
        self.shade(state, 0, &mut deepest, &no_extra)
    }

    fn sample_ray(&self, ray: Ray) -> Color {
        self.sample_with_depth(ray, &no_extra).0
    }
}
