//! Photon mapping on top of the backward renderer.
//!
//! Photons are shot from every light before rendering and stored in a frozen
//! kd-tree. Shading adds a photon term to the backward renderer's direct and
//! specular color at each hit.

use super::backward::BackwardRenderer;
use super::Renderer;
use crate::config::{PhotonConfig, PhotonEstimate, RenderConfig};
use crate::error::TracerResult;
use crate::intersection::IntersectionState;
use crate::light::Light;
use crate::photon_map::{Photon, PhotonMap};
use crate::sampling::{cosine_weighted_hemisphere, gen_f32};
use crate::scene::Scene;
use crate::Color;
use halo_math::{Ray, Vec3, LARGE_EPSILON};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::f32::consts::PI;
use std::sync::Arc;

/// Split `budget` photons between `lights` in proportion to the magnitude of
/// their colors.
///
/// Returns `None` when the lights carry no intensity at all.
pub fn photon_counts(lights: &[Light], budget: usize) -> Option<Vec<usize>> {
    let total: f32 = lights.iter().map(|light| light.color().length()).sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }
    Some(
        lights
            .iter()
            .map(|light| (light.color().length() / total * budget as f32).round() as usize)
            .collect(),
    )
}

pub struct PhotonMappingRenderer {
    backward: BackwardRenderer,
    config: PhotonConfig,
    photon_map: PhotonMap,
}

impl PhotonMappingRenderer {
    /// Create the renderer after validating `config`. The photon map stays
    /// empty until [`Renderer::initialize`] runs.
    pub fn new(scene: Arc<Scene>, config: &RenderConfig) -> TracerResult<Self> {
        config.validate()?;
        Ok(Self {
            backward: BackwardRenderer::new(scene, config),
            config: config.photon.clone(),
            photon_map: PhotonMap::empty(),
        })
    }

    pub fn photon_map(&self) -> &PhotonMap {
        &self.photon_map
    }

    /// Shoot every light's share of the photon budget and freeze the result.
    fn emit_photons(&self) -> Vec<Photon> {
        let scene = self.backward.scene();
        let lights = scene.lights();
        let Some(counts) = photon_counts(lights, self.config.total_photon_budget) else {
            log::warn!("Scene has no light intensity, skipping photon emission");
            return Vec::new();
        };

        let mut photons = Vec::new();
        for (light_index, (light, &count)) in lights.iter().zip(&counts).enumerate() {
            if count == 0 {
                continue;
            }
            let energy = light.color() / count as f32;
            let seed = self.config.seed ^ ((light_index as u64) << 40);

            let before = photons.len();
            photons.par_extend((0..count).into_par_iter().flat_map_iter(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let ray = light.generate_random_photon_ray(&mut rng);
                self.trace_photon(ray, energy, &mut rng)
            }));
            log::debug!(
                "Light {} emitted {} photons, {} stored",
                light_index,
                count,
                photons.len() - before
            );
        }
        photons
    }

    /// Follow one photon until it escapes, runs out of bounces or is
    /// absorbed by Russian roulette. Every hit after the first bounce is
    /// recorded.
    fn trace_photon(&self, mut ray: Ray, energy: Color, rng: &mut dyn RngCore) -> Vec<Photon> {
        let scene = self.backward.scene();
        let mut stored = Vec::new();
        let mut bounced = false;

        for _ in 0..=self.config.max_photon_bounces {
            let mut state = IntersectionState::new(ray, 0, 0);
            if !scene.trace(&mut state) {
                break;
            }
            let Some(hit) = state.hit() else {
                break;
            };
            let point = state.hit_point();
            if bounced {
                stored.push(Photon::new(point, energy, ray.direction));
            }

            let survival = hit.material.base_diffuse_reflection().max_element();
            if gen_f32(rng) >= survival {
                break;
            }

            let normal = if hit.front_face { hit.normal } else { -hit.normal };
            ray = Ray::new(point + normal * LARGE_EPSILON, cosine_weighted_hemisphere(normal, rng));
            bounced = true;
        }

        stored
    }

    /// Photon contribution at the hit of `state`, whose shading normal is
    /// `normal`.
    fn photon_term(&self, state: &IntersectionState<'_>, normal: Vec3) -> Color {
        let Some(hit) = state.hit() else {
            return Color::ZERO;
        };
        let point = state.hit_point();
        let radius = self.config.query_radius;

        match self.config.estimate {
            PhotonEstimate::Indicator { tint } => {
                if self.photon_map.any_within(point, radius) {
                    tint * self.config.blend_weight
                } else {
                    Color::ZERO
                }
            }
            PhotonEstimate::Radiance => {
                let flux = self
                    .photon_map
                    .within_radius(point, radius)
                    .into_iter()
                    .filter(|photon| photon.to_light_ray.direction.dot(normal) > 0.0)
                    .fold(Color::ZERO, |acc, photon| acc + photon.energy);
                self.config.blend_weight * hit.material.base_diffuse_reflection() * flux / (PI * radius * radius)
            }
        }
    }
}

impl Renderer for PhotonMappingRenderer {
    fn initialize(&mut self) {
        let photons = self.emit_photons();
        self.photon_map = PhotonMap::build(photons);
        log::info!(
            "Photon map built: {} photons from a budget of {}",
            self.photon_map.len(),
            self.config.total_photon_budget
        );
    }

    fn scene(&self) -> &Scene {
        self.backward.scene()
    }

    fn compute_sample_color(&self, state: &IntersectionState<'_>) -> Color {
        let mut deepest = 0;
        let term = |s: &IntersectionState<'_>, n: Vec3| self.photon_term(s, n);
        self.backward.shade(state, 0, &mut deepest, &term)
    }

    fn sample_ray(&self, ray: Ray) -> Color {
        let term = |s: &IntersectionState<'_>, n: Vec3| self.photon_term(s, n);
        self.backward.sample_with_depth(ray, &term).0
    }
}
