//! Renderers turn traced rays into colors.

mod backward;
mod photon;

pub use backward::BackwardRenderer;
pub use photon::{photon_counts, PhotonMappingRenderer};

use crate::config::{RenderConfig, RendererKind};
use crate::error::TracerResult;
use crate::intersection::IntersectionState;
use crate::scene::Scene;
use crate::Color;
use halo_math::Ray;
use std::sync::Arc;

/// Shading strategy shared by every renderer.
///
/// `initialize` runs once, single-threaded, before any sample is taken; after
/// that a renderer is only read, so it can be shared across render threads.
pub trait Renderer: Send + Sync {
    /// One-time setup (photon emission for the photon mapper).
    fn initialize(&mut self) {}

    fn scene(&self) -> &Scene;

    /// Color for `state` after it has been traced against the scene. A state
    /// without a hit sees the environment.
    fn compute_sample_color(&self, state: &IntersectionState<'_>) -> Color;

    /// Trace a primary ray and return the color it sees.
    fn sample_ray(&self, ray: Ray) -> Color;
}

/// Validate `config`, then build and initialize the renderer it selects.
pub fn build_renderer(scene: Arc<Scene>, config: &RenderConfig) -> TracerResult<Box<dyn Renderer>> {
    config.validate()?;
    let mut renderer: Box<dyn Renderer> = match config.renderer {
        RendererKind::Backward => Box::new(BackwardRenderer::new(scene, config)),
        RendererKind::PhotonMapping => Box::new(PhotonMappingRenderer::new(scene, config)?),
    };
    renderer.initialize();
    Ok(renderer)
}
