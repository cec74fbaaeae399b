//! Render configuration, loadable from JSON.

use crate::error::{TracerError, TracerResult};
use crate::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which spatial index to build, with its kind-specific settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccelerationConfig {
    /// Linear scan over every item.
    Naive,
    /// Bounding volume hierarchy.
    Bvh {
        max_children_per_node: usize,
        items_per_leaf: usize,
    },
    /// Uniform grid; the resolution is a suggestion clamped to at least one
    /// cell per axis.
    UniformGrid { grid_resolution: [u32; 3] },
}

impl AccelerationConfig {
    /// Binary BVH with two items per leaf.
    pub const fn bvh() -> Self {
        AccelerationConfig::Bvh {
            max_children_per_node: 2,
            items_per_leaf: 2,
        }
    }

    pub const fn uniform_grid(resolution: [u32; 3]) -> Self {
        AccelerationConfig::UniformGrid {
            grid_resolution: resolution,
        }
    }

    pub fn validate(&self) -> TracerResult<()> {
        match *self {
            AccelerationConfig::Naive => Ok(()),
            AccelerationConfig::Bvh {
                max_children_per_node,
                items_per_leaf,
            } => {
                if max_children_per_node < 2 {
                    return Err(TracerError::InvalidAcceleration(format!(
                        "max_children_per_node must be at least 2, got {}",
                        max_children_per_node
                    )));
                }
                if items_per_leaf == 0 {
                    return Err(TracerError::InvalidAcceleration(
                        "items_per_leaf must be at least 1".to_string(),
                    ));
                }
                Ok(())
            }
            AccelerationConfig::UniformGrid { grid_resolution } => {
                if grid_resolution.contains(&0) {
                    return Err(TracerError::InvalidAcceleration(format!(
                        "grid_resolution must be positive on every axis, got {:?}",
                        grid_resolution
                    )));
                }
                Ok(())
            }
        }
    }
}

impl Default for AccelerationConfig {
    fn default() -> Self {
        Self::bvh()
    }
}

/// Which renderer turns intersections into colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    #[default]
    Backward,
    PhotonMapping,
}

/// How the photon map contributes to a shaded sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PhotonEstimate {
    /// Add `tint` whenever any photon lies within the query radius.
    Indicator {
        #[serde(default = "default_indicator_tint")]
        tint: Color,
    },
    /// Density estimate: photon energy within the radius over the disc area.
    Radiance,
}

fn default_indicator_tint() -> Color {
    Color::new(1.0, 0.0, 0.0)
}

impl Default for PhotonEstimate {
    fn default() -> Self {
        PhotonEstimate::Radiance
    }
}

/// Photon-mapping settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotonConfig {
    /// Photons emitted over all lights
    pub total_photon_budget: usize,
    /// Bounce limit per photon path (Russian roulette usually ends it sooner)
    pub max_photon_bounces: u32,
    /// Radius of the photon gather around a hit point
    pub query_radius: f32,
    /// Scale applied to the photon contribution
    pub blend_weight: f32,
    pub estimate: PhotonEstimate,
    /// Seed for photon emission, so maps are reproducible
    pub seed: u64,
}

impl Default for PhotonConfig {
    fn default() -> Self {
        Self {
            total_photon_budget: 100_000,
            max_photon_bounces: 1000,
            query_radius: 0.003,
            blend_weight: 1.0,
            estimate: PhotonEstimate::default(),
            seed: 0x5eed,
        }
    }
}

/// Top-level render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub max_reflection_bounces: u32,
    pub max_refraction_bounces: u32,
    pub renderer: RendererKind,
    /// Index over the scene's objects
    pub scene_acceleration: AccelerationConfig,
    /// Tile edge length for parallel rendering
    pub bucket_size: u32,
    pub photon: PhotonConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_reflection_bounces: 2,
            max_refraction_bounces: 4,
            renderer: RendererKind::default(),
            scene_acceleration: AccelerationConfig::default(),
            bucket_size: 64,
            photon: PhotonConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> TracerResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> TracerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading render config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> TracerResult<()> {
        self.scene_acceleration.validate()?;
        if self.bucket_size == 0 {
            return Err(TracerError::InvalidConfig("bucket_size must be positive".to_string()));
        }
        let photon = &self.photon;
        if !(photon.query_radius.is_finite() && photon.query_radius > 0.0) {
            return Err(TracerError::InvalidConfig(format!(
                "photon query_radius must be a positive finite number, got {}",
                photon.query_radius
            )));
        }
        if !(photon.blend_weight.is_finite() && photon.blend_weight >= 0.0) {
            return Err(TracerError::InvalidConfig(format!(
                "photon blend_weight must be non-negative, got {}",
                photon.blend_weight
            )));
        }
        Ok(())
    }
}
