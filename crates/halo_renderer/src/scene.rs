//! The traceable scene: objects, lights and what escaping rays see.

use crate::acceleration::Accelerator;
use crate::config::AccelerationConfig;
use crate::error::TracerResult;
use crate::intersection::IntersectionState;
use crate::light::Light;
use crate::scene_object::SceneObject;
use crate::Color;
use halo_math::{Aabb, Ray, Vec3};

/// Color returned for rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Environment {
    Solid(Color),
    /// Blend from `horizon` (straight down) to `zenith` (straight up) by the
    /// ray's vertical direction.
    SkyGradient { horizon: Color, zenith: Color },
}

impl Environment {
    /// White-to-blue daylight sky.
    pub fn sky() -> Self {
        Environment::SkyGradient {
            horizon: Color::new(1.0, 1.0, 1.0),
            zenith: Color::new(0.5, 0.7, 1.0),
        }
    }

    pub fn sample(&self, direction: Vec3) -> Color {
        match *self {
            Environment::Solid(color) => color,
            Environment::SkyGradient { horizon, zenith } => {
                let a = 0.5 * (direction.normalize_or_zero().y + 1.0);
                horizon * (1.0 - a) + zenith * a
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Solid(Color::ZERO)
    }
}

/// Collects objects and lights. [`finalize`](Self::finalize) builds every
/// index and hands back the [`Scene`], so a scene can never be traced before
/// it is ready.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
    environment: Environment,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: SceneObject) -> &mut Self {
        self.objects.push(object);
        self
    }

    pub fn add_light(&mut self, light: impl Into<Light>) -> &mut Self {
        self.lights.push(light.into());
        self
    }

    pub fn set_environment(&mut self, environment: Environment) -> &mut Self {
        self.environment = environment;
        self
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Build per-mesh and per-object indices, then the index over objects.
    pub fn finalize(self, acceleration: &AccelerationConfig) -> TracerResult<Scene> {
        let Self {
            mut objects,
            lights,
            environment,
        } = self;

        for object in &mut objects {
            object.build_acceleration()?;
        }
        let index = Accelerator::build(&objects, acceleration)?;

        let triangles: usize = objects
            .iter()
            .flat_map(|o| o.meshes())
            .map(|m| m.triangle_count())
            .sum();
        log::info!(
            "Scene ready: {} objects, {} triangles, {} lights, {} top-level index",
            objects.len(),
            triangles,
            lights.len(),
            index.kind_name()
        );

        Ok(Scene {
            objects,
            lights,
            environment,
            index,
        })
    }
}

/// A finalized scene. Immutable, so it is shared between render threads.
#[derive(Debug)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
    environment: Environment,
    index: Accelerator,
}

impl Scene {
    /// Find the closest hit along `state.ray`, recording it in `state`.
    pub fn trace<'a>(&'a self, state: &mut IntersectionState<'a>) -> bool {
        let ray = state.ray;
        self.index.intersect(&self.objects, &ray, state)
    }

    /// Whether anything lies on `ray` within its `max_t`.
    pub fn is_occluded(&self, ray: &Ray) -> bool {
        let mut state = IntersectionState::new(*ray, 0, 0);
        self.trace(&mut state)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn bounding_box(&self) -> Aabb {
        self.index.bounding_box()
    }
}
