//! Intersectable trait and the per-ray IntersectionState threaded through a trace.

use crate::{Material, Triangle};
use halo_math::{Aabb, Ray, Vec2, Vec3};

/// Details of the closest surface found so far.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit<'a> {
    /// The primitive that was hit
    pub primitive: &'a Triangle,
    /// Material of the mesh owning the primitive
    pub material: &'a Material,
    /// Geometric normal in the space of the ray being traced (unit, outward)
    pub normal: Vec3,
    /// Barycentric coordinates of the hit on the primitive
    pub uv: Vec2,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

/// Mutable per-ray record: the ray, the nearest hit so far and the budgets
/// left for recursive bounces.
///
/// Created per primary ray, updated in place by one `Scene::trace`, consumed
/// by a renderer and dropped. Never shared between rays.
#[derive(Debug, Clone)]
pub struct IntersectionState<'a> {
    /// The ray being traced (world space)
    pub ray: Ray,
    /// Parametric distance of the nearest hit, `+inf` if none
    intersection_t: f32,
    hit: Option<SurfaceHit<'a>>,
    /// Index of refraction of the medium the ray travels through
    pub current_ior: f32,
    pub remaining_reflection_bounces: u32,
    pub remaining_refraction_bounces: u32,
}

impl<'a> IntersectionState<'a> {
    pub fn new(ray: Ray, reflection_bounces: u32, refraction_bounces: u32) -> Self {
        Self {
            ray,
            intersection_t: f32::INFINITY,
            hit: None,
            current_ior: 1.0,
            remaining_reflection_bounces: reflection_bounces,
            remaining_refraction_bounces: refraction_bounces,
        }
    }

    /// State for tracing `ray` in another space while only accepting hits
    /// closer than `self`'s current best.
    pub(crate) fn probe(&self, ray: Ray) -> Self {
        Self {
            ray,
            intersection_t: self.intersection_t,
            hit: None,
            current_ior: self.current_ior,
            remaining_reflection_bounces: self.remaining_reflection_bounces,
            remaining_refraction_bounces: self.remaining_refraction_bounces,
        }
    }

    /// Spawn the state for a secondary ray, sharing IOR and budgets.
    pub fn spawn(&self, ray: Ray) -> IntersectionState<'a> {
        IntersectionState {
            ray,
            intersection_t: f32::INFINITY,
            hit: None,
            current_ior: self.current_ior,
            remaining_reflection_bounces: self.remaining_reflection_bounces,
            remaining_refraction_bounces: self.remaining_refraction_bounces,
        }
    }

    #[inline]
    pub fn intersection_t(&self) -> f32 {
        self.intersection_t
    }

    #[inline]
    pub fn hit(&self) -> Option<&SurfaceHit<'a>> {
        self.hit.as_ref()
    }

    pub(crate) fn take_hit(&mut self) -> Option<SurfaceHit<'a>> {
        self.hit.take()
    }

    pub fn has_hit(&self) -> bool {
        self.hit.is_some()
    }

    /// Whether `t` would be a valid closer hit for `ray`.
    ///
    /// `ray` is passed separately because acceleration structures may test
    /// a ray transformed into an object's local space.
    #[inline]
    pub fn accepts(&self, ray: &Ray, t: f32) -> bool {
        ray.accepts(t) && t < self.intersection_t
    }

    /// Record a strictly closer hit. Returns false (and leaves the state
    /// untouched) when `t` is not closer than the current best.
    pub fn record_hit(&mut self, t: f32, hit: SurfaceHit<'a>) -> bool {
        if !(t > 0.0 && t < self.intersection_t) {
            return false;
        }
        self.intersection_t = t;
        self.hit = Some(hit);
        true
    }

    /// World-space position of the nearest hit.
    pub fn hit_point(&self) -> Vec3 {
        self.ray.at(self.intersection_t)
    }
}

/// Anything an acceleration structure can index: primitives, meshes and
/// scene objects.
pub trait Intersectable: Send + Sync {
    /// Test `ray` and record a closer hit in `state`.
    ///
    /// Returns true if a closer hit was recorded.
    fn intersect<'a>(&'a self, ray: &Ray, state: &mut IntersectionState<'a>) -> bool;

    /// Bounding box in the space `intersect` receives rays in.
    fn bounding_box(&self) -> Aabb;
}
