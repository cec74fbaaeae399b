//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::intersection::{Intersectable, IntersectionState, SurfaceHit};
use crate::Material;
use halo_math::{Aabb, Ray, Vec2, Vec3};
use std::sync::Arc;

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length, counter-clockwise winding)
    normal: Vec3,
    /// Material shared with the rest of the mesh
    material: Arc<Material>,
    /// Bounding box
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        let bbox = Aabb::enclosing(&[v0, v1, v2]);

        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            bbox,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub(crate) fn set_material(&mut self, material: Arc<Material>) {
        self.material = material;
    }

    /// Möller-Trumbore test returning `(t, u, v)` for any hit in front of
    /// the ray origin.
    fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-12 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        Some((f * edge2.dot(q), u, v))
    }
}

impl Intersectable for Triangle {
    fn intersect<'a>(&'a self, ray: &Ray, state: &mut IntersectionState<'a>) -> bool {
        let Some((t, u, v)) = self.intersect_ray(ray) else {
            return false;
        };
        if !state.accepts(ray, t) {
            return false;
        }

        state.record_hit(
            t,
            SurfaceHit {
                primitive: self,
                material: &self.material,
                normal: self.normal,
                uv: Vec2::new(u, v),
                front_face: ray.direction.dot(self.normal) < 0.0,
            },
        )
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
