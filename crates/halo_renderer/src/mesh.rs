//! Triangle meshes sharing a single material.

use crate::acceleration::Accelerator;
use crate::config::AccelerationConfig;
use crate::error::{TracerError, TracerResult};
use crate::intersection::{Intersectable, IntersectionState};
use crate::{Material, Triangle};
use halo_math::{Aabb, Ray, Vec3};
use std::sync::Arc;

/// A list of triangles in object space plus an optional index over them.
///
/// Adding triangles drops the index; call
/// [`build_acceleration`](Self::build_acceleration) again afterwards. Without
/// an index every triangle is tested.
#[derive(Debug)]
pub struct MeshObject {
    triangles: Vec<Triangle>,
    material: Arc<Material>,
    acceleration: Option<Accelerator>,
    bbox: Aabb,
}

impl MeshObject {
    pub fn new(material: Arc<Material>) -> Self {
        Self {
            triangles: Vec::new(),
            material,
            acceleration: None,
            bbox: Aabb::EMPTY,
        }
    }

    /// Build a mesh from a vertex list and triangle indices.
    pub fn from_indexed(positions: &[Vec3], indices: &[[u32; 3]], material: Arc<Material>) -> TracerResult<Self> {
        let mut mesh = Self::new(material);
        mesh.triangles.reserve(indices.len());

        for (face, tri) in indices.iter().enumerate() {
            let corner = |i: u32| {
                positions.get(i as usize).copied().ok_or_else(|| {
                    TracerError::InvalidMesh(format!(
                        "face {} references vertex {} but only {} exist",
                        face,
                        i,
                        positions.len()
                    ))
                })
            };
            mesh.add_triangle(corner(tri[0])?, corner(tri[1])?, corner(tri[2])?);
        }

        Ok(mesh)
    }

    /// Axis-aligned quad with corners `origin`, `origin + u`, `origin + u + v`
    /// and `origin + v`, facing `u × v`.
    pub fn quad(origin: Vec3, u: Vec3, v: Vec3, material: Arc<Material>) -> Self {
        let mut mesh = Self::new(material);
        mesh.add_triangle(origin, origin + u, origin + u + v);
        mesh.add_triangle(origin, origin + u + v, origin + v);
        mesh
    }

    pub fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3) {
        let tri = Triangle::new(v0, v1, v2, self.material.clone());
        self.bbox = self.bbox.union(&tri.bounding_box());
        self.triangles.push(tri);
        self.acceleration = None;
    }

    /// Replace the material of every triangle in the mesh.
    pub fn set_material(&mut self, material: Arc<Material>) {
        for tri in &mut self.triangles {
            tri.set_material(material.clone());
        }
        self.material = material;
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_accelerated(&self) -> bool {
        self.acceleration.is_some()
    }

    pub fn build_acceleration(&mut self, config: &AccelerationConfig) -> TracerResult<()> {
        self.acceleration = Some(Accelerator::build(&self.triangles, config)?);
        Ok(())
    }
}

impl Intersectable for MeshObject {
    fn intersect<'a>(&'a self, ray: &Ray, state: &mut IntersectionState<'a>) -> bool {
        match &self.acceleration {
            Some(accel) => accel.intersect(&self.triangles, ray, state),
            None => {
                let mut hit_anything = false;
                for tri in &self.triangles {
                    if tri.intersect(ray, state) {
                        hit_anything = true;
                    }
                }
                hit_anything
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
