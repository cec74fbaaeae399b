//! Placed objects: a group of meshes under one local-to-world transform.
//!
//! Meshes live in object space. Rays are moved into object space for the
//! test and hits are moved back out, so one set of meshes never needs to be
//! rewritten when the object moves.

use crate::acceleration::Accelerator;
use crate::config::AccelerationConfig;
use crate::error::TracerResult;
use crate::intersection::{Intersectable, IntersectionState};
use crate::mesh::MeshObject;
use halo_math::{Aabb, Mat4, Mat4Ext, Quat, Ray, Vec3};

/// A transformed group of meshes.
///
/// The transform is kept as separate translation, rotation and scale and
/// composed as `T * R * S`. [`build_acceleration`](Self::build_acceleration)
/// freezes it together with the per-object and per-mesh indices.
#[derive(Debug)]
pub struct SceneObject {
    meshes: Vec<MeshObject>,

    position: Vec3,
    rotation: Quat,
    scale: Vec3,

    /// Index over `meshes`
    acceleration: AccelerationConfig,
    /// Index each mesh builds over its triangles
    mesh_acceleration: AccelerationConfig,

    built: Option<Built>,
}

/// Everything derived from the meshes and transform at build time.
#[derive(Debug)]
struct Built {
    local_to_world: Mat4,
    world_to_local: Mat4,
    world_bbox: Aabb,
    index: Accelerator,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneObject {
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            acceleration: AccelerationConfig::default(),
            mesh_acceleration: AccelerationConfig::default(),
            built: None,
        }
    }

    pub fn with_mesh(mut self, mesh: MeshObject) -> Self {
        self.add_mesh(mesh);
        self
    }

    pub fn add_mesh(&mut self, mesh: MeshObject) {
        self.meshes.push(mesh);
        self.built = None;
    }

    /// Move the object by `offset` in world space.
    pub fn translate(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self.built = None;
        self
    }

    /// Rotate the object by `angle` radians about `axis`, after any previous
    /// rotation. A zero axis leaves the rotation unchanged.
    pub fn rotate(mut self, axis: Vec3, angle: f32) -> Self {
        if let Some(axis) = axis.try_normalize() {
            self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
            self.built = None;
        }
        self
    }

    /// Multiply the current scale per axis.
    pub fn scale(mut self, factors: Vec3) -> Self {
        self.scale *= factors;
        self.built = None;
        self
    }

    pub fn uniform_scale(self, factor: f32) -> Self {
        self.scale(Vec3::splat(factor))
    }

    pub fn with_acceleration(mut self, config: AccelerationConfig) -> Self {
        self.acceleration = config;
        self.built = None;
        self
    }

    pub fn with_mesh_acceleration(mut self, config: AccelerationConfig) -> Self {
        self.mesh_acceleration = config;
        self.built = None;
        self
    }

    pub fn meshes(&self) -> &[MeshObject] {
        &self.meshes
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn local_to_world(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Build each mesh's index, then the index over the meshes, and cache
    /// the transform and its inverse.
    pub fn build_acceleration(&mut self) -> TracerResult<()> {
        for mesh in &mut self.meshes {
            mesh.build_acceleration(&self.mesh_acceleration)?;
        }
        let index = Accelerator::build(&self.meshes, &self.acceleration)?;

        let local_to_world = self.local_to_world();
        let world_bbox = local_to_world.transform_aabb(&index.bounding_box());
        self.built = Some(Built {
            local_to_world,
            world_to_local: local_to_world.inverse(),
            world_bbox,
            index,
        });
        Ok(())
    }

    /// Test against the meshes in object space.
    fn intersect_local<'a>(&'a self, ray: &Ray, state: &mut IntersectionState<'a>) -> bool {
        match &self.built {
            Some(built) => built.index.intersect(&self.meshes, ray, state),
            None => {
                let mut hit_anything = false;
                for mesh in &self.meshes {
                    if mesh.intersect(ray, state) {
                        hit_anything = true;
                    }
                }
                hit_anything
            }
        }
    }
}

impl Intersectable for SceneObject {
    /// Transform the world ray into object space, test there and record any
    /// closer hit back in world space.
    ///
    /// The ray direction is not renormalized by the transform, so `t` is the
    /// same in both spaces and the world state's closest distance can bound
    /// the object-space search directly.
    fn intersect<'a>(&'a self, ray: &Ray, state: &mut IntersectionState<'a>) -> bool {
        let (local_to_world, world_to_local) = match &self.built {
            Some(built) => {
                if built.world_bbox.hit(ray, 0.0, ray.max_t.min(state.intersection_t())).is_none() {
                    return false;
                }
                (built.local_to_world, built.world_to_local)
            }
            None => {
                let m = self.local_to_world();
                (m, m.inverse())
            }
        };

        let local_ray = world_to_local.transform_ray(ray);
        let mut local = state.probe(local_ray);
        if !self.intersect_local(&local_ray, &mut local) {
            return false;
        }
        let (t, Some(mut hit)) = (local.intersection_t(), local.take_hit()) else {
            return false;
        };

        hit.normal = local_to_world.transform_normal(hit.normal);
        state.record_hit(t, hit)
    }

    fn bounding_box(&self) -> Aabb {
        match &self.built {
            Some(built) => built.world_bbox,
            None => {
                let local = self
                    .meshes
                    .iter()
                    .fold(Aabb::EMPTY, |acc, mesh| acc.union(&mesh.bounding_box()));
                self.local_to_world().transform_aabb(&local)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Material;
    use std::f32::consts::FRAC_PI_2;
    use std::sync::Arc;

    /// 2x2 quad centred on the origin in the z=0 plane, facing +Z
    fn quad_object() -> SceneObject {
        SceneObject::new().with_mesh(MeshObject::quad(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Arc::new(Material::default()),
        ))
    }

    fn trace(object: &SceneObject, ray: Ray) -> Option<(f32, Vec3)> {
        let mut state = IntersectionState::new(ray, 0, 0);
        object.intersect(&ray, &mut state);
        state.hit().map(|h| (state.intersection_t(), h.normal))
    }

    #[test]
    fn test_identity_object_matches_mesh() {
        let mut object = quad_object();
        object.build_acceleration().unwrap();
        let (t, n) = trace(&object, Ray::new(Vec3::new(0.2, 0.3, 4.0), -Vec3::Z)).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!((n - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_translation_moves_hit() {
        let mut object = quad_object().translate(Vec3::new(10.0, 0.0, 0.0));
        object.build_acceleration().unwrap();

        assert!(trace(&object, Ray::new(Vec3::new(0.0, 0.3, 4.0), -Vec3::Z)).is_none());
        let (t, _) = trace(&object, Ray::new(Vec3::new(10.0, 0.3, 4.0), -Vec3::Z)).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_turns_normal() {
        // Quarter turn about Y takes the +Z face to +X
        let mut object = quad_object().rotate(Vec3::Y, FRAC_PI_2);
        object.build_acceleration().unwrap();

        let (t, n) = trace(&object, Ray::new(Vec3::new(3.0, 0.1, 0.1), -Vec3::X)).unwrap();
        assert!((t - 3.0).abs() < 1e-4);
        assert!((n - Vec3::X).length() < 1e-4, "normal {:?}", n);
    }

    #[test]
    fn test_scale_keeps_world_distance() {
        let mut object = quad_object().uniform_scale(3.0).translate(Vec3::new(0.0, 0.0, -2.0));
        object.build_acceleration().unwrap();

        // Only inside the scaled quad
        let (t, _) = trace(&object, Ray::new(Vec3::new(2.5, 2.0, 5.0), -Vec3::Z)).unwrap();
        assert!((t - 7.0).abs() < 1e-4);
        assert!(trace(&object, Ray::new(Vec3::new(3.5, 0.0, 5.0), -Vec3::Z)).is_none());
    }

    #[test]
    fn test_non_uniform_scale_normal_stays_perpendicular() {
        // Slanted quad: normal in the xz-plane
        let slanted = SceneObject::new().with_mesh(MeshObject::quad(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(0.0, 2.0, 0.0),
            Arc::new(Material::default()),
        ));
        let mut object = slanted.scale(Vec3::new(4.0, 1.0, 1.0));
        object.build_acceleration().unwrap();

        let (_, n) = trace(&object, Ray::new(Vec3::new(0.0, 0.5, 5.0), -Vec3::Z)).unwrap();
        // Surface spans (4, 0, 1) in world space
        assert!(n.dot(Vec3::new(4.0, 0.0, 1.0)).abs() < 1e-4);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unbuilt_object_still_traces() {
        let object = quad_object().translate(Vec3::Y * 5.0);
        assert!(!object.is_built());
        assert!(trace(&object, Ray::new(Vec3::new(0.2, 5.0, 1.0), -Vec3::Z)).is_some());
        assert!((object.bounding_box().centroid() - Vec3::Y * 5.0).length() < 1e-4);
    }

    #[test]
    fn test_closer_world_hit_is_kept() {
        let mut near = quad_object().translate(Vec3::Z);
        let mut far = quad_object();
        near.build_acceleration().unwrap();
        far.build_acceleration().unwrap();

        let ray = Ray::new(Vec3::new(0.3, 0.1, 5.0), -Vec3::Z);
        let mut state = IntersectionState::new(ray, 0, 0);
        assert!(near.intersect(&ray, &mut state));
        assert!(!far.intersect(&ray, &mut state));
        assert!((state.intersection_t() - 4.0).abs() < 1e-5);
    }
}
