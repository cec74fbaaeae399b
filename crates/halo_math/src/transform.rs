// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); this adds the ray-tracing specific pieces on top.

use crate::{Aabb, Ray};
use glam::{Mat3, Mat4, Vec3};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a ray into the space this matrix maps to.
    ///
    /// The direction is NOT renormalized, so a parameter `t` names the same
    /// point in both spaces.
    fn transform_ray(&self, ray: &Ray) -> Ray;

    /// Transform a surface normal (uses the inverse transpose, so non-uniform
    /// scales stay perpendicular to the surface). The result is unit length.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_ray(&self, ray: &Ray) -> Ray {
        Ray::bounded(
            self.transform_point3(ray.origin),
            self.transform_vector3(ray.direction),
            ray.max_t,
        )
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let normal_matrix = Mat3::from_mat4(*self).inverse().transpose();
        (normal_matrix * normal).normalize_or_zero()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }
        let corners: Vec<Vec3> = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { aabb.min.x } else { aabb.max.x },
                    if i & 2 == 0 { aabb.min.y } else { aabb.max.y },
                    if i & 4 == 0 { aabb.min.z } else { aabb.max.z },
                )
            })
            .map(|corner| self.transform_point3(corner))
            .collect();

        Aabb::enclosing(&corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_transform_ray_keeps_parameterisation() {
        let to_local = Mat4::from_scale(Vec3::splat(0.5)) * Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0));
        let ray = Ray::new(Vec3::new(2.0, 0.0, -4.0), Vec3::Z);
        let local = to_local.transform_ray(&ray);

        let world_point = ray.at(3.0);
        let local_point = local.at(3.0);
        assert!((to_local.transform_point3(world_point) - local_point).length() < 1e-5);
    }

    #[test]
    fn test_transform_ray_translation_ignores_direction() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));
        let ray = Ray::bounded(Vec3::ZERO, Vec3::X, 4.0);
        let moved = mat.transform_ray(&ray);

        assert_eq!(moved.origin, Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(moved.direction, Vec3::X);
        assert_eq!(moved.max_t, 4.0);
    }

    #[test]
    fn test_transform_normal_non_uniform_scale() {
        // Plane x + y = 0 has normal (1, 1, 0); stretching x keeps it a plane
        // whose normal is no longer the transformed normal vector.
        let mat = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = mat.transform_normal(Vec3::new(1.0, 1.0, 0.0).normalize());
        let tangent = mat.transform_vector3(Vec3::new(1.0, -1.0, 0.0));
        assert!(n.dot(tangent).abs() < 1e-5);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_normal_rotation() {
        let mat = Mat4::from_rotation_z(PI / 2.0);
        let n = mat.transform_normal(Vec3::X);
        assert!((n - Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::splat(5.0));
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.min - Vec3::splat(5.0)).length() < 0.001);
        assert!((transformed.max - Vec3::splat(6.0)).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_rotation_grows_box() {
        let mat = Mat4::from_rotation_y(PI / 4.0);
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.max.x - 2f32.sqrt()).abs() < 1e-4);
        assert!((transformed.max.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_transform_empty_aabb_stays_empty() {
        assert!(Mat4::IDENTITY.transform_aabb(&Aabb::EMPTY).is_empty());
    }
}
