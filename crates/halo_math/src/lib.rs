// Re-export glam for convenience
pub use glam::*;

// Ray tracing value types
mod aabb;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use ray::Ray;
pub use transform::Mat4Ext;

/// Offset applied along a surface normal before spawning secondary rays.
pub const LARGE_EPSILON: f32 = 1e-3;

/// Reflect `v` about the normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `incident` through a surface with unit normal `n`
/// facing against it, where `eta` is the ratio of indices `n_from / n_to`.
///
/// Returns `None` on total internal reflection.
pub fn refract(incident: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = (-incident).dot(n).clamp(-1.0, 1.0);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some((eta * incident + (eta * cos_i - cos_t) * n).normalize_or_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_flips_normal_component() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(reflect(v, Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_straight_through_matched_media() {
        let d = Vec3::new(0.3, -1.0, 0.2).normalize();
        let out = refract(d, Vec3::Y, 1.0).unwrap();
        assert!((out - d).length() < 1e-5);
    }

    #[test]
    fn test_refract_bends_towards_normal_entering_denser_medium() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let out = refract(d, Vec3::Y, 1.0 / 1.5).unwrap();
        // Snell: sin(t) = sin(i) / 1.5
        let sin_t = out.x.abs();
        assert!((sin_t - (0.5f32.sqrt() / 1.5)).abs() < 1e-4);
        assert!(out.y < 0.0);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Leaving glass at a grazing angle cannot refract
        let d = Vec3::new(1.0, -0.2, 0.0).normalize();
        assert!(refract(d, Vec3::Y, 1.5).is_none());
    }
}
