use crate::{Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures.
///
/// An empty box has `min > max` on every axis and is the identity for
/// [`Aabb::union`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Contains nothing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an AABB from two corner points, padding degenerate axes.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            min: a.min(b),
            max: a.max(b),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// Smallest box enclosing every point of `points`.
    pub fn enclosing(points: &[Vec3]) -> Self {
        let Some((&first, rest)) = points.split_first() else {
            return Self::EMPTY;
        };
        let (min, max) = rest
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Self::from_points(min, max)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Box surrounding both inputs.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box to include `p`.
    pub fn include(&self, p: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Slab test against the ray restricted to `[t_min, t_max]`.
    ///
    /// Returns the clipped `(t_enter, t_exit)` range when the ray passes
    /// through the box.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<(f32, f32)> {
        if self.is_empty() {
            return None;
        }
        let mut t0 = t_min;
        let mut t1 = t_max;
        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let mut near = (self.min[axis] - ray.origin[axis]) * inv;
            let mut far = (self.max[axis] - ray.origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut near, &mut far);
            }
            // NaN (origin on a slab with a zero direction component) keeps the current range
            if near > t0 {
                t0 = near;
            }
            if far < t1 {
                t1 = far;
            }
            if t1 < t0 {
                return None;
            }
        }
        Some((t0, t1))
    }

    /// Pad axes thinner than `delta` so flat geometry (axis-aligned
    /// triangles) still has a box a ray can enter.
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] < delta {
                self.min[axis] -= delta * 0.5;
                self.max[axis] += delta * 0.5;
            }
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_flat_box_is_padded() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        assert!(aabb.extent().z > 0.0);
        assert!(aabb.min.z < 0.0 && aabb.max.z > 0.0);
    }

    #[test]
    fn test_empty_is_union_identity() {
        let b = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        assert!(Aabb::EMPTY.is_empty());
        assert_eq!(Aabb::EMPTY.union(&b), b);
        assert_eq!(Aabb::enclosing(&[]), Aabb::EMPTY);
    }

    #[test]
    fn test_aabb_hit_reports_entry_and_exit() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let (t0, t1) = aabb.hit(&ray, 0.0, 100.0).unwrap();
        assert!((t0 - 4.0).abs() < 1e-5);
        assert!((t1 - 6.0).abs() < 1e-5);

        // Pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(aabb.hit(&ray, 0.0, 100.0).is_none());

        // Missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(aabb.hit(&ray, 0.0, 100.0).is_none());

        // Box beyond the allowed range
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.hit(&ray, 0.0, 3.0).is_none());
    }

    #[test]
    fn test_hit_from_inside_starts_at_t_min() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let (t0, t1) = aabb.hit(&ray, 0.0, f32::INFINITY).unwrap();
        assert_eq!(t0, 0.0);
        assert!((t1 - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_longest_axis() {
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)).longest_axis(), 0);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)).longest_axis(), 1);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)).longest_axis(), 2);
    }
}
