use crate::Vec3;

/// A ray in 3D space with origin, direction, and an optional maximum
/// parametric distance.
///
/// The direction is not normalized on construction. Code that depends on `t`
/// being a world distance (shadow rays, photon rays) normalizes explicitly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Hits with `t` beyond this are ignored. `f32::INFINITY` when unbounded.
    pub max_t: f32,
}

impl Ray {
    /// Create an unbounded ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            max_t: f32::INFINITY,
        }
    }

    /// Create a ray that only reports hits up to `max_t`.
    pub fn bounded(origin: Vec3, direction: Vec3, max_t: f32) -> Self {
        Self {
            origin,
            direction,
            max_t,
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Whether `t` lies in the ray's valid range `(0, max_t)`.
    #[inline]
    pub fn accepts(&self, t: f32) -> bool {
        t > 0.0 && t < self.max_t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}
