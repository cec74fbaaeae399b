//! Pinhole camera for primary rays.

use halo_math::{Ray, Vec3};

/// A pinhole camera looking from `look_from` towards `look_at`.
///
/// Normalized image coordinates run from `(0, 0)` at the top-left corner to
/// `(1, 1)` at the bottom-right, matching row-major pixel order.
#[derive(Debug, Clone)]
pub struct Camera {
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    /// Vertical field of view in degrees
    vfov: f32,
    aspect_ratio: f32,

    // Cached frame (kept in sync by update())
    upper_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl Camera {
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 1.0,
            upper_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
        };
        camera.update();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.update();
        self
    }

    pub fn with_vfov(mut self, vfov_degrees: f32) -> Self {
        self.vfov = vfov_degrees;
        self.update();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.update();
        self
    }

    /// Aspect ratio of a `width` x `height` image.
    pub fn with_resolution(self, width: u32, height: u32) -> Self {
        self.with_aspect_ratio(width as f32 / height.max(1) as f32)
    }

    pub fn position(&self) -> Vec3 {
        self.look_from
    }

    /// Recompute the image plane one unit in front of the eye.
    fn update(&mut self) {
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * self.aspect_ratio;

        let w = (self.look_from - self.look_at).try_normalize().unwrap_or(Vec3::Z);
        let u = self.vup.cross(w).try_normalize().unwrap_or(Vec3::X);
        let v = w.cross(u);

        self.horizontal = viewport_width * u;
        self.vertical = -viewport_height * v;
        self.upper_left = self.look_from - w - self.horizontal / 2.0 - self.vertical / 2.0;
    }

    /// Primary ray through the image point `(u, v)`; the direction is unit
    /// length.
    pub fn generate_ray_for_normalized_coordinates(&self, u: f32, v: f32) -> Ray {
        let target = self.upper_left + u * self.horizontal + v * self.vertical;
        Ray::new(self.look_from, (target - self.look_from).normalize())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
