//! Random sampling helpers shared by lights and the photon tracer.

use halo_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    // 24 random mantissa bits
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Uniformly distributed unit direction.
///
/// Rejection sampling: draw points in the [-1, 1]^3 cube until one lands
/// inside the unit ball, then normalize.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Cosine-weighted direction in the hemisphere around the unit `normal`.
pub fn cosine_weighted_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);
    let r = u1.sqrt();
    let theta = 2.0 * PI * u2;
    let local = Vec3::new(r * theta.cos(), r * theta.sin(), (1.0 - u1).max(0.0).sqrt());

    let (tangent, bitangent) = orthonormal_basis(normal);
    (tangent * local.x + bitangent * local.y + normal * local.z).try_normalize().unwrap_or(normal)
}

/// Two unit vectors completing `n` to a right-handed orthonormal frame.
fn orthonormal_basis(n: Vec3) -> (Vec3, Vec3) {
    let helper = if n.x.abs() < 0.8 { Vec3::X } else { Vec3::Y };
    let tangent = n.cross(helper).normalize();
    let bitangent = n.cross(tangent);
    (tangent, bitangent)
}
