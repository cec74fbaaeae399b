//! Geometry and scenes shared by unit tests.

use crate::config::AccelerationConfig;
use crate::light::PointLight;
use crate::mesh::MeshObject;
use crate::scene::{Environment, Scene, SceneBuilder};
use crate::scene_object::SceneObject;
use crate::{Color, Material, Triangle};
use halo_math::Vec3;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;

/// `n` random small triangles scattered through roughly [-5, 5]^3.
pub fn random_triangles(rng: &mut StdRng, n: usize) -> Vec<Triangle> {
    let material = Arc::new(Material::default());
    (0..n)
        .map(|_| {
            let center = Vec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
            let mut corner = || {
                center + Vec3::new(rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5))
            };
            let (a, b, c) = (corner(), corner(), corner());
            Triangle::new(a, b, c, material.clone())
        })
        .collect()
}

/// `nx * ny` unit-cell triangles in the z=0 plane facing +Z, each with its
/// own centroid.
pub fn triangle_grid(nx: usize, ny: usize) -> Vec<Triangle> {
    let material = Arc::new(Material::default());
    let mut triangles = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            let base = Vec3::new(x as f32, y as f32, 0.0);
            triangles.push(Triangle::new(base, base + Vec3::X, base + Vec3::Y, material.clone()));
        }
    }
    triangles
}

/// Large quad in the z = `z` plane facing +Z.
pub fn quad_object(half_size: f32, z: f32, material: Arc<Material>) -> SceneObject {
    SceneObject::new().with_mesh(MeshObject::quad(
        Vec3::new(-half_size, -half_size, z),
        Vec3::new(2.0 * half_size, 0.0, 0.0),
        Vec3::new(0.0, 2.0 * half_size, 0.0),
        material,
    ))
}

pub const LIGHT_COLOR: Color = Color::new(1.0, 0.9, 0.8);
pub const TRIANGLE_DIFFUSE: Color = Color::new(0.8, 0.6, 0.4);
pub const AMBIENT: Color = Color::new(0.05, 0.05, 0.05);

/// Centroid of the triangle in [`lit_triangle_scene`].
pub const TRIANGLE_CENTER: Vec3 = Vec3::new(0.0, -1.0 / 3.0, 0.0);

/// One triangle in the z=0 plane facing a point light at z=5, optionally
/// with a small opaque plate at z=2 shadowing its centroid.
///
/// A ray from (4, -1/3, 4) towards the centroid passes beside the plate.
pub fn lit_triangle_scene(occluded: bool) -> Scene {
    let material = Arc::new(Material::diffuse(TRIANGLE_DIFFUSE).with_ambient(AMBIENT));
    let mut mesh = MeshObject::new(material);
    mesh.add_triangle(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));

    let mut builder = SceneBuilder::new();
    builder.add_object(SceneObject::new().with_mesh(mesh));
    if occluded {
        builder.add_object(quad_object(0.25, 2.0, Arc::new(Material::default())));
    }
    builder.add_light(PointLight::new(Vec3::new(0.0, 0.0, 5.0), LIGHT_COLOR));
    builder.finalize(&AccelerationConfig::bvh()).unwrap()
}

/// Two parallel mirrors facing each other with a light between them.
pub fn mirror_corridor() -> Scene {
    let mirror = Arc::new(Material::diffuse(Color::splat(0.2)).with_reflectivity(0.9));
    let glass = Arc::new(Material::diffuse(Color::splat(0.1)).with_transmittance(0.8, 1.5));
    let mut builder = SceneBuilder::new();
    builder
        .add_object(quad_object(10.0, 0.0, mirror.clone()))
        .add_object(quad_object(10.0, 0.0, mirror).rotate(Vec3::X, std::f32::consts::PI).translate(Vec3::Z * 4.0))
        .add_object(quad_object(1.0, 0.0, glass).translate(Vec3::Z * 2.0))
        .add_light(PointLight::new(Vec3::new(3.0, 0.0, 1.0), Color::ONE))
        .set_environment(Environment::Solid(Color::new(0.0, 0.0, 0.3)));
    builder.finalize(&AccelerationConfig::bvh()).unwrap()
}

/// Closed box of diffuse walls with a light inside, for photon tracing.
pub fn closed_box(light_colors: &[Color]) -> Scene {
    closed_box_with_walls(Color::splat(0.7), light_colors)
}

/// [`closed_box`] with walls of diffuse color `wall_diffuse`.
pub fn closed_box_with_walls(wall_diffuse: Color, light_colors: &[Color]) -> Scene {
    let wall = Arc::new(Material::diffuse(wall_diffuse));
    let mut builder = SceneBuilder::new();
    let faces = [
        (Vec3::X, std::f32::consts::FRAC_PI_2),
        (Vec3::X, -std::f32::consts::FRAC_PI_2),
        (Vec3::Y, std::f32::consts::FRAC_PI_2),
        (Vec3::Y, -std::f32::consts::FRAC_PI_2),
        (Vec3::X, 0.0),
        (Vec3::X, std::f32::consts::PI),
    ];
    for (axis, angle) in faces {
        // Quad at z=-1 facing +Z, turned to each face of the [-1, 1]^3 cube
        builder.add_object(quad_object(1.0, -1.0, wall.clone()).rotate(axis, angle));
    }
    for (i, &color) in light_colors.iter().enumerate() {
        builder.add_light(PointLight::new(Vec3::new(0.1 * i as f32, 0.2, 0.3), color));
    }
    builder.finalize(&AccelerationConfig::bvh()).unwrap()
}
