//! Photon-mapped box example.
//!
//! Renders a closed room with a mirror block and a glass panel and saves it
//! as PPM. Pass a JSON render config path as the first argument to override
//! the defaults.
//!
//! ```text
//! RUST_LOG=info cargo run --release --example photon_box -- config.json
//! ```

use anyhow::Context;
use halo_renderer::{
    build_renderer, render, AccelerationConfig, Camera, Color, Environment, ImageBuffer, Material, MeshObject,
    PointLight, RenderConfig, RendererKind, SceneBuilder, SceneObject, Vec3,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

const WIDTH: u32 = 480;
const HEIGHT: u32 = 360;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => RenderConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => RenderConfig {
            renderer: RendererKind::PhotonMapping,
            ..Default::default()
        },
    };

    let scene = Arc::new(build_scene()?.finalize(&config.scene_acceleration)?);
    let renderer = build_renderer(scene, &config)?;

    let camera = Camera::new()
        .with_position(Vec3::new(0.0, 0.0, 4.5), Vec3::ZERO, Vec3::Y)
        .with_vfov(45.0)
        .with_resolution(WIDTH, HEIGHT);

    let image = render(renderer.as_ref(), &camera, &config, WIDTH, HEIGHT);

    let filename = "photon_box.ppm";
    save_ppm(&image, filename).with_context(|| format!("writing {}", filename))?;
    log::info!("Saved to {}", filename);
    Ok(())
}

/// Unit cube of walls open towards the camera, lit from just below the ceiling.
fn build_scene() -> anyhow::Result<SceneBuilder> {
    let white = Arc::new(Material::diffuse(Color::splat(0.75)).with_ambient(Color::splat(0.02)));
    let red = Arc::new(Material::diffuse(Color::new(0.75, 0.15, 0.1)));
    let green = Arc::new(Material::diffuse(Color::new(0.15, 0.7, 0.2)));
    let mirror = Arc::new(
        Material::diffuse(Color::splat(0.1))
            .with_specular(Color::splat(0.5), 40.0)
            .with_reflectivity(0.8),
    );
    let glass = Arc::new(Material::diffuse(Color::splat(0.05)).with_transmittance(0.9, 1.5));

    let wall = |material: &Arc<Material>| {
        MeshObject::quad(
            Vec3::new(-1.5, -1.5, -1.5),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
            material.clone(),
        )
    };
    let quarter = std::f32::consts::FRAC_PI_2;

    let mut builder = SceneBuilder::new();
    builder
        .add_object(SceneObject::new().with_mesh(wall(&white)))
        .add_object(SceneObject::new().with_mesh(wall(&white)).rotate(Vec3::X, quarter))
        .add_object(SceneObject::new().with_mesh(wall(&white)).rotate(Vec3::X, -quarter))
        .add_object(SceneObject::new().with_mesh(wall(&red)).rotate(Vec3::Y, quarter))
        .add_object(SceneObject::new().with_mesh(wall(&green)).rotate(Vec3::Y, -quarter));

    // Mirror block: a unit cube from indexed faces, turned and sunk onto the floor
    let positions: Vec<Vec3> = (0..8)
        .map(|i| Vec3::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32) - Vec3::splat(0.5))
        .collect();
    let faces = [
        [0, 2, 1], [1, 2, 3], [4, 5, 6], [5, 7, 6],
        [0, 1, 4], [1, 5, 4], [2, 6, 3], [3, 6, 7],
        [0, 4, 2], [2, 4, 6], [1, 3, 5], [3, 7, 5],
    ];
    let block = MeshObject::from_indexed(&positions, &faces, mirror)?;
    builder.add_object(
        SceneObject::new()
            .with_mesh(block)
            .with_mesh_acceleration(AccelerationConfig::Naive)
            .scale(Vec3::new(0.8, 1.2, 0.8))
            .rotate(Vec3::Y, 0.4)
            .translate(Vec3::new(-0.6, -0.9, -0.5)),
    );

    builder.add_object(
        SceneObject::new()
            .with_mesh(MeshObject::quad(
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::X,
                Vec3::Y,
                glass,
            ))
            .uniform_scale(1.2)
            .rotate(Vec3::Y, -0.5)
            .translate(Vec3::new(0.7, -0.8, 0.2)),
    );

    builder
        .add_light(PointLight::new(Vec3::new(0.0, 1.3, 0.0), Color::splat(1.2)))
        .set_environment(Environment::Solid(Color::ZERO));
    Ok(builder)
}

/// Write a clamped, gamma-corrected binary PPM.
fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    write!(file, "P6\n{} {}\n255\n", image.width, image.height)?;
    file.write_all(&image.to_rgb8())?;
    file.flush()
}
