//! Halo - offline CPU ray tracer.
//!
//! Scenes are built from triangle meshes grouped into transformed objects,
//! indexed by interchangeable acceleration structures (linear scan, BVH,
//! uniform grid) and shaded either by a Whitted-style backward renderer or
//! by a photon mapper layered on top of it.
//!
//! ```ignore
//! let mut builder = SceneBuilder::new();
//! builder.add_object(SceneObject::new().with_mesh(mesh));
//! builder.add_light(PointLight::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE));
//! let scene = Arc::new(builder.finalize(&config.scene_acceleration)?);
//!
//! let renderer = build_renderer(scene, &config)?;
//! let image = render(renderer.as_ref(), &camera, &config, 640, 480);
//! ```

pub mod acceleration;
mod bucket;
mod camera;
pub mod config;
mod error;
mod intersection;
mod light;
mod material;
mod mesh;
mod photon_map;
pub mod renderer;
mod sampling;
mod scene;
mod scene_object;
mod triangle;

#[cfg(test)]
mod test_scenes;

pub use acceleration::Accelerator;
pub use bucket::{generate_buckets, render, render_bucket, Bucket, BucketResult, ImageBuffer};
pub use camera::Camera;
pub use config::{AccelerationConfig, PhotonConfig, PhotonEstimate, RenderConfig, RendererKind};
pub use error::{TracerError, TracerResult};
pub use intersection::{Intersectable, IntersectionState, SurfaceHit};
pub use light::{Light, PointLight};
pub use material::{Color, Material};
pub use mesh::MeshObject;
pub use photon_map::{Photon, PhotonMap};
pub use renderer::{build_renderer, BackwardRenderer, PhotonMappingRenderer, Renderer};
pub use scene::{Environment, Scene, SceneBuilder};
pub use scene_object::SceneObject;
pub use triangle::Triangle;

/// Re-export the math types from halo_math
pub use halo_math::{Aabb, Mat4, Quat, Ray, Vec3};
