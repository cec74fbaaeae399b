//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon, then stitched into an [`ImageBuffer`].

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::renderer::Renderer;
use crate::Color;
use rayon::prelude::*;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets near the middle of the frame come first, so partial renders show
/// the most important part early.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let distance = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Render a single bucket. Returns pixels in row-major order within the
/// bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    renderer: &dyn Renderer,
    image_width: u32,
    image_height: u32,
) -> BucketResult {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            // Through the pixel centre
            let u = (bucket.x + local_x) as f32 + 0.5;
            let v = (bucket.y + local_y) as f32 + 0.5;
            let ray = camera.generate_ray_for_normalized_coordinates(u / image_width as f32, v / image_height as f32);
            pixels.push(renderer.sample_ray(ray));
        }
    }

    BucketResult {
        bucket: *bucket,
        pixels,
    }
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

/// Linear HDR image, one unclamped color per pixel.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (row, line) in result.pixels.chunks(bucket.width.max(1) as usize).enumerate() {
            let start = ((bucket.y + row as u32) * self.width + bucket.x) as usize;
            self.pixels[start..start + line.len()].copy_from_slice(line);
        }
    }

    /// Gamma-corrected (gamma 2) 8-bit RGB, clamped to [0, 1] first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| c.to_array())
            .map(|channel| (255.0 * channel.max(0.0).sqrt().min(1.0)) as u8)
            .collect()
    }
}

/// Render a full `width` x `height` image with `renderer`, whose scene must
/// already be finalized and whose setup must already have run.
pub fn render(renderer: &dyn Renderer, camera: &Camera, config: &RenderConfig, width: u32, height: u32) -> ImageBuffer {
    let buckets = generate_buckets(width, height, config.bucket_size);
    log::info!(
        "Rendering {}x{} in {} buckets of {}px",
        width,
        height,
        buckets.len(),
        config.bucket_size
    );

    let start = std::time::Instant::now();
    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, renderer, width, height))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }
    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
