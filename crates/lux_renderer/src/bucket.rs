//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Each bucket owns its random stream and its
//! own pixel vector; the shared image is only written once every bucket is
//! done.

use crate::renderer::{render_pixel, ImageBuffer, RenderError};
use crate::{Camera, CameraConfig, Color, Hittable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets near the middle of the frame come first, so partial renders
/// show the most important region early.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x = x.saturating_add(bucket_size);
        }
        y = y.saturating_add(bucket_size);
    }

    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    // Stable sort keeps row-major order between equidistant buckets
    buckets.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket, or `None` if
/// `cancel` was raised between two of the bucket's scanlines.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    rng: &mut StdRng,
    cancel: &AtomicBool,
) -> Option<Vec<Color>> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count());

    for local_y in 0..bucket.height {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        for local_x in 0..bucket.width {
            let color = render_pixel(camera, world, bucket.x + local_x, bucket.y + local_y, rng);
            pixels.push(color);
        }
    }

    Some(pixels)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy this bucket's pixels into their slots of the full image.
    fn write_into(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (row, line) in self.pixels.chunks_exact(width).enumerate() {
            let start = (self.bucket.y as usize + row) * image.width as usize + self.bucket.x as usize;
            image.pixels[start..start + width].copy_from_slice(line);
        }
    }
}

/// Settings for [`render_parallel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelOptions {
    /// Base seed; every bucket derives its own stream from it
    pub seed: u64,
    /// Edge length of a bucket in pixels
    pub bucket_size: u32,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Seed for a bucket's generator; independent of which thread renders it.
fn bucket_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render the scene in parallel on the current rayon pool.
///
/// Output is deterministic for a given seed, regardless of thread count.
/// Setting `cancel` makes the render stop at the next bucket scanline and
/// return [`RenderError::Cancelled`].
pub fn render_parallel(
    config: &CameraConfig,
    world: &dyn Hittable,
    options: &ParallelOptions,
    cancel: &AtomicBool,
) -> Result<ImageBuffer, RenderError> {
    config.validate()?;

    let camera = Camera::new(config);
    let width = camera.image_width();
    let height = camera.image_height();
    let buckets = generate_buckets(width, height, options.bucket_size);
    let completed = AtomicUsize::new(0);

    log::info!(
        "Rendering {}x{} @ {} spp in {} buckets on {} threads",
        width,
        height,
        camera.sample_size(),
        buckets.len(),
        rayon::current_num_threads()
    );

    let results: Option<Vec<BucketResult>> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket_seed(options.seed, bucket.index));
            let pixels = render_bucket(bucket, &camera, world, &mut rng, cancel)?;

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("Bucket {}/{} done", done, buckets.len());
            Some(BucketResult::new(*bucket, pixels))
        })
        .collect();

    let results = results.ok_or_else(|| {
        log::warn!("Render cancelled after {} buckets", completed.load(Ordering::Relaxed));
        RenderError::Cancelled
    })?;

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        result.write_into(&mut image);
    }

    log::info!("Render complete");
    Ok(image)
}
