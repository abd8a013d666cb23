//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop with configurable depth
//! - Sky gradient as the only light source
//! - Anti-aliasing via multi-sampling
//! - Gamma correction (2.2) and 8-bit quantization

use crate::{Camera, CameraConfig, Color, ConfigError, Hittable, Ray};
use lux_math::Interval;
use rand::RngCore;
use thiserror::Error;

/// Closest accepted hit distance along a ray.
///
/// Hits nearer than this are rounding noise from the ray starting on the
/// surface it just left ("shadow acne").
pub const MIN_HIT_DISTANCE: f32 = 0.001;

/// Range quantized channels are clamped to before scaling by 256.
const INTENSITY: Interval = Interval::new(0.0, 0.999);

/// Errors that can stop a render before it completes.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid camera configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("render cancelled")]
    Cancelled,
}

/// Compute the color seen by a ray.
///
/// Follows the path iteratively so `max_depth` is not limited by the call
/// stack. Returns black when the ray is absorbed or the bounce budget runs
/// out, and the attenuated sky color when it escapes.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, max_depth: u32, rng: &mut dyn RngCore) -> Color {
    let mut current_attenuation = Color::ONE;
    let mut ray = *ray;
    let mut depth = max_depth;

    while depth > 0 {
        depth -= 1;

        let Some(rec) = world.hit(&ray, Interval::new(MIN_HIT_DISTANCE, f32::INFINITY)) else {
            // Escaped to the sky
            return current_attenuation * sky_color(&ray);
        };

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                current_attenuation *= result.attenuation;
                ray = result.scattered;
            }
            None => return Color::ZERO,
        }
    }

    Color::ZERO
}

/// Sky gradient from white at the horizon-down to light blue overhead.
pub fn sky_color(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.2).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

/// Convert an averaged linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (256.0 * INTENSITY.clamp(linear_to_gamma(c))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Render a single pixel with multi-sampling.
///
/// Returns the average of `camera.sample_size()` path samples.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = camera.sample_size();
    if samples == 0 {
        return Color::ZERO;
    }

    let mut pixel_color = Color::ZERO;
    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth(), rng);
    }

    pixel_color / samples as f32
}

/// Image buffer of averaged linear colors, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
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
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Flat 8-bit RGB buffer for an image encoder.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*color));
        }
        bytes
    }
}

/// Render the entire scene to an image buffer on the calling thread.
///
/// Camera geometry is derived from `config` once, then scanlines are
/// traced top to bottom.
pub fn render(config: &CameraConfig, world: &dyn Hittable, rng: &mut dyn RngCore) -> ImageBuffer {
    let camera = Camera::new(config);
    let mut image = ImageBuffer::new(camera.image_width(), camera.image_height());

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}",
        image.width,
        image.height,
        camera.sample_size(),
        camera.max_depth()
    );

    for y in 0..image.height {
        log::trace!("Scanline {}/{}", y + 1, image.height);
        for x in 0..image.width {
            let color = render_pixel(&camera, world, x, y, rng);
            image.set(x, y, color);
        }
    }

    log::info!("Render complete");
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Absorption, HittableList, Lambertian, Metal, Sphere, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn single_sphere_world() -> HittableList {
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
        ));
        world
    }

    #[test]
    fn test_sky_gradient() {
        let up = sky_color(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)));
        let down = sky_color(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)));

        assert!((up - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 1e-6);
        assert!((linear_to_gamma(0.5) - 0.5f32.powf(1.0 / 2.2)).abs() < 1e-6);
    }

    #[test]
    fn test_color_to_rgb_extremes() {
        assert_eq!(color_to_rgb(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb(Color::ZERO), [0, 0, 0]);
        // Over-bright and negative values saturate
        assert_eq!(color_to_rgb(Color::new(4.0, -1.0, 0.0)), [255, 0, 0]);
    }

    #[test]
    fn test_averaged_white_quantizes_to_full() {
        for samples in [1u32, 3, 7, 100] {
            let sum = (0..samples).fold(Color::ZERO, |acc, _| acc + Color::ONE);
            assert_eq!(color_to_rgb(sum / samples as f32), [255, 255, 255]);
        }
    }

    #[test]
    fn test_zero_depth_is_black() {
        let world = single_sphere_world();
        let mut rng = StdRng::seed_from_u64(42);

        let at_sphere = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let at_sky = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(ray_color(&at_sphere, &world, 0, &mut rng), Color::ZERO);
        assert_eq!(ray_color(&at_sky, &world, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_returns_sky() {
        let world = single_sphere_world();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);

        assert_eq!(ray_color(&ray, &world, 1, &mut rng), sky_color(&ray));
    }

    #[test]
    fn test_single_bounce_budget_is_black_on_hit() {
        // One bounce is spent on the hit; the scattered ray never gets traced
        let world = single_sphere_world();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert_eq!(ray_color(&ray, &world, 1, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_absorption_is_black() {
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::with_absorption(Color::ONE, 1.0, Absorption::Stochastic)),
        ));
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert_eq!(ray_color(&ray, &world, 10, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_path_radiance_bounded_by_sky() {
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Metal::new(Color::ONE, 1.0)),
        ));
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        for _ in 0..100 {
            let color = ray_color(&ray, &world, 10, &mut rng);
            assert!(color.max_element() <= 1.0 + 1e-6);
            assert!(color.min_element() >= 0.0);
        }
    }

    #[test]
    fn test_deep_paths_do_not_overflow() {
        // Mirror-lined sphere: the ray bounces along the x axis forever
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::ZERO,
            10.0,
            Arc::new(Metal::new(Color::ONE, 0.0)),
        ));
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray_color(&ray, &world, 200_000, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_render_pixel() {
        let world = single_sphere_world();
        let config = CameraConfig::default()
            .with_resolution(10, 1.0)
            .with_quality(4, 5)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        let camera = Camera::new(&config);
        let mut rng = StdRng::seed_from_u64(42);

        // Center pixel hits the sphere; gray albedo darkens the sky
        let color = render_pixel(&camera, &world, 5, 5, &mut rng);
        assert!(color.length() > 0.0);
        assert!(color.max_element() < 1.0);
    }

    #[test]
    fn test_image_buffer_layout() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(2, 1, Color::ONE);

        assert_eq!(image.get(2, 1), Color::ONE);
        assert_eq!(image.pixels[5], Color::ONE);

        let bytes = image.to_rgb8();
        assert_eq!(bytes.len(), 3 * 2 * 3);
        assert_eq!(&bytes[15..18], &[255, 255, 255]);
        assert!(bytes[..15].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_render_dimensions() {
        let world = single_sphere_world();
        let config = CameraConfig::default()
            .with_resolution(16, 2.0)
            .with_quality(1, 3);
        let mut rng = StdRng::seed_from_u64(42);

        let image = render(&config, &world, &mut rng);
        assert_eq!((image.width, image.height), (16, 8));
        assert_eq!(image.pixels.len(), 16 * 8);
    }
}
