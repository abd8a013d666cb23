//! Camera configuration and ray generation.

use crate::Ray;
use lux_math::{gen_f32, random_in_unit_disk, NearZero, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported when validating a camera configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("image width must be positive")]
    ZeroWidth,

    #[error("sample size must be positive")]
    ZeroSamples,

    #[error("aspect ratio must be positive and finite, got {0}")]
    InvalidAspectRatio(f32),

    #[error("focus distance must be positive and finite, got {0}")]
    InvalidFocusDistance(f32),

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    #[error("defocus angle must be non-negative, got {0}")]
    InvalidDefocusAngle(f32),

    #[error("look_from and look_at must differ")]
    DegenerateView,
}

/// User-facing camera settings.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Image width over height
    pub aspect_ratio: f32,
    /// Rendered image width in pixels
    pub image_width: u32,
    /// Random samples per pixel
    pub sample_size: u32,
    /// Maximum number of ray bounces
    pub max_depth: u32,
    /// Vertical field of view in degrees
    pub v_fov: f32,
    /// Point the camera looks from
    pub look_from: Vec3,
    /// Point the camera looks at
    pub look_at: Vec3,
    /// Up direction hint
    pub v_up: Vec3,
    /// Variation angle of rays through each pixel, in degrees (0 disables depth of field)
    pub defocus_angle: f32,
    /// Distance from look_from to the plane of perfect focus
    pub focus_dist: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            sample_size: 10,
            max_depth: 10,
            v_fov: 90.0,
            look_from: Vec3::new(0.0, 0.0, -1.0),
            look_at: Vec3::ZERO,
            v_up: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        }
    }
}

impl CameraConfig {
    /// Set image width and aspect ratio.
    pub fn with_resolution(mut self, image_width: u32, aspect_ratio: f32) -> Self {
        self.image_width = image_width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, sample_size: u32, max_depth: u32) -> Self {
        self.sample_size = sample_size;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, v_up: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.v_up = v_up;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, v_fov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.v_fov = v_fov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Image height derived from width and aspect ratio, at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    /// Check the settings a render cannot proceed without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.sample_size == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(ConfigError::InvalidAspectRatio(self.aspect_ratio));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(ConfigError::InvalidFocusDistance(self.focus_dist));
        }
        if !(self.v_fov > 0.0 && self.v_fov < 180.0) {
            return Err(ConfigError::InvalidFieldOfView(self.v_fov));
        }
        if !(self.defocus_angle >= 0.0) {
            return Err(ConfigError::InvalidDefocusAngle(self.defocus_angle));
        }
        if (self.look_from - self.look_at).near_zero() {
            return Err(ConfigError::DegenerateView);
        }
        Ok(())
    }
}

/// Camera for generating rays into the scene.
///
/// All fields are derived once from a [`CameraConfig`] and stay fixed for
/// the duration of a render.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    sample_size: u32,
    max_depth: u32,
    defocus_angle: f32,

    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Derive the viewport geometry for a render.
    pub fn new(config: &CameraConfig) -> Self {
        let image_width = config.image_width;
        let image_height = config.image_height();
        let center = config.look_from;

        // Calculate viewport dimensions
        let theta = config.v_fov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        // Calculate camera basis vectors
        let w = (config.look_from - config.look_at).normalize();
        let mut v_up = config.v_up;
        if v_up.cross(w).near_zero() {
            // Looking along the up hint; pick an axis that is not parallel to w
            v_up = if w.y.abs() > 0.5 {
                if w.y > 0.0 { Vec3::NEG_Z } else { Vec3::Z }
            } else {
                Vec3::Y
            };
        }
        let u = v_up.cross(w).normalize();
        let v = w.cross(u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        // Calculate pixel delta vectors
        let pixel_delta_u = viewport_u / image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left = center - config.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = config.focus_dist * (config.defocus_angle / 2.0).to_radians().tan();

        Self {
            image_width,
            image_height,
            sample_size: config.sample_size,
            max_depth: config.max_depth,
            defocus_angle: config.defocus_angle,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        }
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Camera frame as (right, up, backward).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    ///
    /// The target is jittered uniformly within the pixel; the origin is
    /// sampled from the defocus disk when depth of field is enabled.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

/// Sample a random point in the unit square [-0.5, 0.5) x [-0.5, 0.5).
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_image_height_derivation() {
        let config = CameraConfig::default().with_resolution(400, 16.0 / 9.0);
        assert_eq!(config.image_height(), 225);

        // Never below one pixel
        let wide = CameraConfig::default().with_resolution(10, 100.0);
        assert_eq!(wide.image_height(), 1);
    }

    #[test]
    fn test_camera_basis() {
        let config = CameraConfig::default()
            .with_resolution(800, 2.0)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        let camera = Camera::new(&config);

        let (u, v, w) = camera.basis();
        assert!(close(u, Vec3::X));
        assert!(close(v, Vec3::Y));
        assert!(close(w, Vec3::Z));
        assert_eq!(camera.image_height(), 400);
    }

    #[test]
    fn test_viewport_geometry() {
        // 90 degree fov at focus distance 1 gives a 2x2 viewport
        let config = CameraConfig::default()
            .with_resolution(2, 1.0)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        let camera = Camera::new(&config);

        assert!(close(camera.pixel_delta_u, Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(camera.pixel_delta_v, Vec3::new(0.0, -1.0, 0.0)));
        assert!(close(camera.pixel00_loc, Vec3::new(-0.5, 0.5, -1.0)));
        assert_eq!(camera.defocus_disk_u, Vec3::ZERO);
    }

    #[test]
    fn test_degenerate_up_vector() {
        // Looking straight down with the default up hint
        let down = CameraConfig::default().with_position(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Y);
        let (u, v, w) = Camera::new(&down).basis();
        assert!(close(w, Vec3::Y));
        assert!(u.is_finite() && v.is_finite());
        assert!((u.length() - 1.0).abs() < 1e-5);
        assert!(u.dot(w).abs() < 1e-5 && v.dot(w).abs() < 1e-5 && u.dot(v).abs() < 1e-5);

        // Looking straight up
        let up = CameraConfig::default().with_position(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        let (u, v, w) = Camera::new(&up).basis();
        assert!(close(w, Vec3::NEG_Y));
        assert!(u.is_finite() && v.is_finite());
        assert!((v.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_up_hint_along_horizontal_view() {
        // Up hint parallel to a view along the z axis
        let config = CameraConfig::default().with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Z);
        let camera = Camera::new(&config);
        let (u, v, w) = camera.basis();
        assert!(close(w, Vec3::Z));
        assert!(close(u, Vec3::X));
        assert!(close(v, Vec3::Y));

        let mut rng = StdRng::seed_from_u64(3);
        let ray = camera.get_ray(0, 0, &mut rng);
        assert!(ray.origin().is_finite() && ray.direction().is_finite());
    }

    #[test]
    fn test_rays_stay_inside_their_pixel() {
        let config = CameraConfig::default()
            .with_resolution(2, 1.0)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        let camera = Camera::new(&config);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let ray = camera.get_ray(1, 1, &mut rng);
            assert_eq!(ray.origin(), Vec3::ZERO);
            // Pixel (1, 1) covers x in [0, 1], y in [-1, 0] on the z=-1 plane
            let target = ray.at(1.0);
            assert!((target.z + 1.0).abs() < 1e-6);
            assert!((-1e-6..=1.0 + 1e-6).contains(&target.x));
            assert!((-1.0 - 1e-6..=1e-6).contains(&target.y));
        }
    }

    #[test]
    fn test_defocus_origins_lie_on_disk() {
        let config = CameraConfig::default()
            .with_resolution(10, 1.0)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 90.0, 2.0);
        let camera = Camera::new(&config);
        let mut rng = StdRng::seed_from_u64(5);

        // Radius = focus_dist * tan(45 deg) = 2
        let mut moved = false;
        for _ in 0..100 {
            let ray = camera.get_ray(5, 5, &mut rng);
            let origin = ray.origin();
            assert!(origin.z.abs() < 1e-6);
            assert!(origin.length() < 2.0 + 1e-4);
            moved |= origin.length() > 1e-3;
        }
        assert!(moved);
    }

    #[test]
    fn test_validate() {
        assert_eq!(CameraConfig::default().validate(), Ok(()));

        let mut config = CameraConfig::default();
        config.image_width = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroWidth));

        let config = CameraConfig::default().with_quality(0, 10);
        assert_eq!(config.validate(), Err(ConfigError::ZeroSamples));

        let config = CameraConfig::default().with_lens(90.0, 0.0, 0.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidFocusDistance(0.0)));

        let config = CameraConfig::default().with_lens(180.0, 0.0, 1.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidFieldOfView(180.0)));

        let config = CameraConfig::default().with_position(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert_eq!(config.validate(), Err(ConfigError::DegenerateView));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: CameraConfig =
            serde_json::from_str(r#"{ "image_width": 320, "look_from": [13.0, 2.0, 3.0] }"#)
                .expect("valid config");

        assert_eq!(config.image_width, 320);
        assert_eq!(config.look_from, Vec3::new(13.0, 2.0, 3.0));
        assert_eq!(config.sample_size, CameraConfig::default().sample_size);
        assert_eq!(config.v_up, Vec3::Y);
    }
}
