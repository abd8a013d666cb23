//! Lux renderer - CPU path tracing
//!
//! A Monte Carlo path tracer for spheres and triangles with diffuse,
//! metallic and dielectric materials under a sky gradient.
//!
//! The core is infallible: misses, absorption and exhausted bounce budgets
//! all resolve to colors. Errors only appear at the edges (configuration
//! validation, cancellation, image output).

mod bucket;
mod camera;
mod hittable;
mod material;
mod output;
mod renderer;
mod sphere;
mod triangle;

pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, ParallelOptions,
    DEFAULT_BUCKET_SIZE,
};
pub use camera::{Camera, CameraConfig, ConfigError};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Absorption, Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use output::{encode_image, save_image, write_ppm, OutputError, OutputResult};
pub use renderer::{
    color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, sky_color, ImageBuffer,
    RenderError, MIN_HIT_DISTANCE,
};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export common math types from lux_math
pub use lux_math::{Interval, Ray, Vec3};
