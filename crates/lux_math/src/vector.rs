//! Vector helpers for light transport: reflection, refraction and the
//! rejection samplers used by materials and the camera.
//!
//! Every random function takes its generator explicitly so a render (or a
//! worker thread) can own its own stream.

use crate::Vec3;
use rand::{Rng, RngCore};

/// Sup-norm threshold below which a vector is considered degenerate.
pub const NEAR_ZERO_EPSILON: f32 = 1e-8;

/// Degeneracy test for direction vectors.
pub trait NearZero {
    /// True if every component is within [`NEAR_ZERO_EPSILON`] of zero.
    fn near_zero(&self) -> bool;
}

impl NearZero for Vec3 {
    #[inline]
    fn near_zero(&self) -> bool {
        self.abs().max_element() < NEAR_ZERO_EPSILON
    }
}

/// Uniform random f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform random f32 in [min, max).
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Random vector with each component uniform in [min, max).
pub fn random_vec3(rng: &mut dyn RngCore, min: f32, max: f32) -> Vec3 {
    Vec3::new(
        gen_range(rng, min, max),
        gen_range(rng, min, max),
        gen_range(rng, min, max),
    )
}

/// Random unit vector, uniformly distributed on the unit sphere.
///
/// Candidates are drawn from the [-1, 1) cube and kept only when they fall
/// inside the unit ball, then normalized. Points too close to the origin are
/// rejected as well so the normalization is always defined.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        let len_sq = p.length_squared();
        if len_sq > 1e-6 && len_sq < 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Random point inside the unit disk in the xy plane (z = 0).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Reflect `v` about the normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Schlick's approximation of Fresnel reflectance.
#[inline]
pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Refract the unit vector `v` through a surface with unit normal `n`.
///
/// `refraction_ratio` is eta_in / eta_out. Under total internal reflection,
/// or with probability given by the Schlick reflectance, the reflected
/// direction is returned instead, which yields the Fresnel behaviour of glass
/// without splitting the ray.
pub fn refract(v: Vec3, n: Vec3, refraction_ratio: f32, rng: &mut dyn RngCore) -> Vec3 {
    let cos_theta = v.dot(-n).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    let cannot_refract = refraction_ratio * sin_theta > 1.0;
    if cannot_refract || reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
        return reflect(v, n);
    }

    let r_out_perp = refraction_ratio * (v + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
