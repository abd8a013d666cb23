//! Material trait for surface scattering.

use crate::{hittable::HitRecord, Ray};
use lux_math::{gen_f32, random_unit_vector, reflect, refract, NearZero, Vec3};
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Outcome of a successful scatter event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    /// Per-channel factor applied to the light carried back along the path
    pub attenuation: Color,
    /// The outgoing ray, starting at the hit point
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
///
/// Materials are immutable and shared between every primitive that uses them.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns the attenuation and scattered ray, or `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;
}

/// How a Lambertian surface loses the fraction of light it does not reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Absorption {
    /// Always scatter, with the albedo scaled by `1 - loss`.
    #[default]
    Attenuate,
    /// Absorb with probability `loss`, otherwise scatter with the full albedo.
    Stochastic,
    /// Absorb with probability `loss`, otherwise scatter with `albedo / (1 - loss)`.
    ///
    /// Same expected value as [`Absorption::Attenuate`].
    Compensated,
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    attenuation: Color,
    absorb_probability: f32,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self {
            attenuation: albedo,
            absorb_probability: 0.0,
        }
    }

    /// Create a Lambertian material that loses `loss` (0..1) of the incoming light.
    pub fn with_absorption(albedo: Color, loss: f32, mode: Absorption) -> Self {
        let loss = loss.clamp(0.0, 1.0);
        match mode {
            Absorption::Attenuate => Self {
                attenuation: albedo * (1.0 - loss),
                absorb_probability: 0.0,
            },
            Absorption::Stochastic => Self {
                attenuation: albedo,
                absorb_probability: loss,
            },
            Absorption::Compensated => {
                // Keep the compensation factor finite
                let loss = loss.min(0.999);
                Self {
                    attenuation: albedo / (1.0 - loss),
                    absorb_probability: loss,
                }
            }
        }
    }
}

impl Material for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        if self.absorb_probability > 0.0 && gen_f32(rng) < self.absorb_probability {
            return None;
        }

        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.attenuation,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);

        // Fuzz can push the ray below the surface; treat that as absorption
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, scattered_dir),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let direction = refract(unit_direction, rec.normal, refraction_ratio, rng);

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}
