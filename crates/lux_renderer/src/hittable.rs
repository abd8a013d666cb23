//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray};
use lux_math::{Interval, Vec3};

/// Record of a ray-object intersection.
///
/// The material is borrowed from the object that was hit; the record never
/// owns it.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always pointing against the incoming ray
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the geometric normal already opposed the ray (ray hit the outside)
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at `t` along `ray`.
    ///
    /// `outward_normal` must be unit length.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a dyn Material) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object strictly inside the given interval.
    ///
    /// Returns the closest qualifying hit, or `None` on a miss.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;
}

/// An ordered list of hittable objects.
///
/// The list is itself hittable, so lists can be nested.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Hittable + 'static) {
        self.objects.push(Box::new(object));
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest = None;
        let mut closest_so_far = ray_t.max;

        // Each later object only has to beat the best hit so far
        for object in &self.objects {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Dielectric, Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn sphere(z: f32, radius: f32, albedo: Color) -> Sphere {
        Sphere::new(Vec3::new(0.0, 0.0, z), radius, Arc::new(Lambertian::new(albedo)))
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::NEG_Z)
    }

    const FORWARD: Interval = Interval::new(0.001, f32::INFINITY);

    #[test]
    fn test_face_normal_orientation() {
        let mat = Lambertian::new(Color::ONE);
        let ray = forward_ray();

        let front = HitRecord::new(&ray, 1.0, Vec3::Z, &mat);
        assert!(front.front_face);
        assert_eq!(front.normal, Vec3::Z);
        assert_eq!(front.p, Vec3::new(0.0, 0.0, -1.0));

        let back = HitRecord::new(&ray, 1.0, Vec3::NEG_Z, &mat);
        assert!(!back.front_face);
        assert_eq!(back.normal, Vec3::Z);
    }

    #[test]
    fn test_empty_list_misses() {
        let world = HittableList::new();
        assert!(world.is_empty());
        assert!(world.hit(&forward_ray(), FORWARD).is_none());
    }

    #[test]
    fn test_list_returns_nearest_regardless_of_order() {
        let near = Color::new(1.0, 0.0, 0.0);
        let far = Color::new(0.0, 0.0, 1.0);

        // Overlapping spheres: near surface at t=1.5, far surface at t=2.0
        let mut near_first = HittableList::new();
        near_first.add(sphere(-2.0, 0.5, near));
        near_first.add(sphere(-3.0, 1.0, far));

        let mut far_first = HittableList::new();
        far_first.add(sphere(-3.0, 1.0, far));
        far_first.add(sphere(-2.0, 0.5, near));

        let mut rng = StdRng::seed_from_u64(42);
        for world in [&near_first, &far_first] {
            let rec = world.hit(&forward_ray(), FORWARD).expect("should hit");
            assert!((rec.t - 1.5).abs() < 1e-6);
            let scatter = rec
                .material
                .scatter(&forward_ray(), &rec, &mut rng)
                .expect("lambertian always scatters");
            assert_eq!(scatter.attenuation, near);
        }
    }

    #[test]
    fn test_list_respects_upper_bound() {
        let mut world = HittableList::new();
        world.add(sphere(-5.0, 1.0, Color::ONE));

        assert!(world.hit(&forward_ray(), Interval::new(0.001, 3.0)).is_none());
        assert!(world.hit(&forward_ray(), Interval::new(0.001, 4.5)).is_some());
    }

    #[test]
    fn test_nested_lists() {
        let mut inner = HittableList::new();
        inner.add(sphere(-2.0, 0.5, Color::ONE));

        let mut world = HittableList::new();
        world.add(sphere(-10.0, 1.0, Color::ONE));
        world.add(inner);
        assert_eq!(world.len(), 2);

        let rec = world.hit(&forward_ray(), FORWARD).expect("should hit");
        assert!((rec.t - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_hollow_glass_sphere_hits_outer_shell_first() {
        let glass = Arc::new(Dielectric::new(1.5));
        let center = Vec3::new(0.0, 0.0, -3.0);

        // Inner shell listed first must not win
        let mut world = HittableList::new();
        world.add(Sphere::new(center, -0.8, glass.clone()));
        world.add(Sphere::new(center, 1.0, glass));

        let rec = world.hit(&forward_ray(), FORWARD).expect("should hit");
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }
}
