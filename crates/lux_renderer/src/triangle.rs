//! Triangle primitive for ray tracing.
//!
//! Intersects the supporting plane first, then checks the hit point against
//! each edge with the sign of `(edge x (p - edge_start)) . normal`.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use lux_math::{Interval, Vec3};
use std::sync::Arc;

/// Rays whose direction has a smaller projection than this onto the
/// triangle normal are treated as parallel to the plane.
pub const PARALLEL_EPSILON: f32 = 0.01;

/// A triangle primitive.
///
/// Vertices are expected counter-clockwise when viewed from the side the
/// normal points to; points are inside when they are on the left of all
/// three edges.
pub struct Triangle {
    a: Vec3,
    b: Vec3,
    c: Vec3,
    /// Plane normal as supplied (not necessarily unit length)
    normal: Vec3,
    material: Arc<dyn Material>,
}

impl Triangle {
    /// Create a triangle with an explicit plane normal.
    pub fn new(a: Vec3, b: Vec3, c: Vec3, normal: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            a,
            b,
            c,
            normal,
            material,
        }
    }

    /// Create a triangle whose normal follows the vertex winding.
    pub fn from_vertices(a: Vec3, b: Vec3, c: Vec3, material: Arc<dyn Material>) -> Self {
        let normal = (b - a).cross(c - a);
        Self::new(a, b, c, normal, material)
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    fn is_left_of(&self, start: Vec3, end: Vec3, p: Vec3) -> bool {
        (end - start).cross(p - start).dot(self.normal) >= 0.0
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        // Coplanar and near-parallel rays are always rejected
        let denom = ray.direction().dot(self.normal);
        if denom.abs() <= PARALLEL_EPSILON {
            return None;
        }

        let t = (self.a - ray.origin()).dot(self.normal) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        if !self.is_left_of(self.a, self.b, p)
            || !self.is_left_of(self.b, self.c, p)
            || !self.is_left_of(self.c, self.a, p)
        {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            self.normal.normalize(),
            self.material.as_ref(),
        ))
    }
}
