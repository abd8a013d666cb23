//! Built-in scenes.

use std::sync::Arc;

use lux_math::{gen_f32, gen_range, random_vec3, Vec3};
use lux_renderer::{
    Absorption, CameraConfig, Color, Dielectric, HittableList, Lambertian, Material, Metal, Sphere,
    Triangle,
};
use rand::RngCore;

use crate::cli::SceneKind;

/// A world together with the camera it is meant to be viewed through.
pub struct Scene {
    pub world: HittableList,
    pub camera: CameraConfig,
}

impl Scene {
    pub fn build(kind: SceneKind, rng: &mut dyn RngCore) -> Self {
        match kind {
            SceneKind::Cover => cover(rng),
            SceneKind::Showcase => showcase(),
        }
    }
}

/// Ground plane, a 22x22 field of small random spheres and three large ones.
pub fn cover(rng: &mut dyn RngCore) -> Scene {
    let mut world = HittableList::new();

    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground));

    let clearing = Vec3::new(4.0, 0.2, 0.0);
    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - clearing).length() <= 0.9 {
                continue;
            }

            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                Arc::new(Lambertian::new(albedo))
            } else if choose_mat < 0.95 {
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range(rng, 0.0, 0.5);
                Arc::new(Metal::new(albedo, fuzz))
            } else {
                Arc::new(Dielectric::new(1.5))
            };
            world.add(Sphere::new(center, 0.2, material));
        }
    }

    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Arc::new(Dielectric::new(1.5))));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    let camera = CameraConfig::default()
        .with_resolution(1200, 16.0 / 9.0)
        .with_quality(500, 50)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    Scene { world, camera }
}

/// Small scene with a triangle wall, a hollow glass ball and a fuzzy metal ball.
pub fn showcase() -> Scene {
    let mut world = HittableList::new();

    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0)));
    let wall: Arc<dyn Material> = Arc::new(Lambertian::with_absorption(
        Color::new(0.2, 0.3, 0.7),
        0.3,
        Absorption::Compensated,
    ));
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let metal: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.3));
    let matte: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.7, 0.3, 0.3)));

    world.add(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, ground));

    // Quad behind the spheres, facing the camera
    let (x0, x1, y0, y1, z) = (-2.0, 2.0, -0.5, 1.5, -2.5);
    let bottom_left = Vec3::new(x0, y0, z);
    let bottom_right = Vec3::new(x1, y0, z);
    let top_right = Vec3::new(x1, y1, z);
    let top_left = Vec3::new(x0, y1, z);
    world.add(Triangle::from_vertices(bottom_left, bottom_right, top_right, wall.clone()));
    world.add(Triangle::from_vertices(bottom_left, top_right, top_left, wall));

    // Hollow glass: the inner sphere's negative radius flips its normals
    world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, glass.clone()));
    world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), -0.45, glass));
    world.add(Sphere::new(Vec3::new(0.0, 0.0, -1.2), 0.5, matte));
    world.add(Sphere::new(Vec3::new(1.0, 0.0, -1.0), 0.5, metal));

    let camera = CameraConfig::default()
        .with_resolution(400, 16.0 / 9.0)
        .with_quality(50, 20)
        .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(50.0, 0.0, 3.4);

    Scene { world, camera }
}
