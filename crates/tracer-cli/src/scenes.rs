use std::sync::Arc;

use glam::{Quat, Vec3};
use tracer::{
    color::{Rgb, WHITE},
    environment::{Environment, Flat, Gradient},
    material::{Checker, Material},
    math::transform::Transform,
    shape::{Cube, Primitive, Sphere},
};

use crate::cli::AvailableScene;

pub struct Scene {
    pub primitives: Vec<Arc<Primitive>>,
    pub environment: Box<dyn Environment>,
}

pub fn build(selector: AvailableScene) -> Scene {
    match selector {
        AvailableScene::Spheres => spheres(),
        AvailableScene::Cornell => cornell(),
        AvailableScene::Glass => glass(),
    }
}

fn sphere(center: Vec3, diameter: f32, material: Material) -> Arc<Primitive> {
    Arc::new(Primitive::Sphere(Sphere::new(
        Transform::from_trs(center, Quat::IDENTITY, Vec3::splat(diameter)),
        Arc::new(material),
    )))
}

fn slab(center: Vec3, size: Vec3, material: Material) -> Arc<Primitive> {
    Arc::new(Primitive::Cube(Cube::new(
        Transform::from_trs(center, Quat::IDENTITY, size),
        Arc::new(material),
    )))
}

/// A grid of spheres sweeping roughness and metalness over a checkered
/// ground, lit by the sky and one bright sphere.
fn spheres() -> Scene {
    let mut primitives = vec![slab(
        Vec3::new(0.0, -0.1, 0.0),
        Vec3::new(50.0, 0.2, 50.0),
        Material::new(
            Box::new(Checker {
                even: Rgb::splat(0.75),
                odd: Rgb::splat(0.3),
                scale: 16.0,
            }),
            0.0,
            0.6,
            0.04,
            tracer::color::BLACK,
            0.0,
        ),
    )];

    for i in 0..5 {
        let roughness = 0.1 + 0.2 * i as f32;
        primitives.push(sphere(
            Vec3::new(i as f32 - 2.0, 0.5, 0.0),
            0.9,
            Material::metal(Rgb::new(0.95, 0.7, 0.3), roughness),
        ));
        primitives.push(sphere(
            Vec3::new(i as f32 - 2.0, 0.5, -1.5),
            0.9,
            Material::plastic(Rgb::new(0.2, 0.3 + 0.15 * i as f32, 0.8)),
        ));
    }
    primitives.push(sphere(
        Vec3::new(-3.0, 4.0, 2.0),
        1.5,
        Material::light(Rgb::splat(30.0)),
    ));

    Scene {
        primitives,
        environment: Box::new(Gradient {
            ground: Rgb::splat(0.2),
            sky: Rgb::new(0.4, 0.6, 0.9),
        }),
    }
}

/// The classic box room: matte walls, two blocks, one area light under the
/// ceiling. Best viewed with `--from 0,1,3.2 --to 0,1,0 --fov 60`.
fn cornell() -> Scene {
    let white = || Material::lambert(Rgb::splat(0.73));
    let red = Material::lambert(Rgb::new(0.65, 0.05, 0.05));
    let green = Material::lambert(Rgb::new(0.12, 0.45, 0.15));

    let primitives = vec![
        // Floor, ceiling, back wall
        slab(Vec3::new(0.0, -0.05, 0.0), Vec3::new(2.0, 0.1, 2.0), white()),
        slab(Vec3::new(0.0, 2.05, 0.0), Vec3::new(2.0, 0.1, 2.0), white()),
        slab(Vec3::new(0.0, 1.0, -1.05), Vec3::new(2.0, 2.0, 0.1), white()),
        // Side walls
        slab(Vec3::new(-1.05, 1.0, 0.0), Vec3::new(0.1, 2.0, 2.0), red),
        slab(Vec3::new(1.05, 1.0, 0.0), Vec3::new(0.1, 2.0, 2.0), green),
        // Blocks
        slab(
            Vec3::new(-0.35, 0.6, -0.35),
            Vec3::new(0.6, 1.2, 0.6),
            white(),
        ),
        slab(Vec3::new(0.4, 0.3, 0.3), Vec3::new(0.55, 0.6, 0.55), white()),
        // Light panel
        slab(
            Vec3::new(0.0, 1.98, 0.0),
            Vec3::new(0.5, 0.02, 0.5),
            Material::light(Rgb::splat(18.0)),
        ),
    ];

    Scene {
        primitives,
        environment: Box::new(Flat(tracer::color::BLACK)),
    }
}

/// Transmissive spheres over a checkerboard, for caustic and tint checks.
fn glass() -> Scene {
    let primitives = vec![
        slab(
            Vec3::new(0.0, -0.1, 0.0),
            Vec3::new(30.0, 0.2, 30.0),
            Material::new(
                Box::new(Checker {
                    even: WHITE,
                    odd: Rgb::splat(0.25),
                    scale: 10.0,
                }),
                0.0,
                0.8,
                0.04,
                tracer::color::BLACK,
                0.0,
            ),
        ),
        sphere(Vec3::new(-0.8, 0.55, 0.0), 1.1, Material::glass(WHITE)),
        sphere(
            Vec3::new(0.8, 0.55, 0.0),
            1.1,
            Material::glass(Rgb::new(0.7, 0.9, 0.7)),
        ),
        sphere(
            Vec3::new(0.0, 5.0, 3.0),
            2.0,
            Material::light(Rgb::splat(25.0)),
        ),
    ];

    Scene {
        primitives,
        environment: Box::new(Gradient {
            ground: Rgb::splat(0.3),
            sky: Rgb::splat(0.8),
        }),
    }
}
