//! The geometry that can be rendered: spheres, cubes and triangles.
//!
//! The variant set is closed and dispatched with `match` so the intersection
//! hot loop never goes through a vtable. Spheres and cubes are unit solids in
//! object space (unit diameter / unit edge) carried into the world by their
//! [`Transform`]; triangles are stored directly in world space.

pub mod cube;
pub mod sphere;
pub mod triangle;

pub use cube::Cube;
pub use sphere::Sphere;
pub use triangle::Triangle;

use glam::Vec3;

use crate::{
    color::Rgb, material::Material, math::bounds::Bounds, math::point::Point, ray::Ray,
};

pub type Uv = [f32; 2];

/// Everything the shading step needs to know about an intersection point.
#[derive(Debug)]
pub struct LocalInfo {
    pub pos: Point,
    /// Outward geometric normal, unit length.
    pub normal: Vec3,
    pub uv: Uv,
}

pub enum Primitive {
    Sphere(Sphere),
    Cube(Cube),
    Triangle(Triangle),
}

impl Primitive {
    /// Nearest intersection distance in `(bias, max_t)`, or None.
    ///
    /// Degenerate configurations (parallel slabs, near-zero triangle
    /// determinants) are misses, never errors.
    pub fn intersect(&self, ray: &Ray, max_t: f32) -> Option<f32> {
        match self {
            Primitive::Sphere(s) => s.intersect(ray, max_t),
            Primitive::Cube(c) => c.intersect(ray, max_t),
            Primitive::Triangle(t) => t.intersect(ray, max_t),
        }
    }

    /// Local surface information at distance `t` along `ray`; `t` must come
    /// from a successful [`Self::intersect`] with the same ray.
    pub fn local_info(&self, ray: &Ray, t: f32) -> LocalInfo {
        match self {
            Primitive::Sphere(s) => s.local_info(ray, t),
            Primitive::Cube(c) => c.local_info(ray, t),
            Primitive::Triangle(tri) => tri.local_info(ray, t),
        }
    }

    pub fn bounds(&self) -> &Bounds {
        match self {
            Primitive::Sphere(s) => &s.bounds,
            Primitive::Cube(c) => &c.bounds,
            Primitive::Triangle(t) => &t.bounds,
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Primitive::Sphere(s) => &s.material,
            Primitive::Cube(c) => &c.material,
            Primitive::Triangle(t) => &t.material,
        }
    }

    pub fn emission(&self) -> Rgb {
        self.material().emission
    }

    pub fn is_light(&self) -> bool {
        !self.emission().is_black()
    }
}
