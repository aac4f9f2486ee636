use std::sync::Arc;

use crate::{
    material::Material,
    math::{
        bounds::Bounds, distributions::sphere_uv_from_direction, float::BIAS, point::Point,
        transform::Transform,
    },
    ray::Ray,
};

use super::LocalInfo;

/// A unit-diameter sphere at the object-space origin, placed in the world by
/// its transform. Non-uniform scales produce ellipsoids.
pub struct Sphere {
    pub transform: Transform,
    pub bounds: Bounds,
    pub material: Arc<Material>,
}

/// World AABB of the transformed object-space cube `[-0.5, 0.5]^3`; it
/// contains the unit solid, so the bound is conservative.
pub(super) fn unit_bounds(transform: &Transform) -> Bounds {
    let corners: Vec<Point> = (0..8)
        .map(|i| {
            let sign = |bit: u32| if i >> bit & 1 == 1 { 0.5 } else { -0.5 };
            transform.point(Point::new(sign(0), sign(1), sign(2)))
        })
        .collect();
    Bounds::from_points(&corners)
}

impl Sphere {
    pub fn new(transform: Transform, material: Arc<Material>) -> Self {
        Self {
            bounds: unit_bounds(&transform),
            transform,
            material,
        }
    }

    pub fn intersect(&self, ray: &Ray, max_t: f32) -> Option<f32> {
        let o = self.transform.inv_point(ray.origin).vec();
        let d = self.transform.inv_vector(ray.direction);

        // |o + t d|^2 = 0.25, with t staying the world-space distance because
        // d is the (unnormalized) image of the unit world direction.
        let a = d.length_squared();
        let b = o.dot(d);
        let c = o.length_squared() - 0.25;
        let disc = b * b - a * c;
        if disc < 0.0 || a == 0.0 {
            return None;
        }

        let sq = disc.sqrt();
        let t0 = (-b - sq) / a;
        let t1 = (-b + sq) / a;
        if t0 > BIAS && t0 < max_t {
            Some(t0)
        } else if t1 > BIAS && t1 < max_t {
            Some(t1)
        } else {
            None
        }
    }

    pub fn local_info(&self, ray: &Ray, t: f32) -> LocalInfo {
        let pos = ray.at(t);
        let local = self.transform.inv_point(pos).vec();
        let local_normal = local.normalize_or_zero();
        LocalInfo {
            pos,
            normal: self.transform.normal(local_normal),
            uv: sphere_uv_from_direction(local_normal),
        }
    }
}
