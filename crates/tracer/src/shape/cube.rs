use std::sync::Arc;

use glam::Vec3;

use crate::{
    material::Material,
    math::{bounds::Bounds, float::BIAS, transform::Transform},
    ray::Ray,
};

use super::{sphere::unit_bounds, LocalInfo};

/// A unit cube `[-0.5, 0.5]^3` in object space, placed by its transform.
pub struct Cube {
    pub transform: Transform,
    pub bounds: Bounds,
    pub material: Arc<Material>,
}

impl Cube {
    pub fn new(transform: Transform, material: Arc<Material>) -> Self {
        Self {
            bounds: unit_bounds(&transform),
            transform,
            material,
        }
    }

    /// Slab test in object space, same structure as `Bounds::check` but
    /// against the fixed unit box.
    pub fn intersect(&self, ray: &Ray, max_t: f32) -> Option<f32> {
        let o = self.transform.inv_point(ray.origin).vec();
        let d = self.transform.inv_vector(ray.direction);

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            if d[axis] == 0.0 {
                // Parallel to this slab: either always inside it or a miss
                if o[axis].abs() > 0.5 {
                    return None;
                }
                continue;
            }
            let t0 = (-0.5 - o[axis]) / d[axis];
            let t1 = (0.5 - o[axis]) / d[axis];
            let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_far < t_near {
                return None;
            }
        }

        if t_near > BIAS && t_near < max_t {
            Some(t_near)
        } else if t_far > BIAS && t_far < max_t {
            Some(t_far)
        } else {
            None
        }
    }

    pub fn local_info(&self, ray: &Ray, t: f32) -> LocalInfo {
        let pos = ray.at(t);
        let local = self.transform.inv_point(pos).vec();

        // The face is the axis of largest object-space magnitude
        let abs = local.abs();
        let (local_normal, uv) = if abs.x >= abs.y && abs.x >= abs.z {
            (
                Vec3::new(local.x.signum(), 0.0, 0.0),
                [local.z + 0.5, local.y + 0.5],
            )
        } else if abs.y >= abs.z {
            (
                Vec3::new(0.0, local.y.signum(), 0.0),
                [local.x + 0.5, local.z + 0.5],
            )
        } else {
            (
                Vec3::new(0.0, 0.0, local.z.signum()),
                [local.x + 0.5, local.y + 0.5],
            )
        };

        LocalInfo {
            pos,
            normal: self.transform.normal(local_normal),
            uv,
        }
    }
}
