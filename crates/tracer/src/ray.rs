use glam::Vec3;

use crate::math::point::Point;

/// A ray with a normalized direction and the per-axis reciprocal of that
/// direction, precomputed once so slab tests never divide.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vec3,
    pub d_rcp: Vec3,
}

impl Ray {
    pub fn new(origin: Point, direction: Vec3) -> Self {
        let direction = direction.normalize();
        Self {
            origin,
            direction,
            // IEEE +/-inf on zero components is what the slab test expects
            d_rcp: direction.recip(),
        }
    }

    pub fn at(&self, t: f32) -> Point {
        self.origin + t * self.direction
    }
}
