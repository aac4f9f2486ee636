use glam::Vec3;

use crate::ray::Ray;

use super::{float::BIAS, point::Point};

/// Axis-aligned bounding box.
///
/// Invariant: `min <= max` componentwise. Immutable once constructed;
/// transforming geometry rebuilds its bounds rather than mutating them.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(p.vec());
            max = max.max(p.vec());
        }
        Self { min, max }
    }

    pub fn center(&self) -> Point {
        Point(0.5 * (self.min + self.max))
    }

    /// Radius of the bounding sphere around `center`.
    pub fn radius(&self) -> f32 {
        0.5 * (self.max - self.min).length()
    }

    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Axis of largest extent.
    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    pub fn merge(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    pub fn contains(&self, p: Point) -> bool {
        let v = p.vec();
        v.cmpge(self.min).all() && v.cmple(self.max).all()
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.contains(Point(other.min)) && self.contains(Point(other.max))
    }

    /// Split at `wall` along `axis` into the (low, high) halves.
    pub fn split(&self, axis: usize, wall: f32) -> (Bounds, Bounds) {
        let mut low_max = self.max;
        low_max[axis] = wall;
        let mut high_min = self.min;
        high_min[axis] = wall;
        (
            Bounds {
                min: self.min,
                max: low_max,
            },
            Bounds {
                min: high_min,
                max: self.max,
            },
        )
    }

    /// Slab test. Returns the parametric interval in which the ray overlaps
    /// the box, or None. The near bound starts at a small positive bias so a
    /// ray sitting exactly on a face does not self-intersect.
    pub fn check(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t_near = BIAS;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let t0 = (self.min[axis] - ray.origin.axis(axis)) * ray.d_rcp[axis];
            let t1 = (self.max[axis] - ray.origin.axis(axis)) * ray.d_rcp[axis];
            let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_far < t_near {
                return None;
            }
        }

        Some((t_near, t_far))
    }
}
