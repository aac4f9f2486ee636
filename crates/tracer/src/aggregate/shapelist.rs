use std::sync::Arc;

use glam::Vec3;

use crate::{math::bounds::Bounds, ray::Ray, shape::Primitive};

use super::{Aggregate, Hit};

/// Brute-force linear scan over all primitives.
///
/// O(n) per ray; kept as the oracle the KD-tree is validated against and as
/// the sane fallback for tiny scenes.
pub struct ShapeList(pub Vec<Arc<Primitive>>);

impl Aggregate for ShapeList {
    fn intersect(&self, ray: &Ray, max_t: f32) -> Option<Hit<'_>> {
        let mut best: Option<Hit> = None;
        let mut reach = max_t;
        for primitive in &self.0 {
            if let Some(t) = primitive.intersect(ray, reach) {
                reach = t;
                best = Some(Hit { t, primitive });
            }
        }
        best
    }

    fn bounds(&self) -> Bounds {
        self.0
            .iter()
            .map(|p| *p.bounds())
            .reduce(|a, b| a.merge(&b))
            .unwrap_or(Bounds::new(Vec3::ZERO, Vec3::ZERO))
    }
}
