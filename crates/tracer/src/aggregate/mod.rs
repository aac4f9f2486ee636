pub mod kdtree;
pub mod shapelist;

pub use kdtree::KdTree;
pub use shapelist::ShapeList;

use crate::{math::bounds::Bounds, ray::Ray, shape::Primitive};

/// Nearest surface found along a ray.
pub struct Hit<'a> {
    pub t: f32,
    pub primitive: &'a Primitive,
}

/// A set of primitives that can be intersected as a whole. Built once from a
/// finished scene and read-only afterwards, so it is shared freely across
/// worker threads.
pub trait Aggregate: Send + Sync {
    /// Nearest intersection with `t < max_t`, or None.
    fn intersect(&self, ray: &Ray, max_t: f32) -> Option<Hit<'_>>;

    fn bounds(&self) -> Bounds;
}
