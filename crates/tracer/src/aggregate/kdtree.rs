use std::sync::Arc;

use itertools::Itertools;
use log::debug;

use crate::{math::bounds::Bounds, ray::Ray, shape::Primitive};

use super::{Aggregate, Hit, ShapeList};

/// Stop splitting once a node holds this few primitives.
const LEAF_THRESHOLD: usize = 8;

/// Spatial binary partition over the scene.
///
/// Partitioning is conservative: a primitive lives in every node whose bounds
/// overlap its own, so siblings may share primitives. The tree is built once,
/// top-down, and never mutated, which is what allows lock-free sharing across
/// all worker threads. Degenerate scenes (everything overlapping) degrade to
/// a near-linear scan; that is accepted, not an error.
pub struct KdTree {
    bounds: Bounds,
    root: Node,
}

enum Node {
    Leaf(Vec<Arc<Primitive>>),
    Branch {
        axis: usize,
        wall: f32,
        left: Box<Node>,
        right: Box<Node>,
        left_bounds: Bounds,
        right_bounds: Bounds,
    },
}

impl KdTree {
    pub fn build(primitives: Vec<Arc<Primitive>>) -> Self {
        let bounds = ShapeList(primitives.clone()).bounds();
        // PBRT-style depth limit; deeper never pays off
        let max_depth = 8 + (1.3 * (primitives.len().max(1) as f32).log2()) as u32;
        let root = build_node(bounds, primitives, max_depth);
        let tree = Self { bounds, root };
        debug!(
            "kd-tree built: {} nodes, {} leaves, max depth {}",
            tree.node_count(),
            tree.leaf_count(),
            max_depth
        );
        tree
    }

    fn node_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 1,
                Node::Branch { left, right, .. } => 1 + count(left) + count(right),
            }
        }
        count(&self.root)
    }

    fn leaf_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 1,
                Node::Branch { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }
}

fn build_node(bounds: Bounds, primitives: Vec<Arc<Primitive>>, depth: u32) -> Node {
    let overlapping: Vec<Arc<Primitive>> = primitives
        .into_iter()
        .filter(|p| p.bounds().overlaps(&bounds))
        .collect();

    if depth == 0 || overlapping.len() <= LEAF_THRESHOLD {
        return Node::Leaf(overlapping);
    }

    // Largest-extent axis, wall at the median of all primitive extents along
    // it: cheap and good enough compared to a full SAH sweep.
    let axis = bounds.longest_axis();
    let coords = overlapping
        .iter()
        .flat_map(|p| [p.bounds().min[axis], p.bounds().max[axis]])
        .sorted_by(|a, b| a.total_cmp(b))
        .collect_vec();
    let wall = coords[coords.len() / 2];

    if wall <= bounds.min[axis] || wall >= bounds.max[axis] {
        // All extents piled up on one side; splitting gains nothing
        return Node::Leaf(overlapping);
    }

    let (left_bounds, right_bounds) = bounds.split(axis, wall);
    Node::Branch {
        axis,
        wall,
        left: Box::new(build_node(left_bounds, overlapping.clone(), depth - 1)),
        right: Box::new(build_node(right_bounds, overlapping, depth - 1)),
        left_bounds,
        right_bounds,
    }
}

impl Aggregate for KdTree {
    fn intersect(&self, ray: &Ray, max_t: f32) -> Option<Hit<'_>> {
        self.bounds.check(ray)?;
        let mut best: Option<Hit> = None;
        intersect_node(&self.root, ray, max_t, &mut best);
        best
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }
}

fn intersect_node<'a>(node: &'a Node, ray: &Ray, max_t: f32, best: &mut Option<Hit<'a>>) {
    match node {
        Node::Leaf(primitives) => {
            for primitive in primitives {
                let reach = best.as_ref().map_or(max_t, |h| h.t);
                if let Some(t) = primitive.intersect(ray, reach) {
                    *best = Some(Hit { t, primitive });
                }
            }
        }
        Node::Branch {
            axis,
            wall,
            left,
            right,
            left_bounds,
            right_bounds,
        } => {
            // Visit the child on the ray's side of the wall first; the far
            // child only matters if its box is still reachable before the
            // best hit found so far.
            let (near, near_b, far, far_b) = if ray.direction[*axis] < 0.0 {
                (right, right_bounds, left, left_bounds)
            } else {
                (left, left_bounds, right, right_bounds)
            };

            let t_wall = (wall - ray.origin.axis(*axis)) * ray.d_rcp[*axis];

            if near_b.check(ray).is_some() {
                intersect_node(near, ray, max_t, best);
            }

            let reach = best.as_ref().map_or(max_t, |h| h.t);
            // The far side is unreachable when the ray leaves the scene or
            // finds a hit before ever crossing the wall.
            if t_wall.is_finite() && t_wall > reach {
                return;
            }
            if let Some((t_near, _)) = far_b.check(ray) {
                if t_near < reach {
                    intersect_node(far, ray, max_t, best);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::Rgb,
        material::Material,
        math::{point::Point, transform::Transform},
        shape::{Cube, Sphere, Triangle},
    };
    use glam::Vec3;
    use rand::{distributions::Uniform, prelude::Distribution, SeedableRng};

    fn random_scene(rng: &mut crate::Rng, n: usize) -> Vec<Arc<Primitive>> {
        let material = Arc::new(Material::plastic(Rgb::splat(0.8)));
        let pos = Uniform::new(-10.0f32, 10.0);
        let size = Uniform::new(0.2f32, 3.0);
        (0..n)
            .map(|i| {
                let center = Vec3::new(pos.sample(rng), pos.sample(rng), pos.sample(rng));
                let scale = Vec3::splat(size.sample(rng));
                let transform = Transform::from_trs(center, glam::Quat::IDENTITY, scale);
                let primitive = match i % 3 {
                    0 => Primitive::Sphere(Sphere::new(transform, material.clone())),
                    1 => Primitive::Cube(Cube::new(transform, material.clone())),
                    _ => Primitive::Triangle(Triangle::new(
                        [
                            Point(center),
                            Point(center + Vec3::new(scale.x, 0.0, 0.0)),
                            Point(center + Vec3::new(0.0, scale.y, 0.3)),
                        ],
                        material.clone(),
                    )),
                };
                Arc::new(primitive)
            })
            .collect()
    }

    #[test]
    fn matches_brute_force_on_random_rays() {
        let mut rng = crate::Rng::seed_from_u64(42);
        let primitives = random_scene(&mut rng, 60);
        let tree = KdTree::build(primitives.clone());
        let list = ShapeList(primitives);

        let pos = Uniform::new(-15.0f32, 15.0);
        let dir = Uniform::new(-1.0f32, 1.0);
        let mut checked = 0;
        for _ in 0..10_000 {
            let origin = Point::new(
                pos.sample(&mut rng),
                pos.sample(&mut rng),
                pos.sample(&mut rng),
            );
            let direction = Vec3::new(
                dir.sample(&mut rng),
                dir.sample(&mut rng),
                dir.sample(&mut rng),
            );
            if direction.length_squared() < 1e-6 {
                continue;
            }
            let ray = Ray::new(origin, direction);

            let expected = list.intersect(&ray, f32::INFINITY);
            let got = tree.intersect(&ray, f32::INFINITY);
            match (expected, got) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    assert!(
                        (a.t - b.t).abs() < 1e-3,
                        "distance mismatch: {} vs {}",
                        a.t,
                        b.t
                    );
                    assert!(std::ptr::eq(a.primitive, b.primitive));
                    checked += 1;
                }
                (a, b) => panic!(
                    "hit disagreement: brute-force {:?} vs kd {:?}",
                    a.map(|h| h.t),
                    b.map(|h| h.t)
                ),
            }
        }
        // Make sure the scene was actually exercised
        assert!(checked > 500);
    }

    #[test]
    fn respects_max_distance() {
        let mut rng = crate::Rng::seed_from_u64(7);
        let primitives = random_scene(&mut rng, 30);
        let tree = KdTree::build(primitives.clone());
        let list = ShapeList(primitives);

        let ray = Ray::new(Point::new(0.0, 0.0, 30.0), Vec3::NEG_Z);
        let expected = list.intersect(&ray, 25.0).map(|h| h.t);
        let got = tree.intersect(&ray, 25.0).map(|h| h.t);
        match (expected, got) {
            (None, None) => {}
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-3),
            (a, b) => panic!("max-distance disagreement: {a:?} vs {b:?}"),
        }
    }

    #[test]
    fn empty_scene_never_hits() {
        let tree = KdTree::build(Vec::new());
        let ray = Ray::new(Point::ORIGIN, Vec3::X);
        assert!(tree.intersect(&ray, f32::INFINITY).is_none());
    }
}
