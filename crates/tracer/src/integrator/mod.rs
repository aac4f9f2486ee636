pub mod pathtracer;

pub use pathtracer::PathTracer;

use crate::{color::Rgb, ray::Ray, renderer::World, stats::Stats, Rng};

/// Estimates the radiance arriving along one primary ray.
pub trait Integrator: Send + Sync {
    fn li(&self, world: &World, ray: Ray, rng: &mut Rng, stats: &Stats) -> Rgb;
}
