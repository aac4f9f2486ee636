use std::sync::{
    atomic::{AtomicU8, Ordering},
    mpsc, Arc,
};

use derive_more::Display;
use glam::Vec3;
use log::{debug, info};
use rand::{distributions::Uniform, prelude::Distribution};
use rayon::prelude::*;

use crate::{
    aggregate::{Aggregate, Hit, KdTree},
    camera::Camera,
    color::Rgb,
    environment::Environment,
    film::Film,
    integrator::Integrator,
    math::{
        distributions::{UniformCone, UniformSphere},
        point::Point,
        transform::Frame,
    },
    ray::Ray,
    shape::Primitive,
    stats::Stats,
    tiler::{Tile, Tiler},
    Rng, Seed,
};

/// Everything a ray can interact with: the spatial index over all
/// primitives, the subset that emits (kept aside for next-event estimation)
/// and the radiance at infinity.
pub struct World {
    pub objects: Box<dyn Aggregate>,
    pub lights: Vec<Arc<Primitive>>,
    pub environment: Box<dyn Environment>,
}

/// A direction towards one light, with the solid-angle density of drawing it
/// (light selection folded in).
pub struct LightSample<'a> {
    pub light: &'a Primitive,
    pub direction: Vec3,
    pub pdf: f32,
}

impl World {
    pub fn new(primitives: Vec<Arc<Primitive>>, environment: Box<dyn Environment>) -> Self {
        let lights: Vec<_> = primitives.iter().filter(|p| p.is_light()).cloned().collect();
        debug!(
            "world: {} primitives, {} lights",
            primitives.len(),
            lights.len()
        );
        Self {
            objects: Box::new(KdTree::build(primitives)),
            lights,
            environment,
        }
    }

    pub fn with_aggregate(
        objects: Box<dyn Aggregate>,
        lights: Vec<Arc<Primitive>>,
        environment: Box<dyn Environment>,
    ) -> Self {
        Self {
            objects,
            lights,
            environment,
        }
    }

    pub fn intersect(&self, ray: &Ray, max_t: f32) -> Option<Hit<'_>> {
        self.objects.intersect(ray, max_t)
    }

    /// Draw a direction from `from` towards a uniformly chosen light,
    /// sampling the solid-angle cone of its bounding sphere. Directions that
    /// miss the actual surface inside the cone simply contribute nothing.
    pub fn sample_light(&self, from: Point, rng: &mut Rng) -> Option<LightSample<'_>> {
        if self.lights.is_empty() {
            return None;
        }
        let n = self.lights.len() as f32;
        let light = &*self.lights[Uniform::new(0, self.lights.len()).sample(rng)];

        let bounds = light.bounds();
        let axis = bounds.center() - from;
        let dist2 = axis.length_squared();
        let radius = bounds.radius();

        if dist2 <= radius * radius {
            // Inside the bounding sphere, the light covers all directions
            return Some(LightSample {
                light,
                direction: UniformSphere.sample(rng),
                pdf: UniformSphere::pdf() / n,
            });
        }

        let cos_max = (1.0 - radius * radius / dist2).max(0.0).sqrt();
        let cone = UniformCone { cos_max };
        let pdf = cone.pdf() / n;
        if pdf <= 0.0 {
            return None;
        }
        let frame = Frame::new(axis / dist2.sqrt());
        Some(LightSample {
            light,
            direction: frame.from_local(cone.sample(rng)),
            pdf,
        })
    }

    /// Density with which [`Self::sample_light`] would have produced
    /// `direction` towards this light; zero outside its cone. This is the
    /// counter-density the multiple-importance weight needs when a scattered
    /// ray happens to hit a light.
    pub fn light_pdf(&self, from: Point, light: &Primitive, direction: Vec3) -> f32 {
        if self.lights.is_empty() {
            return 0.0;
        }
        let n = self.lights.len() as f32;
        let bounds = light.bounds();
        let axis = bounds.center() - from;
        let dist2 = axis.length_squared();
        let radius = bounds.radius();

        if dist2 <= radius * radius {
            return UniformSphere::pdf() / n;
        }
        let cos_max = (1.0 - radius * radius / dist2).max(0.0).sqrt();
        if direction.dot(axis / dist2.sqrt()) < cos_max {
            return 0.0;
        }
        UniformCone { cos_max }.pdf() / n
    }

    pub fn escape(&self, direction: Vec3) -> Rgb {
        self.environment.at(direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u8)]
pub enum RenderState {
    #[display("idle")]
    Idle = 0,
    #[display("running")]
    Running = 1,
    #[display("stopping")]
    Stopping = 2,
    #[display("stopped")]
    Stopped = 3,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Base samples per pixel per pass, before the adaptive multiplier.
    pub samples_per_pass: u32,
    pub passes: u32,
    pub tile_size: u32,
    pub seed: u64,
    /// Adaptive sharpening exponent; 0 disables adaptivity.
    pub adapt: f32,
    /// Upper bound on the per-pixel budget multiplier.
    pub adapt_cap: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            samples_per_pass: 16,
            passes: 4,
            tile_size: 32,
            seed: 0,
            adapt: 0.5,
            adapt_cap: 8.0,
        }
    }
}

/// Backpressure on the merge queue: workers stall rather than pile up
/// unmerged fragments.
const PENDING_FRAGMENTS: usize = 64;

/// Orchestrates a render session: tiles go wide on the rayon pool, finished
/// fragments funnel through one bounded channel into the session film, and a
/// snapshot of the merged film is handed out after every pass.
pub struct Renderer {
    pub world: World,
    pub camera: Camera,
    pub integrator: Box<dyn Integrator>,
    pub config: RenderConfig,
    pub stats: Stats,
    state: AtomicU8,
}

impl Renderer {
    pub fn new(
        world: World,
        camera: Camera,
        integrator: Box<dyn Integrator>,
        config: RenderConfig,
    ) -> Self {
        Self {
            world,
            camera,
            integrator,
            config,
            stats: Stats::default(),
            state: AtomicU8::new(RenderState::Idle as u8),
        }
    }

    pub fn state(&self) -> RenderState {
        match self.state.load(Ordering::Acquire) {
            0 => RenderState::Idle,
            1 => RenderState::Running,
            2 => RenderState::Stopping,
            _ => RenderState::Stopped,
        }
    }

    fn set_state(&self, state: RenderState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Ask the session to wind down. Workers check between tiles, so at most
    /// the in-flight tiles finish; everything already merged is kept.
    pub fn stop(&self) {
        if self.state() == RenderState::Running {
            self.set_state(RenderState::Stopping);
        }
    }

    /// Render all passes, calling `on_snapshot` with the merged film after
    /// each one. Returns the final film.
    pub fn run(&self, mut on_snapshot: impl FnMut(&Film)) -> Film {
        // A stop requested before the session starts is honored as an
        // immediate wind-down.
        if self.state() != RenderState::Stopping {
            self.set_state(RenderState::Running);
        }
        self.stats.reset();

        let config = &self.config;
        let mut film = Film::new(config.width, config.height);
        let tiles = Tiler::new(config.width, config.height, config.tile_size).tiles();

        for pass in 0..config.passes {
            if self.state() == RenderState::Stopping {
                break;
            }
            let budgets = film.budgets(config.adapt, config.adapt_cap);

            let (tx, rx) = mpsc::sync_channel::<(Tile, Film)>(PENDING_FRAGMENTS);
            rayon::in_place_scope(|scope| {
                scope.spawn(|_| {
                    tiles.par_iter().for_each_with(tx, |tx, tile| {
                        if self.state() == RenderState::Stopping {
                            return;
                        }
                        let fragment = self.render_tile(tile, pass, &budgets);
                        // The receiver outlives all senders; a send can only
                        // fail if the whole scope is unwinding.
                        let _ = tx.send((*tile, fragment));
                    });
                });

                for (tile, fragment) in rx.iter() {
                    film.merge_fragment(tile.x, tile.y, &fragment);
                }
            });

            info!(
                "pass {}/{} merged, {} samples so far",
                pass + 1,
                config.passes,
                film.sample_count()
            );
            on_snapshot(&film);
        }

        self.stats.report();
        self.set_state(RenderState::Stopped);
        film
    }

    fn render_tile(&self, tile: &Tile, pass: u32, budgets: &[f32]) -> Film {
        let config = &self.config;
        let mut fragment = Film::new(tile.width, tile.height);
        let jitter = Uniform::new(0.0f32, 1.0);

        for (x, y) in tile.pixels() {
            let budget = budgets[(y * config.width + x) as usize];
            let samples = (config.samples_per_pass as f32 * budget).round() as u32;

            // One deterministic stream per (seed, x, y, pass)
            let mut rng: Rng = Seed {
                seed: config.seed,
                x,
                y,
                pass,
            }
            .into_rng();

            for _ in 0..samples {
                let s = (x as f32 + jitter.sample(&mut rng)) / config.width as f32;
                let t = (y as f32 + jitter.sample(&mut rng)) / config.height as f32;
                let ray = self.camera.ray(s, t, &mut rng);
                let energy = self.integrator.li(&self.world, ray, &mut rng, &self.stats);
                fragment.add_sample(x - tile.x, y - tile.y, energy);
            }
            self.stats.add_samples(samples as u64);
        }
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregate::ShapeList,
        environment::{Flat, Gradient},
        integrator::PathTracer,
        material::Material,
        math::transform::Transform,
        shape::Sphere,
    };
    use rand::SeedableRng;

    fn test_world() -> World {
        let material = Arc::new(Material::plastic(Rgb::splat(0.6)));
        let sphere = Arc::new(Primitive::Sphere(Sphere::new(
            Transform::translate(Vec3::new(0.0, 0.0, -3.0)),
            material,
        )));
        World::with_aggregate(
            Box::new(ShapeList(vec![sphere])),
            Vec::new(),
            Box::new(Gradient {
                ground: Rgb::splat(0.1),
                sky: Rgb::splat(0.7),
            }),
        )
    }

    fn test_renderer(world: World, passes: u32) -> Renderer {
        let camera = Camera::new(
            Point::ORIGIN,
            Point::new(0.0, 0.0, -1.0),
            Vec3::Y,
            60.0,
            1.0,
            0.0,
            1.0,
        );
        Renderer::new(
            world,
            camera,
            Box::new(PathTracer::new(4)),
            RenderConfig {
                width: 16,
                height: 16,
                samples_per_pass: 2,
                passes,
                tile_size: 8,
                seed: 99,
                adapt: 0.5,
                adapt_cap: 4.0,
            },
        )
    }

    #[test]
    fn render_is_deterministic_for_a_seed() {
        let a = test_renderer(test_world(), 2).run(|_| {});
        let b = test_renderer(test_world(), 2).run(|_| {});
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(a.pixel(x, y).mean(), b.pixel(x, y).mean());
            }
        }
    }

    #[test]
    fn every_pass_reports_a_snapshot() {
        let renderer = test_renderer(test_world(), 3);
        let mut snapshots = 0;
        let film = renderer.run(|partial| {
            snapshots += 1;
            assert!(partial.sample_count() > 0);
        });
        assert_eq!(snapshots, 3);
        assert_eq!(renderer.state(), RenderState::Stopped);
        assert!(film.sample_count() >= 16 * 16 * 2 * 3);
    }

    #[test]
    fn stop_before_run_completes_immediately() {
        let renderer = test_renderer(test_world(), 100);
        renderer.set_state(RenderState::Running);
        renderer.stop();
        let film = renderer.run(|_| {});
        // The state machine was already winding down; no pass ran.
        assert_eq!(film.sample_count(), 0);
        assert_eq!(renderer.state(), RenderState::Stopped);
    }

    #[test]
    fn light_sampling_points_at_the_light() {
        let light = Arc::new(Primitive::Sphere(Sphere::new(
            Transform::translate(Vec3::new(0.0, 5.0, 0.0)),
            Arc::new(Material::light(Rgb::splat(10.0))),
        )));
        let world = World::with_aggregate(
            Box::new(ShapeList(vec![light.clone()])),
            vec![light],
            Box::new(Flat(crate::color::BLACK)),
        );

        let mut rng = Rng::seed_from_u64(5);
        for _ in 0..200 {
            let sample = world.sample_light(Point::ORIGIN, &mut rng).unwrap();
            // Every drawn direction admits the density the sampler reports
            let pdf = world.light_pdf(Point::ORIGIN, sample.light, sample.direction);
            assert!((pdf - sample.pdf).abs() / sample.pdf < 1e-4);
            assert!(sample.direction.y > 0.9);
        }
        // Directions away from the light have zero density
        let light = &*world.lights[0];
        assert_eq!(world.light_pdf(Point::ORIGIN, light, Vec3::NEG_Y), 0.0);
    }

    #[test]
    fn no_lights_means_no_light_samples() {
        let world = test_world();
        let mut rng = Rng::seed_from_u64(1);
        assert!(world.sample_light(Point::ORIGIN, &mut rng).is_none());
    }

    #[test]
    fn state_displays_lowercase() {
        assert_eq!(RenderState::Running.to_string(), "running");
        assert_eq!(RenderState::Stopped.to_string(), "stopped");
    }
}
