use std::ptr;

use rand::{distributions::Uniform, prelude::Distribution};

use crate::{
    color::{Rgb, BLACK, WHITE},
    math::{float::BIAS, transform::Frame, vec::Vec3SameDirExt},
    ray::Ray,
    renderer::World,
    stats::Stats,
    Rng,
};

use super::Integrator;

/// Unidirectional path tracer with next-event estimation.
///
/// The loop carries two colors: `energy`, the radiance gathered so far, and
/// `signal`, the filter the remaining path applies to anything it still
/// finds. Escaping resolves against the environment; hitting an emitter
/// terminates the path. Direct light is estimated at every non-delta bounce
/// by sampling a light cone, and the same contribution reached through BSDF
/// sampling is combined with the balance heuristic so neither technique
/// double-counts.
pub struct PathTracer {
    pub max_bounces: u32,
    /// Bounce index from which Russian roulette may terminate the path.
    pub rr_depth: u32,
    /// Per-channel ceiling on the returned energy; `INFINITY` disables it.
    pub clamp: f32,
}

impl PathTracer {
    pub fn new(max_bounces: u32) -> Self {
        Self {
            max_bounces,
            rr_depth: 3,
            clamp: f32::INFINITY,
        }
    }

    pub fn with_clamp(mut self, clamp: f32) -> Self {
        self.clamp = clamp;
        self
    }
}

impl Integrator for PathTracer {
    fn li(&self, world: &World, mut ray: Ray, rng: &mut Rng, stats: &Stats) -> Rgb {
        let uniform = Uniform::new(0.0f32, 1.0);
        let mut energy = BLACK;
        let mut signal = WHITE;
        // Absorbance of the medium the ray currently travels through
        let mut in_medium: Option<Rgb> = None;
        // The camera "bounce" and delta lobes admit no density, so light
        // found through them is taken at full weight.
        let mut specular_bounce = true;
        let mut prev_pdf = 0.0f32;

        for bounce in 0..=self.max_bounces {
            stats.add_rays(1);
            let Some(hit) = world.intersect(&ray, f32::INFINITY) else {
                energy += signal * world.escape(ray.direction);
                break;
            };

            if let Some(absorbance) = in_medium {
                // Beer-Lambert over the traversed segment
                signal *= absorbance.map(|a| (-a * hit.t).exp());
            }

            let emission = hit.primitive.emission();
            if !emission.is_black() {
                let weight = if specular_bounce {
                    1.0
                } else {
                    let light_pdf = world.light_pdf(ray.origin, hit.primitive, ray.direction);
                    prev_pdf / (prev_pdf + light_pdf)
                };
                energy += signal * emission * weight;
                break;
            }

            let info = hit.primitive.local_info(&ray, hit.t);
            let material = hit.primitive.material();
            let shading = material.shade(&info, -ray.direction, rng);
            let frame = Frame::new(shading.normal);
            let wo = frame.to_local(-ray.direction);

            // Next-event estimation; delta lobes cannot answer for an
            // externally chosen direction, so they skip it.
            if !shading.bsdf.is_delta() {
                if let Some(light) = world.sample_light(info.pos, rng) {
                    let wi = frame.to_local(light.direction);
                    let f = shading.bsdf.eval(wo, wi);
                    if !f.is_black() {
                        let shadow = Ray::new(info.pos + shading.normal * BIAS, light.direction);
                        stats.add_rays(1);
                        if let Some(first) = world.intersect(&shadow, f32::INFINITY) {
                            if ptr::eq(first.primitive, light.light) {
                                let bsdf_pdf = shading.bsdf.pdf(wo, wi);
                                let weight = light.pdf / (light.pdf + bsdf_pdf);
                                energy += signal
                                    * f
                                    * first.primitive.emission()
                                    * (wi.z.max(0.0) * weight / light.pdf);
                            }
                        }
                    }
                }
            }

            let Some(sample) = shading.bsdf.sample(wo, rng) else {
                // Absorbed
                break;
            };
            signal *= if sample.specular {
                // Delta lobes fold cosine and density into `f`
                sample.f
            } else {
                sample.f * (sample.wi.z.abs() / sample.pdf)
            };
            if signal.is_black() {
                break;
            }
            specular_bounce = sample.specular;
            prev_pdf = sample.pdf;

            let wi = frame.from_local(sample.wi);
            if material.transmission > 0.0 {
                in_medium = (wi.dot(info.normal) < 0.0).then(|| material.absorbance());
            }
            ray = Ray::new(info.pos + info.normal.same_direction(wi) * BIAS, wi);

            if bounce >= self.rr_depth {
                let survival = signal.max_component().min(1.0);
                if survival <= 0.0 || uniform.sample(rng) >= survival {
                    break;
                }
                signal = signal * (1.0 / survival);
            }
        }

        energy.map(|c| c.min(self.clamp))
    }
}
