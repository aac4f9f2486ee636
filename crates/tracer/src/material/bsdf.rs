use std::f32::consts::FRAC_1_PI;

use glam::Vec3;
use rand::{distributions::Uniform, prelude::Distribution};

use crate::{
    color::{Rgb, BLACK, WHITE},
    math::{
        distributions::{CosineHemisphere, GgxHalfVector},
        vec::RefrReflVecExt,
    },
    Rng,
};

/// Schlick's approximation of the Fresnel reflectance at `cos` incidence.
pub fn schlick(cos: f32, f0: f32) -> f32 {
    f0 + (1.0 - f0) * (1.0 - cos).clamp(0.0, 1.0).powi(5)
}

fn schlick_rgb(cos: f32, f0: Rgb) -> Rgb {
    let w = (1.0 - cos).clamp(0.0, 1.0).powi(5);
    f0.lerp(WHITE, w)
}

/// Smith G1 masking-shadowing term for GGX.
fn smith_g1(cos: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    2.0 * cos / (cos + (a2 + (1.0 - a2) * cos * cos).sqrt())
}

/// One scattering lobe at a surface point, expressed in the local shading
/// frame (+Z is the shading normal, `wo` and `wi` point away from the
/// surface).
///
/// A material resolves to exactly one lobe per bounce via a weighted
/// stochastic branch; the inverse selection probability is folded into the
/// lobe's `weight` so the estimator stays unbiased.
pub enum Bsdf {
    /// Cosine-weighted diffuse reflection.
    Lambert { albedo: Rgb, weight: f32 },
    /// GGX microfacet reflection with Schlick Fresnel and Smith shadowing.
    Microfacet { f0: Rgb, alpha: f32, weight: f32 },
    /// Perfect refraction/reflection through a smooth dielectric boundary.
    /// `eta` is the relative index of refraction for the crossing direction.
    Transmit { eta: f32, f0: f32 },
    /// The path is absorbed; nothing scatters.
    Ignore,
}

pub struct BsdfSample {
    /// Sampled incoming direction, local frame.
    pub wi: Vec3,
    pub pdf: f32,
    /// Reflectance value; for delta lobes this is the full tint, with the
    /// implied delta and cosine already cancelled against the pdf.
    pub f: Rgb,
    /// Delta lobe: the direction admits no density, so next-event estimation
    /// must be skipped for this bounce.
    pub specular: bool,
}

impl Bsdf {
    pub fn is_delta(&self) -> bool {
        matches!(self, Bsdf::Transmit { .. } | Bsdf::Ignore)
    }

    pub fn sample(&self, wo: Vec3, rng: &mut Rng) -> Option<BsdfSample> {
        match *self {
            Bsdf::Lambert { .. } => {
                if wo.z <= 0.0 {
                    return None;
                }
                let wi: Vec3 = CosineHemisphere.sample(rng);
                let pdf = CosineHemisphere::pdf(wi.z);
                if pdf <= 0.0 {
                    return None;
                }
                Some(BsdfSample {
                    wi,
                    pdf,
                    f: self.eval(wo, wi),
                    specular: false,
                })
            }
            Bsdf::Microfacet { alpha, .. } => {
                if wo.z <= 0.0 {
                    return None;
                }
                let ggx = GgxHalfVector { alpha };
                let h: Vec3 = ggx.sample(rng);
                let wi = 2.0 * wo.dot(h) * h - wo;
                if wi.z <= 0.0 {
                    return None;
                }
                let pdf = self.pdf(wo, wi);
                if pdf <= 0.0 {
                    return None;
                }
                Some(BsdfSample {
                    wi,
                    pdf,
                    f: self.eval(wo, wi),
                    specular: false,
                })
            }
            Bsdf::Transmit { eta, f0 } => {
                if wo.z <= 0.0 {
                    return None;
                }
                let uniform = Uniform::new(0.0f32, 1.0);
                let reflect = uniform.sample(rng) < schlick(wo.z, f0);
                let wi = if reflect {
                    Vec3::new(-wo.x, -wo.y, wo.z)
                } else {
                    // Snell's law; fall back to total internal reflection
                    // when the discriminant goes negative.
                    (-wo)
                        .refract(Vec3::Z, eta)
                        .unwrap_or(Vec3::new(-wo.x, -wo.y, wo.z))
                };
                Some(BsdfSample {
                    wi,
                    pdf: 1.0,
                    f: WHITE,
                    specular: true,
                })
            }
            Bsdf::Ignore => None,
        }
    }

    /// Reflectance for an arbitrary direction pair; zero for delta lobes.
    /// Used by next-event estimation, which picks `wi` itself.
    pub fn eval(&self, wo: Vec3, wi: Vec3) -> Rgb {
        if wo.z <= 0.0 || wi.z <= 0.0 {
            return BLACK;
        }
        match *self {
            Bsdf::Lambert { albedo, weight } => albedo * (weight * FRAC_1_PI),
            Bsdf::Microfacet { f0, alpha, weight } => {
                let h = (wo + wi).normalize_or_zero();
                if h == Vec3::ZERO {
                    return BLACK;
                }
                let d = GgxHalfVector { alpha }.density(h.z);
                let f = schlick_rgb(wo.dot(h).clamp(0.0, 1.0), f0);
                let g = smith_g1(wo.z, alpha) * smith_g1(wi.z, alpha);
                f * (weight * d * g / (4.0 * wo.z * wi.z))
            }
            Bsdf::Transmit { .. } | Bsdf::Ignore => BLACK,
        }
    }

    /// Density of `sample` producing `wi`; zero for delta lobes.
    pub fn pdf(&self, wo: Vec3, wi: Vec3) -> f32 {
        if wo.z <= 0.0 || wi.z <= 0.0 {
            return 0.0;
        }
        match *self {
            Bsdf::Lambert { .. } => CosineHemisphere::pdf(wi.z),
            Bsdf::Microfacet { alpha, .. } => {
                let h = (wo + wi).normalize_or_zero();
                if h == Vec3::ZERO {
                    return 0.0;
                }
                let denom = 4.0 * wo.dot(h).abs();
                if denom <= 0.0 {
                    return 0.0;
                }
                GgxHalfVector { alpha }.pdf(h.z) / denom
            }
            Bsdf::Transmit { .. } | Bsdf::Ignore => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Rng {
        Rng::seed_from_u64(0xb5df)
    }

    #[test]
    fn lambert_samples_the_upper_hemisphere() {
        let bsdf = Bsdf::Lambert {
            albedo: Rgb::splat(0.5),
            weight: 1.0,
        };
        let wo = Vec3::new(0.2, 0.1, 0.9).normalize();
        let mut rng = rng();
        for _ in 0..500 {
            let s = bsdf.sample(wo, &mut rng).unwrap();
            assert!(s.wi.z > 0.0);
            assert!(s.pdf > 0.0);
            assert!((bsdf.pdf(wo, s.wi) - s.pdf).abs() < 1e-5);
        }
    }

    #[test]
    fn lambert_is_white_furnace_consistent() {
        // E[f cos / pdf] = albedo for the cosine-weighted estimator; here the
        // ratio is exact for every sample.
        let albedo = Rgb::splat(0.73);
        let bsdf = Bsdf::Lambert { albedo, weight: 1.0 };
        let wo = Vec3::Z;
        let mut rng = rng();
        let s = bsdf.sample(wo, &mut rng).unwrap();
        let ratio = s.f * (s.wi.z / s.pdf);
        assert!((ratio.0[0] - albedo.0[0]).abs() < 1e-5);
    }

    #[test]
    fn microfacet_reflects_about_the_half_vector() {
        let bsdf = Bsdf::Microfacet {
            f0: Rgb::splat(0.9),
            alpha: 0.1,
            weight: 1.0,
        };
        let wo = Vec3::new(0.4, 0.0, 0.9).normalize();
        let mut rng = rng();
        let mut found = 0;
        for _ in 0..200 {
            if let Some(s) = bsdf.sample(wo, &mut rng) {
                found += 1;
                assert!(s.wi.z > 0.0);
                // eval and pdf agree with the sampled values
                assert!((bsdf.pdf(wo, s.wi) - s.pdf).abs() / s.pdf < 1e-3);
                assert!(!s.f.is_black());
            }
        }
        assert!(found > 150);
    }

    #[test]
    fn smooth_microfacet_concentrates_around_the_mirror_direction() {
        let bsdf = Bsdf::Microfacet {
            f0: WHITE,
            alpha: 0.02,
            weight: 1.0,
        };
        let wo = Vec3::new(0.5, 0.0, 0.866).normalize();
        let mirror = Vec3::new(-wo.x, -wo.y, wo.z);
        let mut rng = rng();
        for _ in 0..100 {
            if let Some(s) = bsdf.sample(wo, &mut rng) {
                assert!(s.wi.dot(mirror) > 0.99);
            }
        }
    }

    #[test]
    fn transmit_bends_into_the_surface() {
        let bsdf = Bsdf::Transmit {
            eta: 1.0 / 1.5,
            f0: 0.0, // never reflect, always refract
        };
        let wo = Vec3::new(0.3, 0.0, 0.954).normalize();
        let mut rng = rng();
        let s = bsdf.sample(wo, &mut rng).unwrap();
        assert!(s.specular);
        assert!(s.wi.z < 0.0);
        // Snell: sin_t = eta * sin_i
        let sin_i = (1.0 - wo.z * wo.z).sqrt();
        let sin_t = (1.0 - s.wi.z * s.wi.z).sqrt();
        assert!((sin_t - sin_i / 1.5).abs() < 1e-4);
    }

    #[test]
    fn transmit_falls_back_to_internal_reflection() {
        // Dense-to-thin crossing at a grazing angle
        let bsdf = Bsdf::Transmit { eta: 1.5, f0: 0.0 };
        let wo = Vec3::new(0.9, 0.0, 0.436).normalize();
        let mut rng = rng();
        let s = bsdf.sample(wo, &mut rng).unwrap();
        assert!(s.wi.z > 0.0);
        assert!((s.wi.x + wo.x).abs() < 1e-5);
    }

    #[test]
    fn delta_lobes_have_no_density() {
        let bsdf = Bsdf::Transmit { eta: 1.5, f0: 0.04 };
        assert!(bsdf.is_delta());
        assert_eq!(bsdf.pdf(Vec3::Z, Vec3::Z), 0.0);
        assert_eq!(bsdf.eval(Vec3::Z, Vec3::Z), BLACK);
    }
}
