pub mod bsdf;
pub mod texture;

pub use bsdf::{Bsdf, BsdfSample};
pub use texture::{Checker, Texture, Uniform};

use glam::Vec3;
use rand::{distributions::Uniform as UniformDist, prelude::Distribution};

use crate::{
    color::{Rgb, BLACK},
    math::vec::Vec3SameDirExt,
    shape::{LocalInfo, Uv},
    Rng,
};

/// The surface description at one lookup coordinate.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    /// Normal-incidence reflectance (F0).
    pub specularity: f32,
    pub emission: Rgb,
    pub transmission: f32,
}

/// A surface material: a color lookup plus scalar lobes weights.
///
/// A material is a pure function of `(u, v)`; resolving it against an
/// incoming direction and a random draw yields a single [`Bsdf`] lobe for
/// that bounce (a weighted stochastic branch, not a blend, so the estimator
/// stays unbiased).
pub struct Material {
    pub texture: Box<dyn Texture>,
    pub metalness: f32,
    pub roughness: f32,
    pub specularity: f32,
    pub emission: Rgb,
    pub transmission: f32,
    /// Beer-Lambert absorbance per channel, derived once from the color.
    absorbance: Rgb,
}

/// The result of resolving a material at a hit point: the shading normal
/// (flipped to face the outgoing direction) and the lobe to sample.
pub struct Shading {
    pub normal: Vec3,
    pub bsdf: Bsdf,
}

/// `ior = (1 + sqrt(F0)) / (1 - sqrt(F0))`
fn ior_from_f0(f0: f32) -> f32 {
    let s = f0.clamp(0.0, 0.98).sqrt();
    (1.0 + s) / (1.0 - s)
}

/// GGX alpha from perceptual roughness, floored away from the singular
/// mirror case.
fn alpha_from_roughness(roughness: f32) -> f32 {
    (roughness * roughness).max(1e-3)
}

impl Material {
    pub fn new(
        texture: Box<dyn Texture>,
        metalness: f32,
        roughness: f32,
        specularity: f32,
        emission: Rgb,
        transmission: f32,
    ) -> Self {
        // 2 - log10(100 c): white transmits freely, dark tints absorb hard
        let absorbance = texture
            .color([0.0, 0.0])
            .map(|c| 2.0 - f32::log10(c.max(1e-3) * 100.0));
        Self {
            texture,
            metalness,
            roughness,
            specularity,
            emission,
            transmission,
            absorbance,
        }
    }

    /// Matte dielectric with a plastic-like 4% F0.
    pub fn plastic(color: Rgb) -> Self {
        Self::new(Box::new(Uniform(color)), 0.0, 0.5, 0.04, BLACK, 0.0)
    }

    /// Pure diffuse reflector (no specular lobe at all).
    pub fn lambert(color: Rgb) -> Self {
        Self::new(Box::new(Uniform(color)), 0.0, 1.0, 0.0, BLACK, 0.0)
    }

    pub fn metal(color: Rgb, roughness: f32) -> Self {
        Self::new(Box::new(Uniform(color)), 1.0, roughness, 0.9, BLACK, 0.0)
    }

    /// Clear transmissive dielectric; `specularity` 0.04 puts the index of
    /// refraction at roughly 1.5 (glass).
    pub fn glass(color: Rgb) -> Self {
        Self::new(Box::new(Uniform(color)), 0.0, 0.05, 0.04, BLACK, 1.0)
    }

    /// Pure emitter; emissive surfaces terminate paths instead of
    /// scattering.
    pub fn light(emission: Rgb) -> Self {
        Self::new(Box::new(Uniform(BLACK)), 0.0, 1.0, 0.0, emission, 0.0)
    }

    pub fn sample_at(&self, uv: Uv) -> Sample {
        Sample {
            color: self.texture.color(uv),
            metalness: self.metalness,
            roughness: self.roughness,
            specularity: self.specularity,
            emission: self.emission,
            transmission: self.transmission,
        }
    }

    pub fn absorbance(&self) -> Rgb {
        self.absorbance
    }

    /// Resolve the material against an intersection: picks the lobe for this
    /// bounce. `wo` is the outgoing (towards the viewer) world direction.
    pub fn shade(&self, info: &LocalInfo, wo: Vec3, rng: &mut Rng) -> Shading {
        let s = self.sample_at(info.uv);
        let uniform = UniformDist::new(0.0f32, 1.0);
        let exiting = wo.dot(info.normal) < 0.0;
        let normal = info.normal.same_direction(wo);

        if exiting {
            // Leaving the medium through the back face
            let bsdf = if s.transmission > 0.0 {
                Bsdf::Transmit {
                    eta: ior_from_f0(s.specularity),
                    f0: s.specularity,
                }
            } else {
                Bsdf::Ignore
            };
            return Shading { normal, bsdf };
        }

        if uniform.sample(rng) < s.metalness {
            // Conductor: the whole color tints the Fresnel term
            return Shading {
                normal,
                bsdf: Bsdf::Microfacet {
                    f0: s.color,
                    alpha: alpha_from_roughness(s.roughness),
                    weight: 1.0,
                },
            };
        }

        if uniform.sample(rng) < s.transmission {
            return Shading {
                normal,
                bsdf: Bsdf::Transmit {
                    eta: 1.0 / ior_from_f0(s.specularity),
                    f0: s.specularity,
                },
            };
        }

        // Dielectric: an even split between the F0-tinted specular lobe and
        // the diffuse base, each rescaled by its selection probability.
        if s.specularity > 0.0 && uniform.sample(rng) < 0.5 {
            Shading {
                normal,
                bsdf: Bsdf::Microfacet {
                    f0: Rgb::splat(s.specularity),
                    alpha: alpha_from_roughness(s.roughness),
                    weight: 2.0,
                },
            }
        } else {
            let weight = if s.specularity > 0.0 { 2.0 } else { 1.0 };
            Shading {
                normal,
                bsdf: Bsdf::Lambert {
                    albedo: s.color,
                    weight,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point::Point;
    use rand::SeedableRng;

    fn info(normal: Vec3) -> LocalInfo {
        LocalInfo {
            pos: Point::ORIGIN,
            normal,
            uv: [0.0, 0.0],
        }
    }

    #[test]
    fn opaque_back_face_absorbs() {
        let m = Material::plastic(Rgb::splat(0.5));
        let mut rng = Rng::seed_from_u64(1);
        // wo on the inside of the surface
        let shading = m.shade(&info(Vec3::Z), Vec3::NEG_Z, &mut rng);
        assert!(matches!(shading.bsdf, Bsdf::Ignore));
        assert!(shading.normal.z < 0.0);
    }

    #[test]
    fn transmissive_back_face_refracts_out() {
        let m = Material::glass(crate::color::WHITE);
        let mut rng = Rng::seed_from_u64(1);
        let shading = m.shade(&info(Vec3::Z), Vec3::NEG_Z, &mut rng);
        match shading.bsdf {
            Bsdf::Transmit { eta, .. } => assert!(eta > 1.0),
            _ => panic!("expected a transmit lobe"),
        }
    }

    #[test]
    fn metal_always_yields_a_microfacet_lobe() {
        let m = Material::metal(Rgb::new(1.0, 0.8, 0.3), 0.2);
        let mut rng = Rng::seed_from_u64(2);
        for _ in 0..50 {
            let shading = m.shade(&info(Vec3::Z), Vec3::Z, &mut rng);
            assert!(matches!(shading.bsdf, Bsdf::Microfacet { weight, .. } if weight == 1.0));
        }
    }

    #[test]
    fn lambert_material_never_picks_a_specular_branch() {
        let m = Material::lambert(Rgb::splat(0.8));
        let mut rng = Rng::seed_from_u64(3);
        for _ in 0..100 {
            let shading = m.shade(&info(Vec3::Z), Vec3::Z, &mut rng);
            assert!(matches!(
                shading.bsdf,
                Bsdf::Lambert { weight, .. } if weight == 1.0
            ));
        }
    }

    #[test]
    fn absorbance_is_zero_for_white() {
        let m = Material::glass(crate::color::WHITE);
        assert!(m.absorbance().max_component().abs() < 1e-6);
        let tinted = Material::glass(Rgb::splat(0.1));
        assert!(tinted.absorbance().0[0] > 0.9);
    }

    #[test]
    fn ior_from_f0_matches_glass() {
        assert!((super::ior_from_f0(0.04) - 1.5).abs() < 0.03);
    }
}
