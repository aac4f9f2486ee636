use std::f32::consts::{FRAC_1_PI, PI, TAU};

use glam::Vec3;
use rand::{distributions::Uniform, prelude::Distribution, Rng};

/// Uniform point on the unit disk, polar method.
pub struct UniformDisk;

impl Distribution<[f32; 2]> for UniformDisk {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f32; 2] {
        let uniform = Uniform::new(0.0f32, 1.0);
        let phi = TAU * uniform.sample(rng);
        let r = uniform.sample(rng).sqrt();
        let (s, c) = f32::sin_cos(phi);
        [r * c, r * s]
    }
}

/// Cosine-weighted direction on the +Z hemisphere.
///
/// pdf(w) = cos(theta) / pi
pub struct CosineHemisphere;

impl CosineHemisphere {
    pub fn pdf(cos_theta: f32) -> f32 {
        if cos_theta > 0.0 {
            cos_theta * FRAC_1_PI
        } else {
            0.0
        }
    }
}

impl Distribution<Vec3> for CosineHemisphere {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        // Lift a uniform disk sample onto the hemisphere (Malley's method)
        let [x, y] = UniformDisk.sample(rng);
        let z = (1.0 - x * x - y * y).max(0.0).sqrt();
        Vec3::new(x, y, z)
    }
}

/// Uniform direction inside the +Z cone of half-angle `acos(cos_max)`.
///
/// pdf(w) = 1 / (2 pi (1 - cos_max))
pub struct UniformCone {
    pub cos_max: f32,
}

impl UniformCone {
    pub fn pdf(&self) -> f32 {
        let solid_angle = TAU * (1.0 - self.cos_max);
        if solid_angle > 0.0 {
            1.0 / solid_angle
        } else {
            0.0
        }
    }
}

impl Distribution<Vec3> for UniformCone {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let uniform = Uniform::new(0.0f32, 1.0);
        let cos_theta = 1.0 - uniform.sample(rng) * (1.0 - self.cos_max);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = TAU * uniform.sample(rng);
        let (s, c) = f32::sin_cos(phi);
        Vec3::new(sin_theta * c, sin_theta * s, cos_theta)
    }
}

/// Uniform direction on the full unit sphere.
///
/// pdf(w) = 1 / (4 pi)
pub struct UniformSphere;

impl UniformSphere {
    pub fn pdf() -> f32 {
        1.0 / (4.0 * PI)
    }
}

impl Distribution<Vec3> for UniformSphere {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let uniform = Uniform::new(0.0f32, 1.0);
        let z = 1.0 - 2.0 * uniform.sample(rng);
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = TAU * uniform.sample(rng);
        let (s, c) = f32::sin_cos(phi);
        Vec3::new(r * c, r * s, z)
    }
}

/// GGX (Trowbridge-Reitz) microfacet half-vector around +Z.
///
/// pdf(h) = D(h) cos(theta_h)
pub struct GgxHalfVector {
    pub alpha: f32,
}

impl GgxHalfVector {
    /// The GGX normal distribution function D.
    pub fn density(&self, cos_theta: f32) -> f32 {
        if cos_theta <= 0.0 {
            return 0.0;
        }
        let a2 = self.alpha * self.alpha;
        let d = cos_theta * cos_theta * (a2 - 1.0) + 1.0;
        a2 / (PI * d * d)
    }

    pub fn pdf(&self, cos_theta: f32) -> f32 {
        self.density(cos_theta) * cos_theta.max(0.0)
    }
}

impl Distribution<Vec3> for GgxHalfVector {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let uniform = Uniform::new(0.0f32, 1.0);
        let u = uniform.sample(rng);
        let a2 = self.alpha * self.alpha;
        let cos2 = (1.0 - u) / (1.0 + (a2 - 1.0) * u);
        let cos_theta = cos2.sqrt();
        let sin_theta = (1.0 - cos2).max(0.0).sqrt();
        let phi = TAU * uniform.sample(rng);
        let (s, c) = f32::sin_cos(phi);
        Vec3::new(sin_theta * c, sin_theta * s, cos_theta)
    }
}

/// Equirectangular UV of a unit direction; used for sphere shading and
/// panorama lookup.
pub fn sphere_uv_from_direction(dir: Vec3) -> [f32; 2] {
    let u = 0.5 + f32::atan2(dir.x, -dir.z) / TAU;
    let v = f32::acos(dir.y.clamp(-1.0, 1.0)) / PI;
    [u, v]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> crate::Rng {
        crate::Rng::seed_from_u64(0x5eed)
    }

    #[test]
    fn cosine_hemisphere_stays_above_the_plane() {
        let mut rng = rng();
        for _ in 0..1000 {
            let w: Vec3 = CosineHemisphere.sample(&mut rng);
            assert!(w.z >= 0.0);
            assert!((w.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn cone_samples_stay_in_the_cone() {
        let cone = UniformCone { cos_max: 0.9 };
        let mut rng = rng();
        for _ in 0..1000 {
            let w: Vec3 = cone.sample(&mut rng);
            assert!(w.z >= 0.9 - 1e-5);
        }
    }

    #[test]
    fn ggx_integrates_to_roughly_one() {
        // Integral of pdf over the hemisphere, estimated with uniform
        // sampling: mean(pdf * 2 pi / cos-jacobian-free area element).
        let ggx = GgxHalfVector { alpha: 0.5 };
        let mut rng = rng();
        let n = 200_000;
        let mut acc = 0.0f64;
        for _ in 0..n {
            // uniform hemisphere direction
            let u: f32 = Uniform::new(0.0, 1.0).sample(&mut rng);
            let cos_theta = u;
            acc += ggx.pdf(cos_theta) as f64;
        }
        // E[pdf(cos)] over uniform cos in [0,1] equals
        // int_0^1 D(c) c dc = 1 / (2 pi) for a normalized D.
        let mean = acc / n as f64;
        assert!((mean - 1.0 / std::f64::consts::TAU).abs() < 0.01);
    }

    #[test]
    fn sphere_uv_covers_the_poles() {
        assert!((sphere_uv_from_direction(Vec3::Y)[1] - 0.0).abs() < 1e-6);
        assert!((sphere_uv_from_direction(Vec3::NEG_Y)[1] - 1.0).abs() < 1e-6);
    }
}
