pub use glam::Vec3;

use super::float::FloatAsExt;

pub trait RefrReflVecExt {
    fn reflect(self, normal: Vec3) -> Vec3;
    /// Refract `self` (incident, pointing toward the surface) through `normal`
    /// with relative index of refraction `eta` = ior_from / ior_to.
    ///
    /// Returns None on total internal reflection.
    fn refract(self, normal: Vec3, eta: f32) -> Option<Vec3>;
}

impl RefrReflVecExt for Vec3 {
    fn reflect(self, normal: Vec3) -> Vec3 {
        self - 2.0 * self.dot(normal) * normal
    }

    fn refract(self, normal: Vec3, eta: f32) -> Option<Vec3> {
        let cos_i = -self.dot(normal);
        let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
        if k < 0.0 {
            None
        } else {
            Some(eta * self + (eta * cos_i - k.sqrt()) * normal)
        }
    }
}

pub trait Vec3SameDirExt {
    /// Returns self flipped, if needed, so that it points in the same general
    /// direction as `other` (`dot > 0`).
    fn same_direction(self, other: Self) -> Self;
}

impl Vec3SameDirExt for Vec3 {
    fn same_direction(self, other: Self) -> Self {
        if self.dot(other) >= 0.0 {
            self
        } else {
            -self
        }
    }
}

pub trait Vec3AsNonZero: Sized {
    fn into_non_zero(self, eps: f32) -> Option<Self>;
}

impl Vec3AsNonZero for Vec3 {
    fn into_non_zero(self, eps: f32) -> Option<Self> {
        self.length_squared()
            .into_non_zero(eps * eps)
            .and(Some(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_mirrors_across_normal() {
        let v = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = v.reflect(Vec3::Y);
        assert!(r.distance(Vec3::new(1.0, 1.0, 0.0).normalize()) < 1e-6);
    }

    #[test]
    fn refract_straight_through_at_normal_incidence() {
        let v = Vec3::NEG_Y;
        let r = v.refract(Vec3::Y, 1.0 / 1.5).unwrap();
        assert!(r.distance(Vec3::NEG_Y) < 1e-6);
    }

    #[test]
    fn refract_reports_total_internal_reflection() {
        // Grazing exit from a dense medium
        let v = Vec3::new(1.0, -0.1, 0.0).normalize();
        assert!(v.refract(Vec3::Y, 1.5).is_none());
    }
}
