use glam::{Mat3, Mat4, Quat, Vec3};

use super::point::Point;

/// A local-to-world transformation stored as an explicit forward/inverse
/// matrix pair, both computed once at construction. Never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    fwd: Mat4,
    inv: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        fwd: Mat4::IDENTITY,
        inv: Mat4::IDENTITY,
    };

    pub fn from_matrix(fwd: Mat4) -> Self {
        Self {
            fwd,
            inv: fwd.inverse(),
        }
    }

    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self::from_matrix(Mat4::from_scale_rotation_translation(
            scale,
            rotation,
            translation,
        ))
    }

    pub fn translate(translation: Vec3) -> Self {
        Self::from_matrix(Mat4::from_translation(translation))
    }

    pub fn scale(scale: Vec3) -> Self {
        Self::from_matrix(Mat4::from_scale(scale))
    }

    /// Composition: apply `rhs` first, then `self`.
    pub fn then(&self, rhs: &Transform) -> Self {
        Self {
            fwd: self.fwd * rhs.fwd,
            inv: rhs.inv * self.inv,
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            fwd: self.inv,
            inv: self.fwd,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        self.fwd
    }

    pub fn point(&self, p: Point) -> Point {
        Point(self.fwd.transform_point3(p.vec()))
    }

    pub fn vector(&self, v: Vec3) -> Vec3 {
        self.fwd.transform_vector3(v)
    }

    /// Normals transform by the inverse transpose so they stay perpendicular
    /// under non-uniform scaling.
    pub fn normal(&self, n: Vec3) -> Vec3 {
        self.inv.transpose().transform_vector3(n).normalize_or_zero()
    }

    pub fn inv_point(&self, p: Point) -> Point {
        Point(self.inv.transform_point3(p.vec()))
    }

    pub fn inv_vector(&self, v: Vec3) -> Vec3 {
        self.inv.transform_vector3(v)
    }

    pub fn approx_eq(&self, other: &Transform, eps: f32) -> bool {
        self.fwd
            .to_cols_array()
            .into_iter()
            .zip(other.fwd.to_cols_array())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

/// An orthonormal frame with `z` aligned on a given unit vector.
///
/// Construction follows "Building an Orthonormal Basis, Revisited" (JCGT,
/// 2017). `n` is expected to be normalized.
pub struct Frame {
    frame: Mat3,
}

impl Frame {
    pub fn new(n: Vec3) -> Self {
        let sign = f32::signum(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        Self {
            frame: Mat3::from_cols(
                Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
                Vec3::new(b, sign + n.y * n.y * a, -n.y),
                n,
            ),
        }
    }

    pub fn to_local(&self, global: Vec3) -> Vec3 {
        self.frame.transpose() * global
    }

    pub fn from_local(&self, local: Vec3) -> Vec3 {
        self.frame * local
    }

    pub fn normal(&self) -> Vec3 {
        self.frame.col(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_inverse_is_identity() {
        let id = Transform::IDENTITY;
        assert!(id.inverse().approx_eq(&id, 1e-6));
    }

    #[test]
    fn double_inverse_roundtrips() {
        let t = Transform::from_trs(
            Vec3::new(1.0, -2.0, 3.0),
            Quat::from_rotation_y(FRAC_PI_2),
            Vec3::new(2.0, 1.0, 0.5),
        );
        assert!(t.inverse().inverse().approx_eq(&t, 1e-5));
    }

    #[test]
    fn inverse_undoes_point_transform() {
        let t = Transform::from_trs(
            Vec3::new(0.5, 4.0, -1.0),
            Quat::from_rotation_x(0.3),
            Vec3::splat(3.0),
        );
        let p = Point::new(1.0, 2.0, 3.0);
        let back = t.inv_point(t.point(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn frame_is_orthonormal() {
        let n = Vec3::new(0.3, -0.8, 0.52).normalize();
        let f = Frame::new(n);
        let v = Vec3::new(0.1, 0.7, -0.3);
        assert!(f.from_local(f.to_local(v)).distance(v) < 1e-5);
        assert!(f.normal().distance(n) < 1e-6);
        assert!(f.to_local(n).distance(Vec3::Z) < 1e-5);
    }
}
