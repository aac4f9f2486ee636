use std::sync::Arc;

use glam::Vec3;

use crate::{
    material::Material,
    math::{bounds::Bounds, float::BIAS, point::Point},
    ray::Ray,
};

use super::{LocalInfo, Uv};

/// Rays closer than this to the triangle plane are treated as parallel.
const DET_EPSILON: f32 = 1e-7;

/// A world-space triangle with per-vertex shading normals and UVs.
pub struct Triangle {
    pub vertices: [Point; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Uv; 3],
    pub bounds: Bounds,
    pub material: Arc<Material>,
}

impl Triangle {
    pub fn new(vertices: [Point; 3], material: Arc<Material>) -> Self {
        let a = vertices[1] - vertices[0];
        let b = vertices[2] - vertices[0];
        let normal = a.cross(b).normalize_or_zero();
        Self {
            bounds: Bounds::from_points(&vertices),
            vertices,
            normals: [normal, normal, normal],
            uvs: [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            material,
        }
    }

    pub fn with_shading(mut self, normals: [Vec3; 3], uvs: [Uv; 3]) -> Self {
        self.normals = normals;
        self.uvs = uvs;
        self
    }

    /// Moller-Trumbore. Returns `(t, u, v)` with `u`/`v` the barycentric
    /// weights of vertices 1 and 2.
    fn barycentric_hit(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        let e1 = self.vertices[1] - self.vertices[0];
        let e2 = self.vertices[2] - self.vertices[0];

        let pvec = ray.direction.cross(e2);
        let det = e1.dot(pvec);
        if det.abs() < DET_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - self.vertices[0];
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(e1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        Some((e2.dot(qvec) * inv_det, u, v))
    }

    pub fn intersect(&self, ray: &Ray, max_t: f32) -> Option<f32> {
        let (t, _, _) = self.barycentric_hit(ray)?;
        (t > BIAS && t < max_t).then_some(t)
    }

    pub fn local_info(&self, ray: &Ray, t: f32) -> LocalInfo {
        let (u, v) = match self.barycentric_hit(ray) {
            Some((_, u, v)) => (u, v),
            None => (0.0, 0.0),
        };
        let w = 1.0 - u - v;
        let normal =
            (w * self.normals[0] + u * self.normals[1] + v * self.normals[2]).normalize_or_zero();
        LocalInfo {
            pos: ray.at(t),
            normal,
            uv: [
                w * self.uvs[0][0] + u * self.uvs[1][0] + v * self.uvs[2][0],
                w * self.uvs[0][1] + u * self.uvs[1][1] + v * self.uvs[2][1],
            ],
        }
    }
}
