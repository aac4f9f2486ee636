use glam::{Mat4, Vec3};

use crate::{
    math::{distributions::UniformDisk, point::Point, transform::Transform},
    ray::Ray,
    Rng,
};
use rand::prelude::Distribution;

/// Thin-lens perspective camera.
///
/// Primary rays start on the lens disk and converge on the focus plane, so a
/// zero aperture gives a pinhole and anything larger gives depth of field.
pub struct Camera {
    /// Camera space (right-handed, looking down -Z) to world.
    transform: Transform,
    half_width: f32,
    half_height: f32,
    lens_radius: f32,
    focus_distance: f32,
}

impl Camera {
    /// `vfov` is the full vertical field of view in degrees; `aspect` is
    /// width over height.
    pub fn new(
        from: Point,
        to: Point,
        up: Vec3,
        vfov: f32,
        aspect: f32,
        aperture: f32,
        focus_distance: f32,
    ) -> Self {
        let half_height = (vfov.to_radians() / 2.0).tan();
        let transform =
            Transform::from_matrix(Mat4::look_at_rh(from.vec(), to.vec(), up)).inverse();
        Self {
            transform,
            half_width: aspect * half_height,
            half_height,
            lens_radius: aperture / 2.0,
            focus_distance,
        }
    }

    /// Primary ray through the screen coordinate `(s, t)`, both in `[0, 1]`
    /// with `(0, 0)` the top-left corner. Sub-pixel jitter is the caller's
    /// responsibility; the lens position is drawn here.
    pub fn ray(&self, s: f32, t: f32, rng: &mut Rng) -> Ray {
        let lens = if self.lens_radius > 0.0 {
            let [x, y] = UniformDisk.sample(rng);
            Vec3::new(x, y, 0.0) * self.lens_radius
        } else {
            Vec3::ZERO
        };

        // Target on the focus plane, camera space
        let target = Vec3::new(
            (2.0 * s - 1.0) * self.half_width,
            (1.0 - 2.0 * t) * self.half_height,
            -1.0,
        ) * self.focus_distance;

        let origin = self.transform.point(Point(lens));
        let direction = self.transform.vector(target - lens);
        Ray::new(origin, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Rng {
        Rng::seed_from_u64(11)
    }

    fn pinhole(from: Point, to: Point) -> Camera {
        Camera::new(from, to, Vec3::Y, 60.0, 1.0, 0.0, 1.0)
    }

    #[test]
    fn center_ray_points_at_the_target() {
        let from = Point::new(0.0, 1.0, 5.0);
        let to = Point::new(0.0, 0.0, 0.0);
        let camera = pinhole(from, to);
        let ray = camera.ray(0.5, 0.5, &mut rng());
        assert!((ray.origin - from).length() < 1e-5);
        assert!(ray.direction.dot((to - from).normalize()) > 0.9999);
    }

    #[test]
    fn screen_y_grows_downwards() {
        let camera = pinhole(Point::ORIGIN, Point::new(0.0, 0.0, -1.0));
        let top = camera.ray(0.5, 0.0, &mut rng());
        let bottom = camera.ray(0.5, 1.0, &mut rng());
        assert!(top.direction.y > 0.0);
        assert!(bottom.direction.y < 0.0);
    }

    #[test]
    fn vertical_fov_spans_the_requested_angle() {
        let camera = pinhole(Point::ORIGIN, Point::new(0.0, 0.0, -1.0));
        let top = camera.ray(0.5, 0.0, &mut rng());
        let bottom = camera.ray(0.5, 1.0, &mut rng());
        let angle = top.direction.dot(bottom.direction).acos().to_degrees();
        assert!((angle - 60.0).abs() < 0.1);
    }

    #[test]
    fn lens_rays_converge_on_the_focus_plane() {
        let from = Point::ORIGIN;
        let to = Point::new(0.0, 0.0, -1.0);
        let camera = Camera::new(from, to, Vec3::Y, 60.0, 1.0, 0.4, 3.0);
        let mut rng = rng();
        // All lens samples of the same screen point cross at focus distance
        let reference = camera.ray(0.3, 0.7, &mut rng);
        let t_ref = -3.0 / reference.direction.z;
        let focus = reference.at(t_ref);
        for _ in 0..20 {
            let ray = camera.ray(0.3, 0.7, &mut rng);
            let t = -3.0 / ray.direction.z;
            assert!((ray.at(t) - focus).length() < 1e-3);
        }
    }
}
