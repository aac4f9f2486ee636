use glam::Vec3;
use image::Rgb32FImage;

use crate::{color::Rgb, math::distributions::sphere_uv_from_direction};

/// Radiance arriving from infinity along a direction. Escaped rays resolve
/// against this instead of a light.
pub trait Environment: Send + Sync {
    fn at(&self, dir: Vec3) -> Rgb;
}

/// Constant radiance in every direction.
pub struct Flat(pub Rgb);

impl Environment for Flat {
    fn at(&self, _: Vec3) -> Rgb {
        self.0
    }
}

/// Vertical blend between a ground and a sky color, the classic test sky.
pub struct Gradient {
    pub ground: Rgb,
    pub sky: Rgb,
}

impl Environment for Gradient {
    fn at(&self, dir: Vec3) -> Rgb {
        let t = 0.5 * (dir.normalize_or_zero().y + 1.0);
        self.ground.lerp(self.sky, t)
    }
}

/// Equirectangular image lookup. Decoding the file into an `Rgb32FImage` is
/// the caller's job; lookups here never touch the filesystem.
pub struct Panorama {
    image: Rgb32FImage,
}

impl Panorama {
    pub fn new(image: Rgb32FImage) -> Self {
        Self { image }
    }
}

impl Environment for Panorama {
    fn at(&self, dir: Vec3) -> Rgb {
        let [u, v] = sphere_uv_from_direction(dir.normalize_or_zero());
        let x = ((u * self.image.width() as f32) as u32).min(self.image.width() - 1);
        let y = ((v * self.image.height() as f32) as u32).min(self.image.height() - 1);
        let p = self.image.get_pixel(x, y);
        Rgb(p.0)
    }
}
