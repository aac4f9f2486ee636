use std::path::Path;

use anyhow::{Context, Result};
use image::Rgb32FImage;
use tracer::color::Rgb;

/// Write a linear-light buffer as an 8-bit sRGB PNG.
pub fn save_png(image: &Rgb32FImage, path: &Path) -> Result<()> {
    let mut out = image::RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        out.put_pixel(x, y, image::Rgb(Rgb(pixel.0).to_srgb().to_byte_array()));
    }
    out.save(path)
        .with_context(|| format!("writing {}", path.display()))
}
