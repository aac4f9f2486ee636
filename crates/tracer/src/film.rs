use anyhow::{ensure, Result};
use image::Rgb32FImage;

use crate::{
    color::Rgb,
    math::stat::{RgbSeries, ScalarSeries},
};

/// Number of big-endian f64 values per pixel on the wire: r, g, b sums and
/// the sample count.
const WIRE_STRIDE: usize = 4;

/// Per-pixel sample accumulator grid.
///
/// Every worker renders into its own tile-sized film; fragments are merged
/// into the session film element-wise, so the result is independent of merge
/// order. All statistics run in f64.
#[derive(Debug, Clone, Default)]
pub struct Film {
    width: u32,
    height: u32,
    pixels: Vec<RgbSeries>,
}

impl Film {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![RgbSeries::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y * self.width + x) as usize
    }

    pub fn add_sample(&mut self, x: u32, y: u32, color: Rgb) {
        let i = self.index(x, y);
        self.pixels[i].add_sample(color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> &RgbSeries {
        &self.pixels[self.index(x, y)]
    }

    /// Element-wise merge of a same-sized film.
    pub fn merge(&mut self, rhs: &Film) {
        assert_eq!((self.width, self.height), (rhs.width, rhs.height));
        for (a, b) in self.pixels.iter_mut().zip(&rhs.pixels) {
            a.merge(b);
        }
    }

    /// Merge a smaller film at offset `(x0, y0)`; the fragment must fit.
    pub fn merge_fragment(&mut self, x0: u32, y0: u32, fragment: &Film) {
        assert!(x0 + fragment.width <= self.width && y0 + fragment.height <= self.height);
        for fy in 0..fragment.height {
            for fx in 0..fragment.width {
                let i = self.index(x0 + fx, y0 + fy);
                self.pixels[i].merge(fragment.pixel(fx, fy));
            }
        }
    }

    pub fn sample_count(&self) -> u64 {
        self.pixels.iter().map(|p| p.count()).sum()
    }

    /// Noise estimate of one pixel: the mean per-channel sample variance.
    pub fn noise(&self, x: u32, y: u32) -> f64 {
        self.pixel(x, y).variance()
    }

    pub fn mean_noise(&self) -> f64 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        self.pixels.iter().map(|p| p.variance()).sum::<f64>() / self.pixels.len() as f64
    }

    /// Per-pixel sample budget multipliers for the next pass:
    /// `(noise / mean_noise)^adapt`, clamped to `[1, cap]`. A flat or empty
    /// film yields all ones, so adaptivity never starves a pixel.
    pub fn budgets(&self, adapt: f32, cap: f32) -> Vec<f32> {
        let mean = self.mean_noise();
        if mean <= 0.0 || adapt <= 0.0 {
            return vec![1.0; self.pixels.len()];
        }
        self.pixels
            .iter()
            .map(|p| ((p.variance() / mean) as f32).powf(adapt).clamp(1.0, cap))
            .collect()
    }

    /// The rendered image: per-pixel means scaled by the exposure factor.
    pub fn image(&self, exposure: f32) -> Rgb32FImage {
        self.map_to_image(|p| p.mean() * exposure)
    }

    /// Grayscale sample-count map, normalized to the busiest pixel.
    pub fn heatmap(&self) -> Rgb32FImage {
        let max = self.pixels.iter().map(|p| p.count()).max().unwrap_or(0);
        if max == 0 {
            return Rgb32FImage::new(self.width, self.height);
        }
        self.map_to_image(|p| Rgb::splat(p.count() as f32 / max as f32))
    }

    /// Grayscale noise map, normalized to the noisiest pixel.
    pub fn noisemap(&self) -> Rgb32FImage {
        let max = self
            .pixels
            .iter()
            .map(|p| p.variance())
            .fold(0.0f64, f64::max);
        if max <= 0.0 {
            return Rgb32FImage::new(self.width, self.height);
        }
        self.map_to_image(|p| Rgb::splat((p.variance() / max) as f32))
    }

    fn map_to_image(&self, f: impl Fn(&RgbSeries) -> Rgb) -> Rgb32FImage {
        let mut image = Rgb32FImage::new(self.width, self.height);
        for (i, pixel) in self.pixels.iter().enumerate() {
            let x = i as u32 % self.width;
            let y = i as u32 / self.width;
            image.put_pixel(x, y, f(pixel).into());
        }
        image
    }

    /// Flat big-endian f64 encoding, row-major, one `(r, g, b, count)` record
    /// per pixel. Sums cross the wire, squared sums do not, so a decoded film
    /// carries the image but not the noise estimate.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * WIRE_STRIDE * 8);
        for p in &self.pixels {
            for v in [p.r.sum(), p.g.sum(), p.b.sum(), p.count() as f64] {
                out.extend_from_slice(&v.to_be_bytes());
            }
        }
        out
    }

    pub fn decode(width: u32, height: u32, bytes: &[u8]) -> Result<Film> {
        let expected = (width * height) as usize * WIRE_STRIDE * 8;
        ensure!(
            bytes.len() == expected,
            "film payload is {} bytes, expected {expected} for {width}x{height}",
            bytes.len()
        );
        let mut values = bytes
            .chunks_exact(8)
            .map(|c| f64::from_be_bytes(c.try_into().unwrap()));
        let pixels = (0..width * height)
            .map(|_| {
                let [r, g, b, count]: [f64; 4] = std::array::from_fn(|_| values.next().unwrap());
                let count = count as u64;
                RgbSeries {
                    r: ScalarSeries::from_raw(count, r, 0.0),
                    g: ScalarSeries::from_raw(count, g, 0.0),
                    b: ScalarSeries::from_raw(count, b, 0.0),
                }
            })
            .collect();
        Ok(Film {
            width,
            height,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampled(width: u32, height: u32, seed: u32) -> Film {
        let mut film = Film::new(width, height);
        for y in 0..height {
            for x in 0..width {
                for k in 0..(1 + (x + y + seed) % 3) {
                    film.add_sample(x, y, Rgb::splat((x + y * 10 + k) as f32 * 0.01));
                }
            }
        }
        film
    }

    #[test]
    fn merge_is_commutative() {
        let a = sampled(4, 3, 0);
        let b = sampled(4, 3, 1);
        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(ab.pixel(x, y), ba.pixel(x, y));
            }
        }
    }

    #[test]
    fn merge_is_associative() {
        let a = sampled(2, 2, 0);
        let b = sampled(2, 2, 1);
        let c = sampled(2, 2, 2);

        let mut left = a.clone();
        left.merge(&b);
        left.merge(&c);

        let mut bc = b.clone();
        bc.merge(&c);
        let mut right = a.clone();
        right.merge(&bc);

        assert_eq!(left.pixel(1, 1), right.pixel(1, 1));
    }

    #[test]
    fn fragment_merge_lands_at_the_offset() {
        let mut film = Film::new(8, 8);
        let mut fragment = Film::new(2, 2);
        fragment.add_sample(0, 0, Rgb::splat(1.0));
        fragment.add_sample(1, 1, Rgb::splat(2.0));
        film.merge_fragment(3, 4, &fragment);
        assert_eq!(film.pixel(3, 4).count(), 1);
        assert_eq!(film.pixel(4, 5).mean(), Rgb::splat(2.0));
        assert_eq!(film.pixel(0, 0).count(), 0);
    }

    #[test]
    fn wire_roundtrip_preserves_the_image() {
        let film = sampled(5, 4, 3);
        let bytes = film.encode();
        assert_eq!(bytes.len(), 5 * 4 * 4 * 8);
        let decoded = Film::decode(5, 4, &bytes).unwrap();
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(decoded.pixel(x, y).count(), film.pixel(x, y).count());
                let (a, b) = (decoded.pixel(x, y).mean(), film.pixel(x, y).mean());
                assert!((a.0[0] - b.0[0]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn decode_rejects_short_payloads() {
        assert!(Film::decode(4, 4, &[0u8; 8]).is_err());
    }

    #[test]
    fn budgets_favor_noisy_pixels() {
        let mut film = Film::new(2, 1);
        // Flat pixel vs a noisy one
        for _ in 0..8 {
            film.add_sample(0, 0, Rgb::splat(0.5));
        }
        for i in 0..8 {
            film.add_sample(1, 0, Rgb::splat(if i % 2 == 0 { 0.0 } else { 1.0 }));
        }
        let budgets = film.budgets(1.0, 4.0);
        assert_eq!(budgets[0], 1.0);
        assert!(budgets[1] > 1.0);
        assert!(budgets[1] <= 4.0);
    }

    #[test]
    fn budgets_are_flat_without_noise_contrast() {
        let film = Film::new(3, 3);
        assert!(film.budgets(0.5, 8.0).iter().all(|&b| b == 1.0));
    }

    #[test]
    fn noise_shrinks_with_more_samples() {
        let mut few = Film::new(1, 1);
        let mut many = Film::new(1, 1);
        for i in 0..4 {
            few.add_sample(0, 0, Rgb::splat((i % 2) as f32));
        }
        for i in 0..400 {
            many.add_sample(0, 0, Rgb::splat((i % 2) as f32));
        }
        // Same underlying signal; the variance estimate converges, and the
        // standard error of the mean falls with the count.
        let sem_few = few.noise(0, 0) / 4.0;
        let sem_many = many.noise(0, 0) / 400.0;
        assert!(sem_many < sem_few);
    }
}
