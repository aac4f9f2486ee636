use crate::color::Rgb;

/// Running series over samples of one scalar channel: count, sum and sum of
/// squares, enough to recover mean and unbiased variance. Accumulates in f64
/// so hundreds of thousands of samples lose nothing.
///
/// `merge` is element-wise and therefore commutative and associative, which
/// is what lets worker-local accumulators be combined in any order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScalarSeries {
    count: u64,
    sum: f64,
    sqsum: f64,
}

impl ScalarSeries {
    pub fn add_sample(&mut self, sample: f64) {
        self.count += 1;
        self.sum += sample;
        self.sqsum += sample * sample;
    }

    pub fn merge(&mut self, rhs: &Self) {
        self.count += rhs.count;
        self.sum += rhs.sum;
        self.sqsum += rhs.sqsum;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn sqsum(&self) -> f64 {
        self.sqsum
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Unbiased sample variance. Zero until two samples exist.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        ((self.sqsum - self.sum * self.sum / n) / (n - 1.0)).max(0.0)
    }

    /// Rebuild a series from raw accumulator fields (wire decoding).
    pub fn from_raw(count: u64, sum: f64, sqsum: f64) -> Self {
        Self { count, sum, sqsum }
    }
}

/// Per-channel running series of an RGB signal.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RgbSeries {
    pub r: ScalarSeries,
    pub g: ScalarSeries,
    pub b: ScalarSeries,
}

impl RgbSeries {
    pub fn add_sample(&mut self, rgb: Rgb) {
        self.r.add_sample(rgb.0[0] as f64);
        self.g.add_sample(rgb.0[1] as f64);
        self.b.add_sample(rgb.0[2] as f64);
    }

    pub fn merge(&mut self, rhs: &Self) {
        self.r.merge(&rhs.r);
        self.g.merge(&rhs.g);
        self.b.merge(&rhs.b);
    }

    pub fn count(&self) -> u64 {
        self.r.count()
    }

    pub fn mean(&self) -> Rgb {
        Rgb::new(
            self.r.mean() as f32,
            self.g.mean() as f32,
            self.b.mean() as f32,
        )
    }

    /// Scalar noise estimate: mean of the per-channel sample variances.
    pub fn variance(&self) -> f64 {
        (self.r.variance() + self.g.variance() + self.b.variance()) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance() {
        let mut s = ScalarSeries::default();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            s.add_sample(v);
        }
        assert!((s.mean() - 5.0).abs() < 1e-9);
        // Unbiased variance of this classic set is 32/7
        assert!((s.variance() - 32.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn merge_equals_sequential_accumulation() {
        let samples = [0.5, 1.5, -2.0, 3.25, 0.0, 9.0];
        let mut whole = ScalarSeries::default();
        for v in samples {
            whole.add_sample(v);
        }

        let mut left = ScalarSeries::default();
        let mut right = ScalarSeries::default();
        for v in &samples[..3] {
            left.add_sample(*v);
        }
        for v in &samples[3..] {
            right.add_sample(*v);
        }
        left.merge(&right);
        assert_eq!(left, whole);
    }

    #[test]
    fn variance_needs_two_samples() {
        let mut s = ScalarSeries::default();
        assert_eq!(s.variance(), 0.0);
        s.add_sample(3.0);
        assert_eq!(s.variance(), 0.0);
    }
}
