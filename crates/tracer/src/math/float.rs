/// Offset applied to every secondary ray origin and to the near plane of slab
/// tests, so a bounce never reintersects the surface it just left.
pub const BIAS: f32 = 1e-4;

pub trait FloatAsExt {
    /// Returns `Some(f)` if f is far enough from zero (given by eps).
    ///
    /// Returns None for NaN and Some(f) for +/- infty
    fn into_non_zero(self, eps: Self) -> Option<f32>;

    /// Returns `Some(f)` if f is finite.
    ///
    /// Returns None for NaN and +/- infty
    fn into_finite(self) -> Option<f32>;
}

impl FloatAsExt for f32 {
    fn into_non_zero(self, eps: Self) -> Option<f32> {
        (self.abs() > eps).then_some(self)
    }

    fn into_finite(self) -> Option<f32> {
        self.is_finite().then_some(self)
    }
}
