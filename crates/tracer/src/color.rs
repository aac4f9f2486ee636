use bytemuck::{Pod, Zeroable};

/// A linear-light RGB energy triple. No alpha; components are expected to be
/// non-negative but are not clamped, radiometric arithmetic runs on raw
/// values and display mapping happens only at export.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgb(pub [f32; 3]);

pub const BLACK: Rgb = Rgb([0.0, 0.0, 0.0]);
pub const WHITE: Rgb = Rgb([1.0, 1.0, 1.0]);

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    pub const fn splat(v: f32) -> Self {
        Self([v, v, v])
    }

    pub fn max_component(self) -> f32 {
        self.0[0].max(self.0[1]).max(self.0[2])
    }

    /// Rec. 709 luminance.
    pub fn luminance(self) -> f32 {
        0.2126 * self.0[0] + 0.7152 * self.0[1] + 0.0722 * self.0[2]
    }

    pub fn is_black(self) -> bool {
        self.max_component() <= 0.0
    }

    pub fn lerp(self, rhs: Rgb, t: f32) -> Rgb {
        self * (1.0 - t) + rhs * t
    }

    pub fn map(self, f: impl Fn(f32) -> f32) -> Rgb {
        Rgb(self.0.map(f))
    }

    /// Linear to sRGB transfer, for 8-bit export.
    pub fn to_srgb(self) -> Rgb {
        self.map(|c| {
            let c = c.clamp(0.0, 1.0);
            if c <= 0.003_130_8 {
                12.92 * c
            } else {
                1.055 * c.powf(1.0 / 2.4) - 0.055
            }
        })
    }

    pub fn to_byte_array(self) -> [u8; 3] {
        self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8)
    }
}

impl std::ops::Add for Rgb {
    type Output = Rgb;

    fn add(self, rhs: Rgb) -> Rgb {
        Rgb([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
        ])
    }
}

impl std::ops::AddAssign for Rgb {
    fn add_assign(&mut self, rhs: Rgb) {
        *self = *self + rhs;
    }
}

/// Component-wise product; models one signal filtering another.
impl std::ops::Mul for Rgb {
    type Output = Rgb;

    fn mul(self, rhs: Rgb) -> Rgb {
        Rgb([
            self.0[0] * rhs.0[0],
            self.0[1] * rhs.0[1],
            self.0[2] * rhs.0[2],
        ])
    }
}

impl std::ops::MulAssign for Rgb {
    fn mul_assign(&mut self, rhs: Rgb) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<f32> for Rgb {
    type Output = Rgb;

    fn mul(self, rhs: f32) -> Rgb {
        Rgb(self.0.map(|c| c * rhs))
    }
}

impl std::ops::Mul<Rgb> for f32 {
    type Output = Rgb;

    fn mul(self, rhs: Rgb) -> Rgb {
        rhs * self
    }
}

impl std::ops::Div<f32> for Rgb {
    type Output = Rgb;

    fn div(self, rhs: f32) -> Rgb {
        Rgb(self.0.map(|c| c / rhs))
    }
}

impl From<Rgb> for image::Rgb<f32> {
    fn from(val: Rgb) -> Self {
        image::Rgb(val.0)
    }
}
