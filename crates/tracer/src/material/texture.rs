use crate::{color::Rgb, shape::Uv};

/// A pure function from a surface coordinate to a color.
pub trait Texture: Sync + Send {
    fn color(&self, uv: Uv) -> Rgb;
}

pub struct Uniform(pub Rgb);

impl Texture for Uniform {
    fn color(&self, _: Uv) -> Rgb {
        self.0
    }
}

/// Alternating grid of two colors, `scale` cells per UV unit.
pub struct Checker {
    pub even: Rgb,
    pub odd: Rgb,
    pub scale: f32,
}

impl Texture for Checker {
    fn color(&self, uv: Uv) -> Rgb {
        let cell = (uv[0] * self.scale).floor() as i64 + (uv[1] * self.scale).floor() as i64;
        if cell.rem_euclid(2) == 0 {
            self.even
        } else {
            self.odd
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn checker_alternates() {
        let t = Checker {
            even: WHITE,
            odd: BLACK,
            scale: 2.0,
        };
        assert_eq!(t.color([0.1, 0.1]), WHITE);
        assert_eq!(t.color([0.6, 0.1]), BLACK);
        assert_eq!(t.color([0.6, 0.6]), WHITE);
    }
}
