use std::fmt::Display;

/// Single-line progress bar, rendered with `print!("\r{bar}")`.
pub struct PercentBar {
    pub percent: f32,
    pub width: usize,
}

impl Display for PercentBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let percent = self.percent.clamp(0.0, 1.0);
        let filled = ((self.width - 1) as f32 * percent).round() as usize;
        write!(
            f,
            "[{empty:=>left$}>{empty:.<right$}] {:.1}%",
            100.0 * percent,
            empty = "",
            left = filled,
            right = self.width - 1 - filled,
        )
    }
}
