// colour helpers, plain linear transforms on rgb triples

use super::rng::RandomStream;
use crate::error::{GenResult, check_range};

/// sRGB colour, every channel in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    // tree feature colours
    pub const GREEN: Rgb = Rgb::new(0.59, 0.78, 0.51);
    pub const GREEN_YELLOW: Rgb = Rgb::new(0.74, 0.80, 0.60);
    pub const BROWN: Rgb = Rgb::new(0.49, 0.45, 0.44);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(level: f32) -> Self {
        Self::new(level, level, level)
    }

    /// `0xRRGGBB` literal to a colour
    pub const fn from_hex(code: u32) -> Self {
        Self::new(
            ((code >> 16) & 0xff) as f32 / 255.0,
            ((code >> 8) & 0xff) as f32 / 255.0,
            (code & 0xff) as f32 / 255.0,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    pub fn clamped(self) -> Self {
        self.map(|c| c.clamp(0.0, 1.0))
    }

    /// Fails unless every channel is finite and in `[0, 1]`.
    pub fn validate(self, field: &'static str) -> GenResult<()> {
        for channel in self.to_array() {
            check_range(field, channel, 0.0, 1.0)?;
        }
        Ok(())
    }
}

/// Darkens (`amount > 0`, towards black) or lightens (`amount < 0`, towards white).
/// `amount` is a proportion in `[-1, 1]`.
pub fn darken(colour: Rgb, amount: f32) -> Rgb {
    if amount < 0.0 {
        colour.map(|c| c - (1.0 - c) * amount)
    } else {
        colour.map(|c| c - c * amount)
    }
}

/// Applies an optional darken amount, no-op for `None`.
pub fn darken_opt(colour: Rgb, amount: Option<f32>) -> Rgb {
    match amount {
        Some(amount) => darken(colour, amount),
        None => colour,
    }
}

/// Per-channel uniform jitter of total width `amount`, clamped to `[0, 1]`.
/// Three draws, in r, g, b order.
pub fn jitter(colour: Rgb, amount: f32, rng: &mut RandomStream) -> GenResult<Rgb> {
    check_range("colour_jitter", amount, 0.0, 1.0)?;
    let r = colour.r + (rng.uniform() - 0.5) * amount;
    let g = colour.g + (rng.uniform() - 0.5) * amount;
    let b = colour.b + (rng.uniform() - 0.5) * amount;
    Ok(Rgb::new(r, g, b).clamped())
}

/// `n` jittered copies of one colour.
pub fn jitter_many(colour: Rgb, amount: f32, n: usize, rng: &mut RandomStream) -> GenResult<Vec<Rgb>> {
    check_range("colour_jitter", amount, 0.0, 1.0)?;
    (0..n).map(|_| jitter(colour, amount, rng)).collect()
}
