// named sky gradients
// stop position 0.0 is the top of the sky, 1.0 the horizon

use super::colour::Rgb;
use super::rng::RandomStream;

#[derive(Debug)]
pub struct SkyGradient {
    pub name: &'static str,
    stops: Stops,
}

#[derive(Debug)]
enum Stops {
    List(&'static [(f32, Rgb)]),
    Pair(Rgb, Rgb),
}

impl SkyGradient {
    /// Colour stops from top (0.0) to horizon (1.0).
    pub fn stops(&self) -> Vec<(f32, Rgb)> {
        match self.stops {
            Stops::List(list) => list.to_vec(),
            Stops::Pair(top, horizon) => vec![(0.0, top), (1.0, horizon)],
        }
    }
}

const fn listed(name: &'static str, stops: &'static [(f32, Rgb)]) -> SkyGradient {
    SkyGradient { name, stops: Stops::List(stops) }
}

// two colour gradients from uigradients.com
const fn two_stop(name: &'static str, top: u32, horizon: u32) -> SkyGradient {
    SkyGradient {
        name,
        stops: Stops::Pair(Rgb::from_hex(top), Rgb::from_hex(horizon)),
    }
}

// similar to Alto's Odyssey
const ALTO: &[(f32, Rgb)] = &[
    (0.0, Rgb::new(0.24, 0.25, 0.36)),
    (0.5, Rgb::new(0.60, 0.42, 0.61)),
    (1.0, Rgb::new(0.94, 0.62, 0.68)),
];

const TWILIGHT_TOWN: &[(f32, Rgb)] = &[
    (0.00, Rgb::new(0.27, 0.25, 0.43)),
    (0.70, Rgb::new(0.75, 0.30, 0.39)),
    (0.85, Rgb::new(0.88, 0.43, 0.34)),
    (0.95, Rgb::new(0.91, 0.67, 0.17)),
    (1.00, Rgb::new(0.94, 0.84, 0.41)),
];

// dark grey to blue
const NIGHT: &[(f32, Rgb)] = &[
    (0.00, Rgb::new(0.10, 0.10, 0.10)),
    (1.00, Rgb::new(0.20, 0.24, 0.38)),
];

const COOL_SKY: &[(f32, Rgb)] = &[
    (0.0, Rgb::from_hex(0x2980b9)),
    (0.5, Rgb::from_hex(0x6dd5fa)),
    (1.0, Rgb::from_hex(0xffffff)),
];

pub const SKY_GRADIENTS: &[SkyGradient] = &[
    listed("alto", ALTO),
    listed("twilight_town", TWILIGHT_TOWN),
    listed("night", NIGHT),
    two_stop("blue_lagoon", 0x191654, 0x43c6ac),
    two_stop("what_lies_beyond", 0x000c40, 0xf0f2f0),
    two_stop("dawn", 0x3b4371, 0xf3904f),
    two_stop("ibiza_sunset", 0xee0979, 0xff6a00),
    two_stop("cosmic_fusion", 0x333399, 0xff00cc),
    two_stop("nepal", 0x2657eb, 0xde6161),
    two_stop("love_couple", 0x3a6186, 0x89253e),
    two_stop("dania", 0x7bc6cc, 0xbe93c5),
    two_stop("jupiter", 0x19547b, 0xffd89b),
    two_stop("dusk", 0x2c3e50, 0xfd746c),
    two_stop("deep_sea_space", 0x2c3e50, 0x4ca1af),
    two_stop("grapefruit_sunset", 0x904e95, 0xe96443),
    two_stop("sunset", 0x0b486b, 0xf56217),
    two_stop("sweet_morning", 0xff5f6d, 0xffc371),
    two_stop("transfile", 0xcb3066, 0x16bffd),
    two_stop("alihossein", 0xf7ff00, 0xdb36a4),
    two_stop("dark_skies", 0x283e51, 0x4b79a1),
    two_stop("shroom_haze", 0x5c258d, 0x4389a2),
    two_stop("electric_violet", 0x4776e6, 0x8e54e9),
    two_stop("kashmir", 0x516395, 0x614385),
    two_stop("crimson_tide", 0x642b73, 0xc6426e),
    two_stop("visions_of_grandeur", 0x000046, 0x1cb5e0),
    two_stop("blue_skies", 0x2f80ed, 0x56ccf2),
    two_stop("frost", 0x000428, 0x004e92),
    listed("cool_sky", COOL_SKY),
];

pub fn sky_gradient(name: &str) -> Option<&'static SkyGradient> {
    SKY_GRADIENTS.iter().find(|g| g.name == name)
}

/// Uniform pick over all gradients, one draw.
pub fn random_sky_gradient(rng: &mut RandomStream) -> &'static SkyGradient {
    &SKY_GRADIENTS[rng.index(SKY_GRADIENTS.len())]
}
