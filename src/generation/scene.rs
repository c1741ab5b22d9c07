// Whole night scenes: sky, stars, sun glow, terrain and trees standing on it

use bevy::log::debug;
use bevy::math::Vec2;
use rand_distr::Uniform;

use super::branch::{
    DeadTreeConfig, JoshuaTreeConfig, TreeAppearance, TreeDrawing, generate_dead_tree, generate_tree, random_joshua_tree,
};
use super::colour::Rgb;
use super::palette::{SkyGradient, random_sky_gradient, sky_gradient};
use super::presets::TreePreset;
use super::rng::RandomStream;
use super::terrain::{generate_terrain, height_at};
use crate::config::{
    STAR_COUNT, STAR_COUNT_RATIOS, STAR_MAX_SIZE, STAR_SIZE_RATIOS, SUN_SIZE, TERRAIN_DISPLACEMENT, TERRAIN_ITERATIONS,
    TERRAIN_ROUGHNESS,
};
use crate::error::{GenError, GenResult, check_positive, check_range};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SceneStyle {
    /// Two Joshua trees, one of each type, on a gentle slope.
    #[default]
    JoshuaPair,
    /// A row of short bushy trees along a ridge.
    JoshuaRidge,
    /// One bare tree under a starry sky.
    DeadTree,
    /// Randomly picked Joshua trees spread over the horizon.
    Grove,
}

impl SceneStyle {
    pub const ALL: [SceneStyle; 4] = [
        SceneStyle::JoshuaPair,
        SceneStyle::JoshuaRidge,
        SceneStyle::DeadTree,
        SceneStyle::Grove,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SceneStyle::JoshuaPair => "Joshua pair",
            SceneStyle::JoshuaRidge => "Joshua ridge",
            SceneStyle::DeadTree => "Dead tree",
            SceneStyle::Grove => "Grove",
        }
    }

    /// Default parameters for this style on a `width × height` canvas.
    pub fn params(self, width: f32, height: f32) -> SceneParams {
        let flat = |h: f32, roughness: f32, displacement: f32| TerrainParams {
            start_height: h,
            end_height: h,
            roughness,
            displacement: Some(displacement),
            iterations: TERRAIN_ITERATIONS,
        };
        let base = SceneParams {
            style: self,
            width,
            height,
            sky: None,
            terrain: flat(200.0, 1.2, 80.0),
            terrain_colour: Rgb::BLACK,
            sun_size: Some(SUN_SIZE),
            star_count: STAR_COUNT,
            star_max_size: STAR_MAX_SIZE,
            tree_count: 5,
            tree_length: 150.0,
            darken: Some(0.9),
        };
        match self {
            SceneStyle::JoshuaPair => SceneParams {
                sky: Some("crimson_tide"),
                terrain: TerrainParams {
                    end_height: 170.0,
                    ..flat(150.0, TERRAIN_ROUGHNESS, TERRAIN_DISPLACEMENT)
                },
                terrain_colour: Rgb::grey(0.1),
                tree_count: 2,
                tree_length: 200.0,
                ..base
            },
            SceneStyle::JoshuaRidge => SceneParams {
                sky: Some("shroom_haze"),
                terrain: flat(100.0, 1.1, 200.0),
                star_count: 0,
                tree_count: 6,
                darken: Some(0.8),
                ..base
            },
            SceneStyle::DeadTree => SceneParams {
                sky: Some("alto"),
                sun_size: Some(600.0),
                star_count: 500,
                tree_count: 1,
                tree_length: 200.0,
                darken: None,
                ..base
            },
            SceneStyle::Grove => base,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainParams {
    pub start_height: f32,
    pub end_height: f32,
    pub roughness: f32,
    pub displacement: Option<f32>,
    pub iterations: u32,
}

/// Inputs of [`compose_scene`]. Start from [`SceneStyle::params`] and adjust.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneParams {
    pub style: SceneStyle,
    pub width: f32,
    pub height: f32,
    /// Sky gradient name, a random one when `None`.
    pub sky: Option<&'static str>,
    pub terrain: TerrainParams,
    pub terrain_colour: Rgb,
    /// Glow width at half maximum, no sun when `None`.
    pub sun_size: Option<f32>,
    pub star_count: usize,
    pub star_max_size: f32,
    /// Trees in ridge and grove scenes, the other styles have a fixed layout.
    pub tree_count: usize,
    pub tree_length: f32,
    pub darken: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub position: Vec2,
    pub size: f32,
}

/// White glow with gaussian falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunGlow {
    pub center: Vec2,
    /// Full width at half maximum.
    pub fwhm: f32,
    pub colour: Rgb,
}

impl SunGlow {
    /// Opacity of the glow at `point`, 1 at the centre and 0.5 at `fwhm / 2`.
    pub fn intensity_at(&self, point: Vec2) -> f32 {
        let d2 = point.distance_squared(self.center);
        (-4.0 * std::f32::consts::LN_2 * d2 / (self.fwhm * self.fwhm)).exp()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeKind {
    Joshua(TreePreset),
    Dead,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedTree {
    pub kind: TreeKind,
    pub origin: Vec2,
    pub drawing: TreeDrawing,
}

/// A composed scene, back to front: sky, stars, sun, terrain, trees.
#[derive(Clone, Debug)]
pub struct Scene {
    pub seed: u64,
    pub style: SceneStyle,
    pub width: f32,
    pub height: f32,
    pub sky: &'static SkyGradient,
    pub stars: Vec<Star>,
    pub sun: Option<SunGlow>,
    pub terrain: Vec<Vec2>,
    pub terrain_colour: Rgb,
    pub trees: Vec<PlacedTree>,
}

impl Scene {
    pub fn command_count(&self) -> usize {
        self.trees.iter().map(|t| t.drawing.commands.len()).sum()
    }
}

fn uniform(low: f32, high: f32) -> GenResult<Uniform<f32>> {
    Uniform::new(low, high).map_err(|e| GenError::InvalidDistribution(e.to_string()))
}

/// Uniformly scattered stars in three brightness groups (large, medium, small).
///
/// Group counts are `count × STAR_COUNT_RATIOS` (truncated, at least one large
/// star), sizes are uniform up to `max_size × STAR_SIZE_RATIOS`. Each star takes
/// three draws: x, y, size.
pub fn star_field(width: f32, height: f32, count: usize, max_size: f32, rng: &mut RandomStream) -> GenResult<Vec<Star>> {
    check_positive("star_max_size", max_size)?;
    let xs = uniform(0.0, width)?;
    let ys = uniform(0.0, height)?;

    let mut stars = Vec::new();
    for (group, (n_ratio, s_ratio)) in STAR_COUNT_RATIOS.iter().zip(STAR_SIZE_RATIOS).enumerate() {
        let mut n = (count as f32 * n_ratio) as usize;
        if group == 0 {
            n = n.max(1);
        }
        let sizes = uniform(0.0, max_size * s_ratio)?;
        for _ in 0..n {
            let position = Vec2::new(rng.sample(&xs), rng.sample(&ys));
            stars.push(Star {
                position,
                size: rng.sample(&sizes),
            });
        }
    }
    Ok(stars)
}

/// Sun at a random x, sitting on the terrain point closest to it. One draw.
pub fn sun_on_terrain(width: f32, fwhm: f32, terrain: &[Vec2], rng: &mut RandomStream) -> GenResult<SunGlow> {
    check_positive("sun_size", fwhm)?;
    let x = rng.uniform() * width;
    let y = height_at(terrain, x).ok_or(GenError::InvalidParameter {
        field: "terrain",
        value: 0.0,
        reason: "no points to stand on",
    })?;
    Ok(SunGlow {
        center: Vec2::new(x, y),
        fwhm,
        colour: Rgb::WHITE,
    })
}

/// `n` evenly spaced positions strictly inside `(0, width)`.
fn interior_positions(width: f32, n: usize) -> impl Iterator<Item = f32> {
    let step = width / (n + 1) as f32;
    (1..=n).map(move |i| step * i as f32)
}

struct Composer<'a> {
    params: &'a SceneParams,
    terrain: &'a [Vec2],
    rng: &'a mut RandomStream,
    trees: Vec<PlacedTree>,
}

impl Composer<'_> {
    fn ground(&self, x: f32) -> f32 {
        height_at(self.terrain, x).unwrap_or(0.0)
    }

    fn appearance(&self) -> TreeAppearance {
        TreeAppearance {
            darken: self.params.darken,
            ..TreeAppearance::default()
        }
    }

    // every tree grows from its own substream
    fn joshua(&mut self, preset: TreePreset, origin: Vec2, length: f32, width: Option<f32>) -> GenResult<()> {
        let mut builder = preset.builder().length(length);
        if let Some(width) = width {
            builder = builder.width(width);
        }
        let config = JoshuaTreeConfig {
            branch: builder.build()?,
            appearance: self.appearance(),
        };
        let mut stream = self.rng.substream();
        let drawing = generate_tree(origin, &config, &mut stream)?;
        self.trees.push(PlacedTree {
            kind: TreeKind::Joshua(preset),
            origin,
            drawing,
        });
        Ok(())
    }

    fn pair(&mut self) -> GenResult<()> {
        let (w, length) = (self.params.width, self.params.tree_length);
        let x = w * 0.4;
        let origin = Vec2::new(x, self.ground(x) - length / 4.0);
        self.joshua(TreePreset::TypeIa, origin, length, None)?;

        let x = w * 0.8;
        let origin = Vec2::new(x, self.ground(x) - length / 2.0);
        self.joshua(TreePreset::TypeIIb, origin, length * 1.75, Some(length * 0.15))
    }

    fn ridge(&mut self) -> GenResult<()> {
        let base = self.params.tree_length;
        for x in interior_positions(self.params.width, self.params.tree_count) {
            let length = base + self.rng.uniform() * base * 2.0 / 3.0;
            let origin = Vec2::new(x, self.ground(x) - base / 3.0);
            self.joshua(TreePreset::TypeIIa, origin, length, Some(length / 10.0))?;
        }
        Ok(())
    }

    fn grove(&mut self) -> GenResult<()> {
        let base = self.params.tree_length;
        let appearance = self.appearance();
        for x in interior_positions(self.params.width, self.params.tree_count) {
            let length = base * (0.75 + self.rng.uniform() * 0.5);
            let origin = Vec2::new(x, self.ground(x) - length / 3.0);
            let mut stream = self.rng.substream();
            let (preset, drawing) = random_joshua_tree(origin, length, &appearance, &mut stream)?;
            self.trees.push(PlacedTree {
                kind: TreeKind::Joshua(preset),
                origin,
                drawing,
            });
        }
        Ok(())
    }

    fn dead(&mut self) -> GenResult<()> {
        let x = self.params.width / 2.0;
        let origin = Vec2::new(x, self.ground(x));
        let length = self.params.tree_length;
        let branch = DeadTreeConfig::builder().length(length).width(length / 10.0).build()?;
        let mut stream = self.rng.substream();
        let drawing = generate_dead_tree(origin, &DeadTreeConfig::new(branch), &mut stream)?;
        self.trees.push(PlacedTree {
            kind: TreeKind::Dead,
            origin,
            drawing,
        });
        Ok(())
    }
}

/// Builds a full scene from one seed.
///
/// The scene stream is consumed in layer order (sky pick, stars, terrain, sun,
/// tree placement), except dead-tree scenes which scatter their stars before the
/// terrain. Each tree grows from a substream.
pub fn compose_scene(params: &SceneParams, seed: u64) -> GenResult<Scene> {
    check_positive("width", params.width)?;
    check_positive("height", params.height)?;
    check_positive("tree_length", params.tree_length)?;
    if let Some(amount) = params.darken {
        check_range("darken", amount, -1.0, 1.0)?;
    }

    let mut rng = RandomStream::from_seed(seed);

    let sky = match params.sky {
        Some(name) => sky_gradient(name).ok_or_else(|| GenError::UnknownPalette(name.to_string()))?,
        None => random_sky_gradient(&mut rng),
    };

    let (w, h) = (params.width, params.height);
    let mut stars = Vec::new();
    let stars_first = params.style == SceneStyle::DeadTree;
    if stars_first && params.star_count > 0 {
        stars = star_field(w, h, params.star_count, params.star_max_size, &mut rng)?;
    }

    let t = &params.terrain;
    let terrain = generate_terrain(
        Vec2::new(0.0, t.start_height),
        Vec2::new(w, t.end_height),
        t.roughness,
        t.displacement,
        t.iterations,
        &mut rng,
    )?;

    let sun = match params.sun_size {
        Some(size) => Some(sun_on_terrain(w, size, &terrain, &mut rng)?),
        None => None,
    };

    let mut composer = Composer {
        params,
        terrain: &terrain,
        rng: &mut rng,
        trees: Vec::new(),
    };
    match params.style {
        SceneStyle::JoshuaPair => composer.pair()?,
        SceneStyle::JoshuaRidge => composer.ridge()?,
        SceneStyle::DeadTree => composer.dead()?,
        SceneStyle::Grove => composer.grove()?,
    }
    let trees = composer.trees;

    if !stars_first && params.star_count > 0 {
        stars = star_field(w, h, params.star_count, params.star_max_size, &mut rng)?;
    }

    let scene = Scene {
        seed,
        style: params.style,
        width: w,
        height: h,
        sky,
        stars,
        sun,
        terrain,
        terrain_colour: params.terrain_colour,
        trees,
    };
    debug!(
        "composed {} scene (seed {}): sky {}, {} stars, {} trees, {} tree commands",
        params.style.name(),
        seed,
        scene.sky.name,
        scene.stars.len(),
        scene.trees.len(),
        scene.command_count()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH};

    fn params(style: SceneStyle) -> SceneParams {
        style.params(CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    #[test]
    fn star_groups_follow_ratios() {
        let mut rng = RandomStream::from_seed(1);
        let stars = star_field(1600.0, 900.0, 200, 5.0, &mut rng).unwrap();
        // 1 large, 30 medium, 170 small
        assert_eq!(stars.len(), 201);
        assert_eq!(rng.draws(), 3 * 201);
        assert!(stars[1..].iter().all(|s| s.size < 1.0));
        assert!(stars.iter().all(|s| (0.0..1600.0).contains(&s.position.x) && (0.0..900.0).contains(&s.position.y)));
    }

    #[test]
    fn star_field_rejects_empty_canvas() {
        let mut rng = RandomStream::from_seed(1);
        assert!(star_field(0.0, 900.0, 10, 5.0, &mut rng).is_err());
        assert!(star_field(100.0, 900.0, 10, 0.0, &mut rng).is_err());
    }

    #[test]
    fn sun_sits_on_the_terrain() {
        let terrain = vec![Vec2::new(0.0, 10.0), Vec2::new(50.0, 30.0), Vec2::new(100.0, 20.0)];
        let mut rng = RandomStream::from_seed(3);
        let sun = sun_on_terrain(100.0, 40.0, &terrain, &mut rng).unwrap();
        assert_eq!(sun.center.y, height_at(&terrain, sun.center.x).unwrap());
        assert!((sun.intensity_at(sun.center) - 1.0).abs() < 1e-6);
        assert!((sun.intensity_at(sun.center + Vec2::new(20.0, 0.0)) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn every_style_composes() {
        for style in SceneStyle::ALL {
            let scene = compose_scene(&params(style), 41).unwrap();
            assert_eq!(scene.terrain.len(), 257);
            assert!(!scene.trees.is_empty(), "{}", style.name());
            assert!(scene.command_count() > 0, "{}", style.name());
        }
    }

    #[test]
    fn styles_lay_out_their_trees() {
        let pair = compose_scene(&params(SceneStyle::JoshuaPair), 41).unwrap();
        let kinds: Vec<TreeKind> = pair.trees.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TreeKind::Joshua(TreePreset::TypeIa), TreeKind::Joshua(TreePreset::TypeIIb)]);
        assert_eq!(pair.sky.name, "crimson_tide");
        assert_eq!(pair.stars.len(), 201);

        let ridge = compose_scene(&params(SceneStyle::JoshuaRidge), 10001).unwrap();
        assert_eq!(ridge.trees.len(), 6);
        assert!(ridge.stars.is_empty());

        let dead = compose_scene(&params(SceneStyle::DeadTree), 2).unwrap();
        assert_eq!(dead.trees[0].kind, TreeKind::Dead);
        assert_eq!(dead.trees[0].origin.x, CANVAS_WIDTH / 2.0);
        assert_eq!(dead.stars.len(), 2 + 75 + 425);
    }

    #[test]
    fn same_seed_same_scene() {
        let p = params(SceneStyle::Grove);
        let a = compose_scene(&p, 77).unwrap();
        let b = compose_scene(&p, 77).unwrap();
        assert_eq!(a.sky.name, b.sky.name);
        assert_eq!(a.terrain, b.terrain);
        assert_eq!(a.stars, b.stars);
        assert_eq!(a.trees, b.trees);
        let c = compose_scene(&p, 78).unwrap();
        assert_ne!(a.terrain, c.terrain);
    }

    #[test]
    fn unknown_sky_is_an_error() {
        let mut p = params(SceneStyle::Grove);
        p.sky = Some("plaid");
        assert_eq!(compose_scene(&p, 0).unwrap_err(), GenError::UnknownPalette("plaid".to_string()));
    }

    #[test]
    fn sunless_scene_has_no_glow() {
        let mut p = params(SceneStyle::JoshuaRidge);
        p.sun_size = None;
        assert!(compose_scene(&p, 5).unwrap().sun.is_none());
    }
}
