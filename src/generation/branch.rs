// Recursive branch growth, Joshua trees (textured) and dead trees (rectangles only)

use bevy::log::debug;
use bevy::math::Vec2;

use super::colour::{Rgb, darken_opt};
use super::presets::{FOREST, TreePreset};
use super::rng::RandomStream;
use super::spikes::{FieldFrame, SpikeFieldParams, synthesize_spikes};
use super::{BranchRect, DrawCommand, paint_order};
use crate::config::{MAX_DEPTH_CEILING, TREE_BASE_DRAW_ORDER};
use crate::error::{GenError, GenResult, check_positive, check_range, invalid};

/// Growth parameters of one tree, validated once by [`BranchSpecBuilder::build`].
///
/// Angles are in degrees. A segment runs from `start` to
/// `start + length·(cos a, −sin a)`, so −90° grows straight up the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchSpec {
    angle: f32,
    length: f32,
    length_change: f32,
    length_vary_prop: f32,
    length_width: f32,
    width: Option<f32>,
    width_change: f32,
    angle_change: f32,
    angle_vary_prop: f32,
    large_angle_prob: f32,
    large_angle: f32,
    split_prob: f32,
    split_prob_change: f32,
    depth: u32,
    max_depth: u32,
}

impl BranchSpec {
    pub fn builder() -> BranchSpecBuilder {
        BranchSpecBuilder::default()
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn split_prob(&self) -> f32 {
        self.split_prob
    }

    pub fn split_prob_change(&self) -> f32 {
        self.split_prob_change
    }

    pub fn large_angle_prob(&self) -> f32 {
        self.large_angle_prob
    }

    /// Width of the root segment.
    pub fn root_width(&self) -> f32 {
        self.width.unwrap_or(self.length * self.length_width)
    }
}

pub struct BranchSpecBuilder {
    spec: BranchSpec,
    depth_ceiling: u32,
}

impl Default for BranchSpecBuilder {
    fn default() -> Self {
        Self {
            spec: BranchSpec {
                angle: -90.0,
                length: 10.0,
                length_change: 0.8,
                length_vary_prop: 0.2,
                length_width: 0.2,
                width: None,
                width_change: 0.9,
                angle_change: 30.0,
                angle_vary_prop: 0.4,
                large_angle_prob: 0.0,
                large_angle: 60.0,
                split_prob: 0.9,
                split_prob_change: 1.0,
                depth: 6,
                max_depth: 6,
            },
            depth_ceiling: MAX_DEPTH_CEILING,
        }
    }
}

macro_rules! setter {
    ($(#[$doc:meta])* $name:ident: $ty:ty) => {
        $(#[$doc])*
        pub fn $name(mut self, value: $ty) -> Self {
            self.spec.$name = value;
            self
        }
    };
}

impl BranchSpecBuilder {
    setter!(/// Root angle in degrees.
        angle: f32);
    setter!(length: f32);
    setter!(/// Mean child length as a proportion of the parent.
        length_change: f32);
    setter!(/// Relative spread of the length change, must stay below 2.
        length_vary_prop: f32);
    setter!(/// Root width as a proportion of the root length, unless `width` is set.
        length_width: f32);
    setter!(width_change: f32);
    setter!(/// Mean angle between parent and child, degrees.
        angle_change: f32);
    setter!(angle_vary_prop: f32);
    setter!(/// Chance per child of swinging by `large_angle` instead.
        large_angle_prob: f32);
    setter!(large_angle: f32);
    setter!(split_prob: f32);
    setter!(/// Factor applied to the split probability at every level.
        split_prob_change: f32);
    setter!(depth: u32);
    setter!(max_depth: u32);

    pub fn width(mut self, width: f32) -> Self {
        self.spec.width = Some(width);
        self
    }

    /// Sets both `depth` and `max_depth`.
    pub fn levels(mut self, levels: u32) -> Self {
        self.spec.depth = levels;
        self.spec.max_depth = levels;
        self
    }

    /// Recursion guard, defaults to `MAX_DEPTH_CEILING`.
    pub fn depth_ceiling(mut self, ceiling: u32) -> Self {
        self.depth_ceiling = ceiling;
        self
    }

    pub fn build(self) -> GenResult<BranchSpec> {
        let s = self.spec;
        check_range("angle", s.angle, f32::MIN, f32::MAX)?;
        check_positive("length", s.length)?;
        check_positive("length_change", s.length_change)?;
        check_range("length_vary_prop", s.length_vary_prop, 0.0, 2.0)?;
        if s.length_vary_prop >= 2.0 {
            // child lengths could reach zero
            return Err(invalid("length_vary_prop", s.length_vary_prop, "must be below 2"));
        }
        check_positive("length_width", s.length_width)?;
        if let Some(width) = s.width {
            check_positive("width", width)?;
        }
        check_positive("width_change", s.width_change)?;
        check_range("angle_change", s.angle_change, f32::MIN, f32::MAX)?;
        check_range("angle_vary_prop", s.angle_vary_prop, 0.0, f32::MAX)?;
        check_range("large_angle_prob", s.large_angle_prob, 0.0, 1.0)?;
        check_range("large_angle", s.large_angle, f32::MIN, f32::MAX)?;
        check_range("split_prob", s.split_prob, 0.0, 1.0)?;
        check_range("split_prob_change", s.split_prob_change, 0.0, f32::MAX)?;
        if s.max_depth > self.depth_ceiling {
            return Err(GenError::DepthExceeded {
                depth: s.max_depth,
                ceiling: self.depth_ceiling,
            });
        }
        if s.depth > s.max_depth {
            return Err(invalid("depth", s.depth as f32, "exceeds max_depth"));
        }
        Ok(s)
    }
}

/// Which spike fields a Joshua tree grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureFlags {
    pub back: bool,
    pub forward: bool,
    pub mid: bool,
}

impl TextureFlags {
    pub const ALL: TextureFlags = TextureFlags {
        back: true,
        forward: true,
        mid: true,
    };
    pub const NONE: TextureFlags = TextureFlags {
        back: false,
        forward: false,
        mid: false,
    };
}

/// Field looks for the three spike positions on a branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpikeBundle {
    pub forward: SpikeFieldParams,
    pub mid: SpikeFieldParams,
    pub back: SpikeFieldParams,
}

impl Default for SpikeBundle {
    fn default() -> Self {
        Self {
            forward: SpikeFieldParams::green_forward(),
            mid: SpikeFieldParams::yellow_mid(),
            back: SpikeFieldParams::brown_back(),
        }
    }
}

/// Everything about a Joshua tree that is not growth.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeAppearance {
    pub trunk_colour: Rgb,
    /// Emit branch rectangles, off when only the spikes should show.
    pub draw_branches: bool,
    pub texture: TextureFlags,
    /// Applied to the trunk and every spike field, in `[-1, 1]`.
    pub darken: Option<f32>,
    pub spikes: SpikeBundle,
    pub base_draw_order: u32,
}

impl Default for TreeAppearance {
    fn default() -> Self {
        Self {
            trunk_colour: Rgb::BROWN,
            draw_branches: false,
            texture: TextureFlags::ALL,
            darken: None,
            spikes: SpikeBundle::default(),
            base_draw_order: TREE_BASE_DRAW_ORDER,
        }
    }
}

impl TreeAppearance {
    pub fn validate(&self) -> GenResult<()> {
        self.trunk_colour.validate("trunk_colour")?;
        if let Some(amount) = self.darken {
            check_range("darken", amount, -1.0, 1.0)?;
        }
        self.spikes.forward.validate()?;
        self.spikes.mid.validate()?;
        self.spikes.back.validate()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct JoshuaTreeConfig {
    pub branch: BranchSpec,
    pub appearance: TreeAppearance,
}

impl JoshuaTreeConfig {
    pub fn new(branch: BranchSpec) -> Self {
        Self {
            branch,
            appearance: TreeAppearance::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeadTreeConfig {
    pub branch: BranchSpec,
    pub colour: Rgb,
    pub draw_order: u32,
}

impl DeadTreeConfig {
    /// Bare black tree sized for a 1600 × 900 canvas.
    pub fn builder() -> BranchSpecBuilder {
        BranchSpec::builder()
            .length(200.0)
            .length_change(0.6)
            .length_vary_prop(1.0)
            .length_width(0.1)
            .width(20.0)
            .width_change(0.8)
            .angle_vary_prop(1.0)
            .levels(8)
    }

    pub fn new(branch: BranchSpec) -> Self {
        Self {
            branch,
            colour: Rgb::BLACK,
            draw_order: TREE_BASE_DRAW_ORDER,
        }
    }
}

/// One visited segment, in pre-order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
    pub angle: f32,
    pub width: f32,
    pub depth: u32,
    /// Split probability handed to this segment, before its own decay.
    pub split_prob: f32,
    /// Children whose split draw passed.
    pub spawned: [bool; 2],
    pub terminal: bool,
    pub back_spikes: usize,
    pub forward_spikes: usize,
    pub mid_spikes: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeDrawing {
    /// Commands in emission order.
    pub commands: Vec<DrawCommand>,
    pub segments: Vec<Segment>,
}

impl TreeDrawing {
    pub fn paint_order(&self) -> Vec<&DrawCommand> {
        paint_order(&self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// per-call state, everything that changes on the way down
#[derive(Clone, Copy)]
struct Growth {
    start: Vec2,
    angle: f32,
    length: f32,
    width: f32,
    depth: u32,
    split_prob: f32,
    draw_order: u32,
}

impl Growth {
    fn root(origin: Vec2, spec: &BranchSpec, draw_order: u32) -> Self {
        Self {
            start: origin,
            angle: spec.angle,
            length: spec.length,
            width: spec.root_width(),
            depth: spec.depth,
            split_prob: spec.split_prob,
            draw_order,
        }
    }

    fn end(&self) -> Vec2 {
        let a = self.angle.to_radians();
        self.start + self.length * Vec2::new(a.cos(), -a.sin())
    }

    // counter-clockwise turn taking the local +y axis onto the segment
    fn rotation(&self) -> f32 {
        (-self.angle - 90.0).to_radians()
    }

    fn rect(&self, end: Vec2, fill: Rgb, draw_order: u32) -> BranchRect {
        BranchRect {
            center: (self.start + end) / 2.0,
            width: self.width,
            height: self.length,
            rotation: self.rotation(),
            fill,
            draw_order,
        }
    }

    fn frame(&self, pivot: Vec2, offset: f32) -> FieldFrame {
        FieldFrame {
            pivot,
            rotation: self.rotation(),
            offset,
        }
    }
}

/// `change + (u − 0.5)·change·vary` for four draws: two lengths, then two angles.
fn draw_changes(spec: &BranchSpec, rng: &mut RandomStream) -> [f32; 4] {
    let lengths = [0, 1].map(|_| spec.length_change + (rng.uniform() - 0.5) * spec.length_change * spec.length_vary_prop);
    let angles = [0, 1].map(|_| spec.angle_change + (rng.uniform() - 0.5) * spec.angle_change * spec.angle_vary_prop);
    [lengths[0], lengths[1], angles[0], angles[1]]
}

struct JoshuaWalk<'a> {
    spec: &'a BranchSpec,
    look: &'a TreeAppearance,
    rng: &'a mut RandomStream,
    out: TreeDrawing,
}

impl JoshuaWalk<'_> {
    fn grow(&mut self, mut g: Growth) -> GenResult<()> {
        if g.depth == 0 {
            return Ok(());
        }
        g.draw_order += 1;
        let end = g.end();
        let darken = self.look.darken;

        let index = self.out.segments.len();
        self.out.segments.push(Segment {
            start: g.start,
            end,
            angle: g.angle,
            width: g.width,
            depth: g.depth,
            split_prob: g.split_prob,
            spawned: [false; 2],
            terminal: false,
            back_spikes: 0,
            forward_spikes: 0,
            mid_spikes: 0,
        });

        if self.look.draw_branches {
            let fill = darken_opt(self.look.trunk_colour, darken);
            self.out.commands.push(DrawCommand::Rectangle(g.rect(end, fill, g.draw_order)));
        }

        if self.look.texture.back {
            let frame = g.frame(g.start, g.length * 0.25);
            let n = self.spikes(&frame, g.width, g.length * 0.75, self.look.spikes.back, g.draw_order)?;
            self.out.segments[index].back_spikes = n;
        }

        let [l1, l2, mut a1, mut a2] = draw_changes(self.spec, self.rng);

        let split_prob = g.split_prob * self.spec.split_prob_change;

        // threshold then sign, per child
        let swing = self.rng.uniform_vec(4);
        let large = self.spec.large_angle;
        if swing[0] < self.spec.large_angle_prob {
            a1 = if swing[1] >= 0.5 { large } else { -large };
        }
        if swing[2] < self.spec.large_angle_prob {
            a2 = if swing[3] >= 0.5 { large } else { -large };
        }

        let split = [self.rng.uniform(), self.rng.uniform()];
        let children = [(g.angle - a1, l1), (g.angle + a2, l2)];
        let mut spawned = [false; 2];
        for (i, (angle, change)) in children.into_iter().enumerate() {
            if split[i] < split_prob {
                spawned[i] = true;
                self.grow(Growth {
                    start: end,
                    angle,
                    length: g.length * change,
                    width: g.width * self.spec.width_change,
                    depth: g.depth - 1,
                    split_prob,
                    draw_order: g.draw_order,
                })?;
            }
        }

        let terminal = !spawned.iter().any(|s| *s) || g.depth == 1;
        self.out.segments[index].spawned = spawned;
        self.out.segments[index].terminal = terminal;

        // leaves only at the tips, aligned with the last segment
        if terminal {
            if self.look.texture.forward {
                let frame = g.frame(end, 0.0);
                let n = self.spikes(&frame, g.width, g.length, self.look.spikes.forward, g.draw_order)?;
                self.out.segments[index].forward_spikes = n;
            }
            if self.look.texture.mid {
                let frame = g.frame(end, -g.length * 0.25);
                let n = self.spikes(&frame, g.width, g.length * 0.25, self.look.spikes.mid, g.draw_order)?;
                self.out.segments[index].mid_spikes = n;
            }
        }

        Ok(())
    }

    fn spikes(
        &mut self,
        frame: &FieldFrame,
        width: f32,
        length: f32,
        params: SpikeFieldParams,
        draw_order: u32,
    ) -> GenResult<usize> {
        let triangles = synthesize_spikes(frame, width, length, &params, self.look.darken, draw_order, self.rng)?;
        let n = triangles.len();
        self.out.commands.extend(triangles.into_iter().map(DrawCommand::Polygon));
        Ok(n)
    }
}

/// Grows a Joshua tree rooted at `origin`.
///
/// Every call consumes, in order: its back spike field, four length/angle
/// draws, four large-angle draws (threshold and sign per child), two split
/// draws, then the children's draws and finally its tip fields.
///
/// # Returns
/// The draw commands in emission order plus the visited segments.
pub fn generate_tree(origin: Vec2, config: &JoshuaTreeConfig, rng: &mut RandomStream) -> GenResult<TreeDrawing> {
    config.appearance.validate()?;

    let root = Growth::root(origin, &config.branch, config.appearance.base_draw_order);
    let mut walk = JoshuaWalk {
        spec: &config.branch,
        look: &config.appearance,
        rng,
        out: TreeDrawing::default(),
    };
    walk.grow(root)?;

    let drawing = walk.out;
    debug!(
        "joshua tree at ({:.1}, {:.1}): {} segments, {} commands",
        origin.x,
        origin.y,
        drawing.segments.len(),
        drawing.commands.len()
    );
    Ok(drawing)
}

/// Seeds a fresh stream for one tree, from entropy when `seed` is `None`.
pub fn generate_tree_seeded(origin: Vec2, config: &JoshuaTreeConfig, seed: Option<u64>) -> GenResult<TreeDrawing> {
    let seed = seed.unwrap_or_else(rand::random::<u64>);
    debug!("seeding tree stream with {}", seed);
    generate_tree(origin, config, &mut RandomStream::from_seed(seed))
}

/// Picks a preset from the weighted forest list with one draw, then grows it.
pub fn random_joshua_tree(
    origin: Vec2,
    length: f32,
    appearance: &TreeAppearance,
    rng: &mut RandomStream,
) -> GenResult<(TreePreset, TreeDrawing)> {
    let preset = *rng.choice(&FOREST)?;
    let config = JoshuaTreeConfig {
        branch: preset.builder().length(length).build()?,
        appearance: appearance.clone(),
    };
    Ok((preset, generate_tree(origin, &config, rng)?))
}

struct DeadWalk<'a> {
    config: &'a DeadTreeConfig,
    rng: &'a mut RandomStream,
    out: TreeDrawing,
}

impl DeadWalk<'_> {
    fn grow(&mut self, g: Growth) {
        if g.depth == 0 {
            return;
        }
        let config = self.config;
        let spec = &config.branch;
        let end = g.end();

        let index = self.out.segments.len();
        self.out.segments.push(Segment {
            start: g.start,
            end,
            angle: g.angle,
            width: g.width,
            depth: g.depth,
            split_prob: g.split_prob,
            spawned: [false; 2],
            terminal: false,
            back_spikes: 0,
            forward_spikes: 0,
            mid_spikes: 0,
        });
        self.out
            .commands
            .push(DrawCommand::Rectangle(g.rect(end, config.colour, config.draw_order)));

        let [l1, l2, a1, a2] = draw_changes(spec, self.rng);
        let split_prob = g.split_prob * spec.split_prob_change;
        let split = [self.rng.uniform(), self.rng.uniform()];

        // thins out faster towards the tips
        let width = g.width * spec.width_change * (g.depth as f32 / spec.max_depth as f32);
        let children = [(g.angle - a1, l1), (g.angle + a2, l2)];
        let mut spawned = [false; 2];
        for (i, (angle, change)) in children.into_iter().enumerate() {
            if split[i] < split_prob {
                spawned[i] = true;
                self.grow(Growth {
                    start: end,
                    angle,
                    length: g.length * change,
                    width,
                    depth: g.depth - 1,
                    split_prob,
                    draw_order: g.draw_order,
                });
            }
        }

        self.out.segments[index].spawned = spawned;
        self.out.segments[index].terminal = !spawned.iter().any(|s| *s) || g.depth == 1;
    }
}

/// Grows a bare tree of plain rectangles rooted at `origin`.
///
/// Every call consumes four length/angle draws and two split draws.
pub fn generate_dead_tree(origin: Vec2, config: &DeadTreeConfig, rng: &mut RandomStream) -> GenResult<TreeDrawing> {
    config.colour.validate("colour")?;
    let mut walk = DeadWalk {
        config,
        rng,
        out: TreeDrawing::default(),
    };
    walk.grow(Growth::root(origin, &config.branch, config.draw_order));

    debug!(
        "dead tree at ({:.1}, {:.1}): {} segments",
        origin.x,
        origin.y,
        walk.out.segments.len()
    );
    Ok(walk.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(spec: BranchSpec) -> JoshuaTreeConfig {
        JoshuaTreeConfig {
            branch: spec,
            appearance: TreeAppearance {
                draw_branches: true,
                texture: TextureFlags::NONE,
                ..TreeAppearance::default()
            },
        }
    }

    #[test]
    fn builder_defaults_are_type_one() {
        let spec = BranchSpec::builder().build().unwrap();
        assert_eq!(spec.depth(), 6);
        assert_eq!(spec.max_depth(), 6);
        assert!((spec.root_width() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn builder_rejects_bad_values() {
        let bad = [
            BranchSpec::builder().length(-2.0).build(),
            BranchSpec::builder().length_change(0.0).build(),
            BranchSpec::builder().length_vary_prop(2.0).build(),
            BranchSpec::builder().length_width(0.0).build(),
            BranchSpec::builder().width(0.0).build(),
            BranchSpec::builder().width_change(-0.5).build(),
            BranchSpec::builder().split_prob(1.2).build(),
            BranchSpec::builder().large_angle_prob(-0.1).build(),
            BranchSpec::builder().angle_vary_prop(f32::NAN).build(),
            BranchSpec::builder().depth(7).max_depth(6).build(),
        ];
        for result in bad {
            assert!(matches!(result, Err(GenError::InvalidConfiguration { .. })), "{:?}", result);
        }
    }

    #[test]
    fn depth_ceiling_is_enforced() {
        assert_eq!(
            BranchSpec::builder().levels(65).build(),
            Err(GenError::DepthExceeded { depth: 65, ceiling: 64 })
        );
        assert!(BranchSpec::builder().levels(10).depth_ceiling(8).build().is_err());
        assert!(BranchSpec::builder().levels(8).depth_ceiling(8).build().is_ok());
    }

    #[test]
    fn depth_zero_draws_nothing() {
        let config = JoshuaTreeConfig::new(BranchSpec::builder().depth(0).build().unwrap());
        let mut rng = RandomStream::from_seed(1);
        let drawing = generate_tree(Vec2::ZERO, &config, &mut rng).unwrap();
        assert!(drawing.is_empty());
        assert!(drawing.segments.is_empty());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn single_level_is_one_terminal_segment() {
        let spec = BranchSpec::builder().levels(1).length(10.0).width(3.0).build().unwrap();
        let config = JoshuaTreeConfig::new(spec);
        let mut rng = RandomStream::from_seed(5);
        let drawing = generate_tree(Vec2::new(100.0, 50.0), &config, &mut rng).unwrap();

        assert_eq!(drawing.segments.len(), 1);
        let seg = drawing.segments[0];
        assert!(seg.terminal);
        assert!((seg.end - Vec2::new(100.0, 60.0)).length() < 1e-4);

        // back field 3 wide over 7.5, forward over 10, mid over 2.5
        let back = SpikeFieldParams::brown_back().count(3.0, 7.5).unwrap();
        let forward = SpikeFieldParams::green_forward().count(3.0, 10.0).unwrap();
        let mid = SpikeFieldParams::yellow_mid().count(3.0, 2.5).unwrap();
        assert_eq!((seg.back_spikes, seg.forward_spikes, seg.mid_spikes), (back, forward, mid));
        assert_eq!(drawing.commands.len(), back + forward + mid);
        // field draws plus 10 branch draws
        assert_eq!(rng.draws() as usize, 7 * (back + forward + mid) + 10);
    }

    #[test]
    fn root_rectangle_spans_the_segment() {
        let spec = BranchSpec::builder().levels(1).angle(0.0).length(10.0).width(2.0).build().unwrap();
        let drawing = generate_tree(Vec2::ZERO, &bare(spec), &mut RandomStream::from_seed(2)).unwrap();
        let DrawCommand::Rectangle(rect) = drawing.commands[0] else {
            panic!("expected a rectangle");
        };
        // angle 0 points east
        assert!((rect.center - Vec2::new(5.0, 0.0)).length() < 1e-4);
        assert_eq!(rect.draw_order, TREE_BASE_DRAW_ORDER + 1);
        let corners = rect.corners();
        assert!(corners.iter().all(|c| c.x > -1e-3 && c.x < 10.0 + 1e-3));
        assert!(corners.iter().all(|c| c.y.abs() < 1.0 + 1e-3));
    }

    #[test]
    fn children_paint_above_parents() {
        let spec = BranchSpec::builder().split_prob(1.0).levels(3).build().unwrap();
        let drawing = generate_tree(Vec2::ZERO, &bare(spec), &mut RandomStream::from_seed(7)).unwrap();
        assert_eq!(drawing.segments.len(), 7);
        let orders: Vec<u32> = drawing.commands.iter().map(|c| c.draw_order()).collect();
        assert_eq!(orders, vec![5, 6, 7, 7, 6, 7, 7]);
    }

    #[test]
    fn full_split_with_no_variation_is_symmetric() {
        let spec = BranchSpec::builder()
            .split_prob(1.0)
            .length_vary_prop(0.0)
            .angle_vary_prop(0.0)
            .levels(2)
            .build()
            .unwrap();
        let drawing = generate_tree(Vec2::ZERO, &bare(spec), &mut RandomStream::from_seed(3)).unwrap();
        let segs = &drawing.segments;
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1].angle, -120.0);
        assert_eq!(segs[2].angle, -60.0);
        assert!((segs[1].end.y - segs[2].end.y).abs() < 1e-4);
        assert!((segs[1].end.x + segs[2].end.x).abs() < 1e-4);
        assert!((segs[1].width - segs[0].width * 0.9).abs() < 1e-6);
    }

    #[test]
    fn large_angle_swings_both_ways() {
        let spec = BranchSpec::builder()
            .split_prob(1.0)
            .large_angle_prob(1.0)
            .large_angle(60.0)
            .levels(2)
            .build()
            .unwrap();
        let mut deltas = Vec::new();
        for seed in 0..40 {
            let drawing = generate_tree(Vec2::ZERO, &bare(spec.clone()), &mut RandomStream::from_seed(seed)).unwrap();
            let root = drawing.segments[0].angle;
            for child in &drawing.segments[1..] {
                deltas.push((child.angle - root).abs());
            }
        }
        assert!(deltas.iter().all(|d| (d - 60.0).abs() < 1e-4));

        let signed: Vec<f32> = (0..40)
            .map(|seed| {
                let d = generate_tree(Vec2::ZERO, &bare(spec.clone()), &mut RandomStream::from_seed(seed)).unwrap();
                d.segments[1].angle - d.segments[0].angle
            })
            .collect();
        assert!(signed.iter().any(|d| *d > 0.0));
        assert!(signed.iter().any(|d| *d < 0.0));
    }

    #[test]
    fn terminal_segments_carry_the_leaves() {
        let config = JoshuaTreeConfig::new(TreePreset::TypeIb.builder().length(40.0).build().unwrap());
        for seed in 0..10 {
            let drawing = generate_tree(Vec2::ZERO, &config, &mut RandomStream::from_seed(seed)).unwrap();
            for seg in &drawing.segments {
                let expect_terminal = seg.spawned == [false, false] || seg.depth == 1;
                assert_eq!(seg.terminal, expect_terminal);
                assert_eq!(seg.forward_spikes > 0, seg.terminal);
                assert_eq!(seg.mid_spikes > 0, seg.terminal);
                assert!(seg.back_spikes > 0);
            }
        }
    }

    #[test]
    fn seeded_entry_is_reproducible() {
        let config = JoshuaTreeConfig::new(TreePreset::TypeIIa.builder().length(100.0).build().unwrap());
        let a = generate_tree_seeded(Vec2::new(10.0, 0.0), &config, Some(99)).unwrap();
        let b = generate_tree_seeded(Vec2::new(10.0, 0.0), &config, Some(99)).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn random_tree_spends_one_draw_on_the_preset() {
        let appearance = TreeAppearance::default();
        let mut rng = RandomStream::from_seed(12);
        let (preset, drawing) = random_joshua_tree(Vec2::ZERO, 10.0, &appearance, &mut rng).unwrap();

        let mut replay = RandomStream::from_seed(12);
        let picked = *replay.choice(&FOREST).unwrap();
        assert_eq!(picked, preset);
        let config = JoshuaTreeConfig::new(preset.builder().length(10.0).build().unwrap());
        assert_eq!(generate_tree(Vec2::ZERO, &config, &mut replay).unwrap(), drawing);
        assert_eq!(replay.draws(), rng.draws());
    }

    // child angle and length change for one side, from its length, angle, threshold and sign draws
    fn replay_child(spec: &BranchSpec, u_len: f32, u_ang: f32, threshold: f32, sign: f32) -> (f32, f32) {
        let length = spec.length_change + (u_len - 0.5) * spec.length_change * spec.length_vary_prop;
        let mut angle = spec.angle_change + (u_ang - 0.5) * spec.angle_change * spec.angle_vary_prop;
        if threshold < spec.large_angle_prob {
            angle = if sign >= 0.5 { spec.large_angle } else { -spec.large_angle };
        }
        (length, angle)
    }

    #[test]
    fn joshua_draws_follow_changes_swings_then_splits() {
        let spec = BranchSpec::builder()
            .split_prob(1.0)
            .large_angle_prob(0.5)
            .levels(2)
            .length(50.0)
            .build()
            .unwrap();
        let config = bare(spec.clone());

        for seed in 0..24 {
            let mut rng = RandomStream::from_seed(seed);
            let drawing = generate_tree(Vec2::ZERO, &config, &mut rng).unwrap();
            // ten draws at the root, ten more in each child
            assert_eq!(rng.draws(), 30);

            let mut replay = RandomStream::from_seed(seed);
            let [l1, l2, a1, a2, thr1, sign1, thr2, sign2, _, _] = [0; 10].map(|_| replay.uniform());
            let (len1, ang1) = replay_child(&spec, l1, a1, thr1, sign1);
            let (len2, ang2) = replay_child(&spec, l2, a2, thr2, sign2);

            let segs = &drawing.segments;
            assert_eq!(segs.len(), 3);
            assert_eq!(segs[0].spawned, [true, true]);
            assert!((segs[1].angle - (segs[0].angle - ang1)).abs() < 1e-4, "seed {}", seed);
            assert!((segs[2].angle - (segs[0].angle + ang2)).abs() < 1e-4, "seed {}", seed);
            assert!((segs[1].start.distance(segs[1].end) - 50.0 * len1).abs() < 1e-3, "seed {}", seed);
            assert!((segs[2].start.distance(segs[2].end) - 50.0 * len2).abs() < 1e-3, "seed {}", seed);
        }
    }

    #[test]
    fn joshua_split_draws_come_last() {
        let spec = BranchSpec::builder().split_prob(0.5).levels(1).build().unwrap();
        let config = bare(spec);
        for seed in 0..24 {
            let drawing = generate_tree(Vec2::ZERO, &config, &mut RandomStream::from_seed(seed)).unwrap();
            let mut replay = RandomStream::from_seed(seed);
            let u = replay.uniform_vec(10);
            assert_eq!(drawing.segments[0].spawned, [u[8] < 0.5, u[9] < 0.5], "seed {}", seed);
        }
    }

    #[test]
    fn dead_tree_draws_changes_then_splits() {
        let spec = DeadTreeConfig::builder().split_prob(0.7).levels(2).build().unwrap();
        let config = DeadTreeConfig::new(spec.clone());

        for seed in 0..24 {
            let drawing = generate_dead_tree(Vec2::ZERO, &config, &mut RandomStream::from_seed(seed)).unwrap();
            let mut replay = RandomStream::from_seed(seed);
            let [l1, l2, a1, a2, s1, s2] = [0; 6].map(|_| replay.uniform());
            // no large-angle draws in a dead tree
            let (len1, ang1) = replay_child(&spec, l1, a1, 1.0, 0.0);
            let (len2, ang2) = replay_child(&spec, l2, a2, 1.0, 0.0);

            let segs = &drawing.segments;
            let spawned = [s1 < 0.7, s2 < 0.7];
            assert_eq!(segs[0].spawned, spawned, "seed {}", seed);
            assert_eq!(segs.len(), 1 + spawned.iter().filter(|s| **s).count());

            let mut children = segs[1..].iter();
            for (grown, (len, ang, sign)) in spawned.into_iter().zip([(len1, ang1, -1.0), (len2, ang2, 1.0)]) {
                if !grown {
                    continue;
                }
                let child = children.next().unwrap();
                assert!((child.angle - (segs[0].angle + sign * ang)).abs() < 1e-4, "seed {}", seed);
                assert!((child.start.distance(child.end) - 200.0 * len).abs() < 1e-2, "seed {}", seed);
            }
        }
    }

    #[test]
    fn out_of_range_colours_are_rejected() {
        let mut config = JoshuaTreeConfig::new(BranchSpec::builder().build().unwrap());
        config.appearance.trunk_colour = Rgb::new(0.5, 1.5, 0.5);
        assert!(matches!(
            generate_tree(Vec2::ZERO, &config, &mut RandomStream::from_seed(0)),
            Err(GenError::InvalidConfiguration { field: "trunk_colour", .. })
        ));

        let mut dead = DeadTreeConfig::new(DeadTreeConfig::builder().build().unwrap());
        dead.colour = Rgb::new(-0.2, 0.0, 0.0);
        let mut rng = RandomStream::from_seed(0);
        assert!(generate_dead_tree(Vec2::ZERO, &dead, &mut rng).is_err());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn bad_darken_is_rejected() {
        let mut config = JoshuaTreeConfig::new(BranchSpec::builder().build().unwrap());
        config.appearance.darken = Some(-1.5);
        assert!(generate_tree(Vec2::ZERO, &config, &mut RandomStream::from_seed(0)).is_err());
    }

    #[test]
    fn dead_tree_is_rectangles_and_thins_with_depth() {
        let config = DeadTreeConfig::new(DeadTreeConfig::builder().split_prob(1.0).levels(3).build().unwrap());
        let mut rng = RandomStream::from_seed(4);
        let drawing = generate_dead_tree(Vec2::new(800.0, 200.0), &config, &mut rng).unwrap();

        assert_eq!(drawing.segments.len(), 7);
        assert!(drawing.commands.iter().all(|c| matches!(c, DrawCommand::Rectangle(r) if r.fill == Rgb::BLACK)));
        assert!(drawing.commands.iter().all(|c| c.draw_order() == TREE_BASE_DRAW_ORDER));
        // six draws per call, no large-angle draws
        assert_eq!(rng.draws(), 7 * 6);

        let segs = &drawing.segments;
        assert_eq!(segs[0].width, 20.0);
        assert!((segs[1].width - 20.0 * 0.8).abs() < 1e-4);
        assert!((segs[2].width - 20.0 * 0.8 * 0.8 * (2.0 / 3.0)).abs() < 1e-4);
    }
}
