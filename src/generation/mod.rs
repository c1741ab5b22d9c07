// Procedural generation core, pure functions of (seed, configuration)
// Nothing in here touches the ECS, the viewer in `systems` consumes the output

pub mod branch;
pub mod colour;
pub mod palette;
pub mod presets;
pub mod rng;
pub mod scene;
pub mod spikes;
pub mod terrain;

use bevy::math::Vec2;

pub use branch::{
    BranchSpec, BranchSpecBuilder, DeadTreeConfig, JoshuaTreeConfig, Segment, SpikeBundle, TextureFlags, TreeAppearance,
    TreeDrawing, generate_dead_tree, generate_tree, generate_tree_seeded, random_joshua_tree,
};
pub use colour::Rgb;
pub use presets::{FOREST, TreePreset};
pub use rng::RandomStream;
pub use scene::{PlacedTree, Scene, SceneParams, SceneStyle, TerrainParams, TreeKind, compose_scene};
pub use spikes::{FieldFrame, SpikeDirection, SpikeFieldParams, SpikeLayout, synthesize_spikes};
pub use terrain::generate_terrain;

/// One branch body, a `width × height` rectangle rotated `rotation` radians
/// counter-clockwise about its centre. `height` runs along the branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchRect {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub fill: Rgb,
    pub draw_order: u32,
}

impl BranchRect {
    /// Corners counter-clockwise, starting bottom left of the unrotated rectangle.
    pub fn corners(&self) -> [Vec2; 4] {
        let rot = Vec2::from_angle(self.rotation);
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ]
        .map(|c| self.center + rot.rotate(c))
    }
}

/// One spike, filled and outlined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpikeTriangle {
    pub vertices: [Vec2; 3],
    pub fill: Rgb,
    pub edge: Rgb,
    pub edge_width: f32,
    pub draw_order: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Rectangle(BranchRect),
    Polygon(SpikeTriangle),
}

impl DrawCommand {
    pub fn draw_order(&self) -> u32 {
        match self {
            DrawCommand::Rectangle(rect) => rect.draw_order,
            DrawCommand::Polygon(tri) => tri.draw_order,
        }
    }
}

/// Commands in the order a painter should draw them: ascending draw order,
/// emission order within equal orders.
pub fn paint_order(commands: &[DrawCommand]) -> Vec<&DrawCommand> {
    let mut sorted: Vec<&DrawCommand> = commands.iter().collect();
    sorted.sort_by_key(|c| c.draw_order());
    sorted
}
