// Configuration file, all measurements in canvas units (1 unit = 1 pixel of the saved image)
// This controls the initial generation parameter settings

// Canvas boundaries, the y axis points up and (0,0) is the bottom left corner
pub const CANVAS_WIDTH: f32 = 1600.0;
pub const CANVAS_HEIGHT: f32 = 900.0;

pub const INITIAL_SEED: u64 = 41;

// Safety ceilings, generation fails instead of running away
pub const MAX_DEPTH_CEILING: u32 = 64;         // recursion depth guard for branch growth
pub const MAX_TERRAIN_ITERATIONS: u32 = 20;    // 2^20 + 1 points is already far past pixel density
pub const MAX_SPIKES_PER_FIELD: usize = 100_000;

// Weighted choice tolerance, weights must sum to 1 within this
pub const DISTRIBUTION_TOLERANCE: f32 = 1e-4;

// Draw order bases, higher is painted later (on top)
pub const TREE_BASE_DRAW_ORDER: u32 = 4;

// Render layers (z) for the viewer, mirrors the paint order of the scene
pub const SKY_Z: f32 = 0.0;
pub const STARS_Z: f32 = 1.0;
pub const SUN_Z: f32 = 2.0;
pub const TERRAIN_Z: f32 = 3.0;
pub const TREES_Z: f32 = 4.0;
pub const TREE_Z_STEP: f32 = 0.01;   // separates trees of one scene

// Terrain defaults (see the scene styles for per-style values)
pub const TERRAIN_ROUGHNESS: f32 = 1.1;
pub const TERRAIN_DISPLACEMENT: f32 = 100.0;
pub const TERRAIN_ITERATIONS: u32 = 8;

// Sun glow
pub const SUN_SIZE: f32 = 800.0;       // full width at half maximum
pub const SUN_RINGS: usize = 24;       // rings used to approximate the gaussian
pub const SUN_SEGMENTS: usize = 64;

// Star field, brightness groups (large, medium, small)
pub const STAR_COUNT: usize = 200;
pub const STAR_MAX_SIZE: f32 = 5.0;
pub const STAR_COUNT_RATIOS: [f32; 3] = [0.005, 0.15, 0.85];
pub const STAR_SIZE_RATIOS: [f32; 3] = [1.0, 0.2, 0.02];

// Spike outline thickness cap, keeps needle-thin triangles from exploding at the miter
pub const MAX_OUTLINE_GROWTH: f32 = 0.6;

// Screenshots land here, relative to the working directory
pub const EXPORT_DIR: &str = "exports";

// Side panel widths, the default must leave the sliders room to fit
pub const PANEL_MIN_WIDTH: f32 = 250.0;
pub const PANEL_DEFAULT_WIDTH: f32 = 280.0;
pub const PANEL_MAX_WIDTH: f32 = 400.0;
