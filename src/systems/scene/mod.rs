// this is the entry point for the scene generation plugin
use bevy::prelude::*;
use bevy::render::camera::ScalingMode;

use crate::config::*;
use crate::generation::{SceneParams, SceneStyle};

pub mod landscape;
pub mod mesh_gen;

// resources
#[derive(Resource)]
pub struct Seed(pub u64);

// scene generation parameters, edited from the side panel
#[derive(Resource, Clone)]
pub struct SceneSettings(pub SceneParams);

impl Default for SceneSettings {
    fn default() -> Self {
        Self(SceneStyle::default().params(CANVAS_WIDTH, CANVAS_HEIGHT))
    }
}

impl SceneSettings {
    // swapping styles starts again from that style's defaults
    pub fn set_style(&mut self, style: SceneStyle) {
        if self.0.style != style {
            self.0 = style.params(self.0.width, self.0.height);
        }
    }
}

// what the last generation produced, shown in the side panel
#[derive(Resource, Default)]
pub struct SceneStats {
    pub sky: &'static str,
    pub trees: usize,
    pub commands: usize,
    pub triangles: usize,
    pub last_error: Option<String>,
}

// Event for regeneration
#[derive(Event)]
pub struct RegenerateEvent {
    pub seed: u64,
}

// main plugin for generation
pub struct SceneGenerationPlugin;

impl Plugin for SceneGenerationPlugin {
    fn build(&self, app: &mut App) {
        app
            .insert_resource(Seed(INITIAL_SEED))
            .insert_resource(SceneSettings::default())
            .insert_resource(SceneStats::default())

            .add_event::<RegenerateEvent>()

            // camera first, then the initial scene
            .add_systems(Startup, (spawn_camera, landscape::generate_initial).chain())
            .add_systems(Update, landscape::handle_regeneration);
    }
}

// orthographic camera framing the whole canvas, (0,0) bottom left
fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::AutoMin {
                min_width: CANVAS_WIDTH,
                min_height: CANVAS_HEIGHT,
            },
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0, 100.0),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_change_resets_to_style_defaults() {
        let mut settings = SceneSettings::default();
        settings.0.star_count = 3;
        settings.set_style(SceneStyle::JoshuaPair);
        assert_eq!(settings.0.star_count, 3);

        settings.set_style(SceneStyle::DeadTree);
        assert_eq!(settings.0, SceneStyle::DeadTree.params(CANVAS_WIDTH, CANVAS_HEIGHT));
    }
}
