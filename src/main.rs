use bevy::prelude::*;
use bevy::window::WindowPlugin;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy_egui::EguiPlugin;

use joshua_gen::config::{CANVAS_HEIGHT, CANVAS_WIDTH};
use joshua_gen::systems::scene::SceneGenerationPlugin;
use joshua_gen::systems::ui::UIPlugin;

fn main() -> bevy::app::AppExit {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Joshua trees".into(),
                mode: bevy::window::WindowMode::Windowed,
                resolution: bevy::window::WindowResolution::new(CANVAS_WIDTH, CANVAS_HEIGHT),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())

        // my custom plugins
        .add_plugins(SceneGenerationPlugin)
        .add_plugins(UIPlugin)

        .insert_resource(ClearColor(Color::BLACK)) // behind the sky
        .add_systems(Update, handle_exit)
        .run()
}

// application exit
fn handle_exit(
    keys: Res<ButtonInput<KeyCode>>,
    mut exit: EventWriter<AppExit>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
