use bevy::prelude::*;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin}; // fps
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};
use crate::config::{PANEL_DEFAULT_WIDTH, PANEL_MAX_WIDTH, PANEL_MIN_WIDTH};
use crate::generation::SceneStyle;
use crate::generation::palette::SKY_GRADIENTS;
use crate::systems::export::{ExportEvent, handle_export};
use crate::systems::scene::{RegenerateEvent, SceneSettings, SceneStats, Seed};

pub mod indicator;

pub use indicator::{Banner, BannerEvent, render_banner, update_banner};

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        assert!(app.is_plugin_added::<EguiPlugin>());
        app
            .insert_resource(Banner::default())
            .add_event::<BannerEvent>()
            .add_event::<ExportEvent>()
            .add_systems(Update, (key_input, handle_export, update_banner))
            .add_systems(EguiPrimaryContextPass, (ui_main, fps, render_banner)); // UI rendering here
    }
}

// Tab walks through the styles in order, wrapping around
pub fn next_style(style: SceneStyle) -> SceneStyle {
    let i = SceneStyle::ALL.iter().position(|s| *s == style).unwrap_or(0);
    SceneStyle::ALL[(i + 1) % SceneStyle::ALL.len()]
}


fn key_input(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    current_seed: Res<Seed>,
    mut settings: ResMut<SceneSettings>,
    mut regen_events: EventWriter<RegenerateEvent>,
    mut export_events: EventWriter<ExportEvent>,
    mut banner_events: EventWriter<BannerEvent>,
) {
    if keyboard_input.just_pressed(KeyCode::Space) {
        regen_events.write(RegenerateEvent { seed: rand::random() });
    }

    if keyboard_input.just_pressed(KeyCode::Tab) {
        let style = next_style(settings.0.style);
        settings.set_style(style);
        banner_events.write(BannerEvent::Style(style.name()));
        regen_events.write(RegenerateEvent { seed: current_seed.0 });
    }

    if keyboard_input.just_pressed(KeyCode::F12) {
        export_events.write(ExportEvent::for_scene(settings.0.style, current_seed.0));
    }
}

fn ui_main(
    mut contexts: EguiContexts,
    current_seed: Res<Seed>,
    mut settings: ResMut<SceneSettings>,
    stats: Res<SceneStats>,
    mut regen_events: EventWriter<RegenerateEvent>,
    mut export_events: EventWriter<ExportEvent>,
    mut banner_events: EventWriter<BannerEvent>,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        egui::SidePanel::left("config_panel")
            .default_width(PANEL_DEFAULT_WIDTH)
            .min_width(PANEL_MIN_WIDTH)
            .max_width(PANEL_MAX_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                let mut regenerate = false;

                // seed
                egui::CollapsingHeader::new("Seed")
                    .default_open(true)
                    .show(ui, |ui| {
                    ui.label(format!("Current: {}", current_seed.0));
                    ui.horizontal(|ui| {
                        if ui.button("Regenerate")
                            .on_hover_text("New random seed (Space)")
                            .clicked() {
                            let new_seed = rand::random();
                            regen_events.write(RegenerateEvent { seed: new_seed });
                        }
                        if ui.button("Replay")
                            .on_hover_text("Rebuild the current seed")
                            .clicked() {
                            regenerate = true;
                        }
                    });
                });

                // style and sky
                egui::CollapsingHeader::new("Scene")
                    .default_open(true)
                    .show(ui, |ui| {
                    let mut style = settings.0.style;
                    egui::ComboBox::from_label("Style")
                        .selected_text(style.name())
                        .show_ui(ui, |ui| {
                            for s in SceneStyle::ALL {
                                ui.selectable_value(&mut style, s, s.name());
                            }
                        });
                    if style != settings.0.style {
                        settings.set_style(style);
                        banner_events.write(BannerEvent::Style(style.name()));
                        regenerate = true;
                    }

                    let mut sky = settings.0.sky;
                    egui::ComboBox::from_label("Sky")
                        .selected_text(sky.unwrap_or("Random"))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut sky, None, "Random");
                            for gradient in SKY_GRADIENTS {
                                ui.selectable_value(&mut sky, Some(gradient.name), gradient.name);
                            }
                        });
                    if sky != settings.0.sky {
                        settings.0.sky = sky;
                        regenerate = true;
                    }
                });

                // terrain
                egui::CollapsingHeader::new("Terrain")
                    .default_open(true)
                    .show(ui, |ui| {
                    let max_height = settings.0.height * 0.8;
                    let terrain = &mut settings.0.terrain;
                    regenerate |= ui.add(egui::Slider::new(&mut terrain.start_height, 0.0..=max_height)
                        .text("Left Height"))
                        .on_hover_text("Height of the horizon at the left edge.")
                        .changed();
                    regenerate |= ui.add(egui::Slider::new(&mut terrain.end_height, 0.0..=max_height)
                        .text("Right Height"))
                        .on_hover_text("Height of the horizon at the right edge.")
                        .changed();
                    regenerate |= ui.add(egui::Slider::new(&mut terrain.roughness, 0.5..=2.0)
                        .text("Roughness"))
                        .on_hover_text("Each subdivision divides the displacement by 2^roughness.")
                        .changed();
                    let mut displacement = terrain.displacement.unwrap_or(0.0);
                    if ui.add(egui::Slider::new(&mut displacement, 0.0..=400.0)
                        .text("Displacement"))
                        .on_hover_text("Initial vertical offset range. Zero uses the mean of the end heights.")
                        .changed() {
                        terrain.displacement = (displacement > 0.0).then_some(displacement);
                        regenerate = true;
                    }
                    regenerate |= ui.add(egui::Slider::new(&mut terrain.iterations, 0..=12)
                        .text("Iterations"))
                        .on_hover_text("Midpoint subdivisions, 2^n + 1 points.")
                        .changed();
                });

                // sky objects
                egui::CollapsingHeader::new("Sun & Stars")
                    .default_open(true)
                    .show(ui, |ui| {
                    let mut sun = settings.0.sun_size.is_some();
                    let mut sun_size = settings.0.sun_size.unwrap_or(crate::config::SUN_SIZE);
                    regenerate |= ui.checkbox(&mut sun, "Sun").changed();
                    ui.add_enabled_ui(sun, |ui| {
                        regenerate |= ui.add(egui::Slider::new(&mut sun_size, 50.0..=1600.0)
                            .text("Glow Width"))
                            .on_hover_text("Full width at half maximum of the glow.")
                            .changed();
                    });
                    settings.0.sun_size = sun.then_some(sun_size);

                    regenerate |= ui.add(egui::Slider::new(&mut settings.0.star_count, 0..=2000)
                        .text("Stars"))
                        .changed();
                    regenerate |= ui.add(egui::Slider::new(&mut settings.0.star_max_size, 0.5..=20.0)
                        .text("Star Size"))
                        .on_hover_text("Area of the brightest stars.")
                        .changed();
                });

                // trees
                egui::CollapsingHeader::new("Trees")
                    .default_open(true)
                    .show(ui, |ui| {
                    let fixed_layout = matches!(settings.0.style, SceneStyle::JoshuaPair | SceneStyle::DeadTree);
                    ui.add_enabled_ui(!fixed_layout, |ui| {
                        regenerate |= ui.add(egui::Slider::new(&mut settings.0.tree_count, 1..=12)
                            .text("Count"))
                            .on_hover_text("Only ridge and grove scenes place a variable number of trees.")
                            .changed();
                    });
                    regenerate |= ui.add(egui::Slider::new(&mut settings.0.tree_length, 20.0..=400.0)
                        .text("Trunk Length"))
                        .changed();

                    let mut shade = settings.0.darken.is_some();
                    let mut amount = settings.0.darken.unwrap_or(0.8);
                    regenerate |= ui.checkbox(&mut shade, "Darken").changed();
                    ui.add_enabled_ui(shade, |ui| {
                        regenerate |= ui.add(egui::Slider::new(&mut amount, -1.0..=1.0)
                            .text("Amount"))
                            .on_hover_text("Positive darkens towards black, negative lightens.")
                            .changed();
                    });
                    settings.0.darken = shade.then_some(amount);
                });

                ui.separator();

                // last generation
                ui.label(format!("Sky: {}", stats.sky));
                ui.label(format!("Trees: {}", stats.trees));
                ui.label(format!("Draw commands: {}", stats.commands));
                ui.label(format!("Triangles: {}", stats.triangles));
                if let Some(err) = &stats.last_error {
                    ui.label(egui::RichText::new(err).color(egui::Color32::from_rgb(178, 34, 34)));
                }

                ui.separator();

                if ui.button("Export PNG")
                    .on_hover_text("Save a screenshot to the exports directory (F12)")
                    .clicked() {
                    export_events.write(ExportEvent::for_scene(settings.0.style, current_seed.0));
                }

                ui.separator();
                ui.label("Space - New seed");
                ui.label("Tab - Next style");
                ui.label("F12 - Export");
                ui.label("ESC - Exit");

                // trigger regeneration on any parameter change
                if regenerate {
                    regen_events.write(RegenerateEvent { seed: current_seed.0 });
                }
            });
    }
}

fn fps(
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
) {
    if let Ok(ctx) = contexts.ctx_mut() {
        egui::Area::new(egui::Id::new("fps_counter"))
            .anchor(egui::Align2::RIGHT_TOP, egui::Vec2::new(-10.0, 10.0))
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::top_down(egui::Align::RIGHT), |ui| {
                    if let Some(fps) = diagnostics
                        .get(&FrameTimeDiagnosticsPlugin::FPS)
                        .and_then(|d| d.smoothed())
                    {
                        ui.label(egui::RichText::new(format!("{:.0}", fps))
                            .size(26.0)
                            .color(egui::Color32::WHITE));
                    }
                });
            });
    }
}
