use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

// short banner at the top of the canvas, fades out after `duration` seconds
#[derive(Resource)]
pub struct Banner {
    pub text: String,
    pub colour: egui::Color32,
    pub timer: f32,
    pub duration: f32,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            text: String::new(),
            colour: egui::Color32::from_rgb(45, 72, 116),
            timer: 0.0,
            duration: 2.0,
        }
    }
}

impl Banner {
    pub fn alpha(&self) -> f32 {
        (self.timer / self.duration).clamp(0.0, 1.0)
    }

    pub fn tick(&mut self, dt: f32) {
        self.timer = (self.timer - dt).max(0.0);
    }
}

#[derive(Event)]
pub enum BannerEvent {
    Style(&'static str),
    Exported(String),
}

impl BannerEvent {
    fn text_and_colour(&self) -> (String, egui::Color32) {
        match self {
            BannerEvent::Style(name) => (name.to_uppercase(), egui::Color32::from_rgb(45, 72, 116)),
            BannerEvent::Exported(path) => (format!("SAVED {}", path), egui::Color32::from_rgb(50, 91, 34)),
        }
    }
}

pub fn update_banner(
    mut banner: ResMut<Banner>,
    mut events: EventReader<BannerEvent>,
    time: Res<Time>,
) {
    for event in events.read() {
        let (text, colour) = event.text_and_colour();
        banner.text = text;
        banner.colour = colour;
        banner.timer = banner.duration;
    }
    banner.tick(time.delta_secs());
}

pub fn render_banner(banner: Res<Banner>, mut contexts: EguiContexts) {
    if banner.timer <= 0.0 {
        return;
    }

    if let Ok(ctx) = contexts.ctx_mut() {
        let alpha = banner.alpha();
        let fade = |c: egui::Color32, max: f32| {
            egui::Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), (max * alpha) as u8)
        };

        egui::Area::new(egui::Id::new("banner"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 60.0))
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(fade(banner.colour, 200.0))
                    .stroke(egui::Stroke::new(2.0, fade(egui::Color32::WHITE, 200.0)))
                    .inner_margin(egui::Margin::symmetric(20, 10))
                    .corner_radius(egui::CornerRadius::same(8))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&banner.text)
                            .size(18.0)
                            .color(fade(egui::Color32::WHITE, 255.0))
                            .strong());
                    });
            });
    }
}
