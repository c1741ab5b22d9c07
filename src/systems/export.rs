// saves the current frame as a png
// through bevy's screenshot pipeline

use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured, save_to_disk};
use std::path::{Path, PathBuf};

use crate::config::EXPORT_DIR;
use crate::generation::SceneStyle;
use crate::systems::ui::BannerEvent;

// export event
#[derive(Event)]
pub struct ExportEvent {
    pub path: PathBuf,
}

impl ExportEvent {
    pub fn for_scene(style: SceneStyle, seed: u64) -> Self {
        Self {
            path: screenshot_path(Path::new(EXPORT_DIR), style, seed),
        }
    }
}

// one file per (style, seed), re-exporting overwrites
pub fn screenshot_path(dir: &Path, style: SceneStyle, seed: u64) -> PathBuf {
    let stem = style.name().to_lowercase().replace(' ', "_");
    dir.join(format!("{}_{}.png", stem, seed))
}

fn prepare_dir(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// handle export events
pub fn handle_export(mut commands: Commands, mut events: EventReader<ExportEvent>) {
    for event in events.read() {
        match prepare_dir(&event.path) {
            Ok(()) => {
                info!("exporting screenshot to {}", event.path.display());
                let shown = event.path.display().to_string();
                // the banner waits for the frame to actually be captured
                commands
                    .spawn(Screenshot::primary_window())
                    .observe(save_to_disk(event.path.clone()))
                    .observe(move |_: Trigger<ScreenshotCaptured>, mut banners: EventWriter<BannerEvent>| {
                        banners.write(BannerEvent::Exported(shown.clone()));
                    });
            }
            Err(e) => {
                error!("export failed for {}: {}", event.path.display(), e);
            }
        }
    }
}
