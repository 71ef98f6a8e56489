//! One-time image loading.

use std::path::Path;
use std::sync::Arc;

use crate::entities::Image;
use crate::settings::Settings;

/// Every image the game draws, loaded once and shared read-only.
#[derive(Clone, Debug)]
pub struct Assets {
    pub player: Arc<Image>,
    pub enemy: Arc<Image>,
    pub background: Arc<Image>,
    pub shot: Arc<Image>,
}

impl Assets {
    pub fn load(settings: &Settings) -> Self {
        Assets {
            player: load_image(&settings.asset_path(settings.player_image)),
            enemy: load_image(&settings.asset_path(settings.enemy_image)),
            background: load_image(&settings.asset_path(settings.background_image)),
            shot: load_image(&settings.asset_path(settings.shot_image)),
        }
    }
}

/// Read a text-art image.  A missing, unreadable or empty file is logged and
/// replaced by `Image::placeholder()` so the game keeps running.
pub fn load_image(path: &Path) -> Arc<Image> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let image = Image::from_art(&text);
            if image.cols() == 0 {
                log::warn!("Image {} is empty, using placeholder", path.display());
                return Arc::new(Image::placeholder());
            }
            log::debug!(
                "Loaded {} ({}x{} cells)",
                path.display(),
                image.cols(),
                image.rows()
            );
            Arc::new(image)
        }
        Err(e) => {
            log::warn!("Error loading image {}: {}", path.display(), e);
            Arc::new(Image::placeholder())
        }
    }
}
