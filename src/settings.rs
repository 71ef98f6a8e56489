//! Window, world and asset settings.
//!
//! Everything is fixed at compile time: the game takes no flags and reads no
//! config file. `RUST_LOG` only tunes logging.

use std::path::PathBuf;
use std::time::Duration;

/// World units covered by one terminal column.
pub const CELL_W: i32 = 10;
/// World units covered by one terminal row.
pub const CELL_H: i32 = 25;

#[derive(Debug, Clone)]
pub struct Settings {
    pub title: &'static str,
    /// World width in world units (pixels of the original window).
    pub world_width: i32,
    pub world_height: i32,
    /// Duration of one update+draw cycle (≈60 FPS).
    pub frame: Duration,
    pub asset_dir: PathBuf,

    // === Asset file names ===
    pub player_image: &'static str,
    pub enemy_image: &'static str,
    pub background_image: &'static str,
    pub shot_image: &'static str,
    pub fire_sound: &'static str,
    pub hit_sound: &'static str,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "The Farmer Who Was Summoned To Another World With an OP Skill",
            world_width: 1000,
            world_height: 750,
            frame: Duration::from_millis(16),
            asset_dir: PathBuf::from("assets"),
            player_image: "wiz.txt",
            enemy_image: "enemy.txt",
            background_image: "night.txt",
            shot_image: "fire.txt",
            fire_sound: "fireball.wav",
            hit_sound: "impact.wav",
        }
    }
}

impl Settings {
    /// Terminal size (columns, rows) that shows the whole world.
    pub fn terminal_cells(&self) -> (u16, u16) {
        (
            (self.world_width / CELL_W) as u16,
            (self.world_height / CELL_H) as u16,
        )
    }

    pub fn asset_path(&self, name: &str) -> PathBuf {
        self.asset_dir.join(name)
    }
}
