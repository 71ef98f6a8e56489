//! The Farmer Who Was Summoned To Another World With an OP Skill.
//!
//! A side-scrolling terminal shooter:
//! - `entities`: pure data (images, sprites, game state)
//! - `collision`: axis-aligned bounding-box overlap
//! - `compute`: the per-frame update step
//! - `display`: frame composition and terminal output
//! - `input`: keyboard events to per-frame controls
//! - `audio`: fire / hit sound cues
//! - `assets`: one-time image loading
//! - `settings`: window, world and asset constants

pub mod assets;
pub mod audio;
pub mod collision;
pub mod compute;
pub mod display;
pub mod entities;
pub mod input;
pub mod settings;

pub use settings::Settings;
