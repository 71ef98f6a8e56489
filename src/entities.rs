/// All game entity types — plain data plus the image bounds they imply.

use std::sync::Arc;

use crate::collision::Rect;
use crate::settings::{CELL_H, CELL_W};

// ── Images ────────────────────────────────────────────────────────────────────

/// A loaded text-art picture.  Each line is one terminal row, each char one
/// column; spaces are transparent.  Read-only once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    rows: Vec<Vec<char>>,
    cols: usize,
}

impl Image {
    /// Parse text art.  Trailing blank lines are dropped; a trailing `\r`
    /// on each line is ignored.
    pub fn from_art(text: &str) -> Self {
        let mut rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();
        while rows.last().is_some_and(|r| r.iter().all(|c| *c == ' ')) {
            rows.pop();
        }
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        Image { rows, cols }
    }

    /// Stand-in for an image that failed to load: a single `?` cell.
    pub fn placeholder() -> Self {
        Image::from_art("?")
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Width in world units.
    pub fn width(&self) -> i32 {
        self.cols as i32 * CELL_W
    }

    /// Height in world units.
    pub fn height(&self) -> i32 {
        self.rows.len() as i32 * CELL_H
    }

    /// Opaque cells as `(col, row, glyph)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, ch)| **ch != ' ')
                .map(move |(c, ch)| (c, r, *ch))
        })
    }
}

// ── Sprites ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Sprite {
    pub image: Arc<Image>,
    pub x: i32,
    pub y: i32,
    /// Carried along but not consulted by the game logic.
    pub active: bool,
}

impl Sprite {
    pub fn new(image: Arc<Image>, x: i32, y: i32) -> Self {
        Sprite {
            image,
            x,
            y,
            active: false,
        }
    }

    /// Bounding box in world units, sized by the image.
    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.image.width(),
            height: self.image.height(),
        }
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so the update step can return a new
/// copy without mutating the original; images are shared, not copied.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Sprite,
    /// Fixed-size pool, recycled on escape or hit.
    pub enemies: Vec<Sprite>,
    /// Fireballs in flight.
    pub projectiles: Vec<Sprite>,
    /// +2 per hit, -1 per escaped enemy.  May go negative.
    pub score: i64,
    /// Horizontal offset of the repeating background.
    pub scroll_offset: i32,
    pub speed: i32,
    pub background: Arc<Image>,
    /// Image given to every new projectile.
    pub shot: Arc<Image>,
}
