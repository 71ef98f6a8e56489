/// Rendering layer — all terminal I/O lives here.
///
/// `compose` paints an immutable view of the game state onto a `Canvas` of
/// terminal cells; `render` translates the canvas into terminal commands.
/// No game logic is performed in either.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    QueueableCommand,
};

use crate::entities::{GameState, Image};
use crate::settings::{CELL_H, CELL_W};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_SKY: Color = Color::DarkBlue;
const C_SCORE: Color = Color::Yellow;
const C_PLAYER: Color = Color::White;
const C_FIREBALL: Color = Color::Red;
const C_ENEMY: Color = Color::Green;

/// The background is tiled this many times side by side.
pub const BACKGROUND_REPEAT: i32 = 5;
/// Vertical offset of the background tiles (world units).
pub const BACKGROUND_Y: i32 = -250;
/// Top-left of the score text (world units).
pub const SCORE_AT: (i32, i32) = (10, 10);

// ── Canvas ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    color: Color::Reset,
};

/// One frame's worth of terminal cells.
#[derive(Clone, Debug)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Canvas {
            cols,
            rows,
            cells: vec![BLANK; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn get(&self, col: i32, row: i32) -> Option<Cell> {
        self.index(col, row).map(|i| self.cells[i])
    }

    /// Text of one row, colours dropped.
    pub fn row_text(&self, row: u16) -> String {
        (0..self.cols as i32)
            .filter_map(|c| self.get(c, row as i32))
            .map(|cell| cell.glyph)
            .collect()
    }

    fn put(&mut self, col: i32, row: i32, glyph: char, color: Color) {
        if let Some(i) = self.index(col, row) {
            self.cells[i] = Cell { glyph, color };
        }
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    /// Paint an image with its top-left at world `(x, y)`, clipped.
    fn blit(&mut self, image: &Image, x: i32, y: i32, color: Color) {
        let (col0, row0) = to_cell(x, y);
        for (c, r, glyph) in image.cells() {
            self.put(col0 + c as i32, row0 + r as i32, glyph, color);
        }
    }

    fn text(&mut self, text: &str, x: i32, y: i32, color: Color) {
        let (col0, row) = to_cell(x, y);
        for (i, glyph) in text.chars().enumerate() {
            self.put(col0 + i as i32, row, glyph, color);
        }
    }
}

/// World units → terminal cell, rounding toward negative infinity so
/// sprites slide smoothly off the left and top edges.
pub fn to_cell(x: i32, y: i32) -> (i32, i32) {
    (x.div_euclid(CELL_W), y.div_euclid(CELL_H))
}

// ── Frame composition ─────────────────────────────────────────────────────────

/// Paint one frame: background, score, player, fireballs, enemies.
pub fn compose(state: &GameState, cols: u16, rows: u16) -> Canvas {
    let mut canvas = Canvas::new(cols, rows);

    let tile = state.background.width();
    for n in 0..BACKGROUND_REPEAT {
        canvas.blit(&state.background, tile * n + state.scroll_offset, BACKGROUND_Y, C_SKY);
    }

    let (sx, sy) = SCORE_AT;
    canvas.text(&format!("Score: {}", state.score), sx, sy, C_SCORE);

    let p = &state.player;
    canvas.blit(&p.image, p.x, p.y, C_PLAYER);

    for fireball in &state.projectiles {
        canvas.blit(&fireball.image, fireball.x, fireball.y, C_FIREBALL);
    }
    for enemy in &state.enemies {
        canvas.blit(&enemy.image, enemy.x, enemy.y, C_ENEMY);
    }

    canvas
}

// ── Terminal output ───────────────────────────────────────────────────────────

/// Write a complete frame.  Every cell is repainted, so no clear is needed.
pub fn render<W: Write>(out: &mut W, canvas: &Canvas) -> std::io::Result<()> {
    for row in 0..canvas.rows {
        out.queue(cursor::MoveTo(0, row))?;
        let mut run = String::new();
        let mut run_color: Option<Color> = None;
        for col in 0..canvas.cols as i32 {
            let cell = canvas.get(col, row as i32).unwrap_or(BLANK);
            if run_color != Some(cell.color) {
                flush_run(out, &mut run, run_color)?;
                run_color = Some(cell.color);
            }
            run.push(cell.glyph);
        }
        flush_run(out, &mut run, run_color)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, canvas.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn flush_run<W: Write>(out: &mut W, run: &mut String, color: Option<Color>) -> std::io::Result<()> {
    if run.is_empty() {
        return Ok(());
    }
    if let Some(color) = color {
        out.queue(style::SetForegroundColor(color))?;
    }
    out.queue(Print(run.as_str()))?;
    run.clear();
    Ok(())
}
