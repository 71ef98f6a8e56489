//! Keyboard events → per-frame controls.
//!
//! Instead of acting on each key event individually, `KeyTracker` records
//! the frame number of the last press/repeat event for every key.  Each
//! frame the game asks which keys are down and whether Space went down this
//! frame.
//!
//! How "down" is decided depends on what the terminal reports:
//! * `KeyReports::WithRelease` (kitty keyboard protocol): a key is down from
//!   its `Press` until its `Release`, with no expiry.  Space fires on every
//!   press that is not already down.
//! * `KeyReports::PressOnly` (classic terminals): OS key-repeat shows up as
//!   repeated presses and releases never arrive.  Keys expire after
//!   `HOLD_WINDOW` frames of silence, and Space only fires again once it has
//!   been silent for `FIRE_REARM` frames, past the OS initial repeat delay.
//!   Two real taps closer together than that register as one.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Press-only terminals: a key counts as down if seen within this many
/// frames (≈130 ms @ 60 FPS).
pub const HOLD_WINDOW: u64 = 8;

/// Press-only terminals: frames of silence before a Space press fires again
/// (≈600 ms @ 60 FPS).
pub const FIRE_REARM: u64 = 36;

/// Which key events the terminal delivers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyReports {
    /// Press, repeat and release events.
    WithRelease,
    /// Presses only; held keys arrive as repeated presses.
    #[default]
    PressOnly,
}

/// What the update step reads from the keyboard for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    /// Edge-triggered: true only on the frame Space went down.
    pub fire: bool,
}

#[derive(Debug, Default)]
pub struct KeyTracker {
    reports: KeyReports,
    /// Each down key → the frame it was last seen (press or repeat).
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    fire_edge: bool,
    quit: bool,
}

impl KeyTracker {
    pub fn new(reports: KeyReports) -> Self {
        KeyTracker {
            reports,
            ..Self::default()
        }
    }

    pub fn reports(&self) -> KeyReports {
        self.reports
    }

    /// Start a new frame; clears the fire edge of the previous one.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.fire_edge = false;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn handle(&mut self, event: &KeyEvent) {
        let code = normalize(event.code);
        match event.kind {
            KeyEventKind::Press => {
                if code == KeyCode::Char(' ') && !self.is_down(&code, FIRE_REARM) {
                    self.fire_edge = true;
                }
                self.key_frame.insert(code, self.frame);
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
                    KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true
                    }
                    _ => {}
                }
            }
            KeyEventKind::Repeat => {
                self.key_frame.insert(code, self.frame);
            }
            KeyEventKind::Release => {
                self.key_frame.remove(&code);
            }
        }
    }

    pub fn controls(&self) -> Controls {
        let held = |key: KeyCode| self.is_down(&key, HOLD_WINDOW);
        Controls {
            up: held(KeyCode::Char('w')) || held(KeyCode::Up),
            down: held(KeyCode::Char('s')) || held(KeyCode::Down),
            fire: self.fire_edge,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// `window` only applies to press-only terminals, where silence is the
    /// sole sign of a release.
    fn is_down(&self, key: &KeyCode, window: u64) -> bool {
        match (self.reports, self.key_frame.get(key)) {
            (_, None) => false,
            (KeyReports::WithRelease, Some(_)) => true,
            (KeyReports::PressOnly, Some(&last)) => self.frame.saturating_sub(last) <= window,
        }
    }
}

/// Fold shifted letters onto their lowercase key.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
