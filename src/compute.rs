/// Game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, an RNG handle or cue player) and returns
/// a brand-new `GameState`.  Side effects are limited to the injected RNG
/// and the sound cues.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;

use crate::assets::Assets;
use crate::audio::{AudioError, Cue, CuePlayer};
use crate::collision::overlaps;
use crate::entities::{GameState, Sprite};
use crate::input::Controls;

// ── Tuning ────────────────────────────────────────────────────────────────────

pub const ENEMY_COUNT: usize = 3;
/// Enemies move this far left every frame.
pub const ENEMY_STEP: i32 = 4;
/// An enemy whose x drops below this has escaped.
pub const ENEMY_ESCAPE_X: i32 = -100;
/// Where recycled enemies re-enter, just off the right edge.
pub const ENEMY_RESET_X: i32 = 1000;
/// Respawn y range after an escape.
pub const ESCAPE_RESPAWN_Y: i32 = 750;
/// Respawn y range after a hit.
pub const HIT_RESPAWN_Y: i32 = 700;

pub const SCROLL_STEP: i32 = 4;

pub const PLAYER_START: (i32, i32) = (0, 300);
/// Base value the movement deltas are derived from.
pub const PLAYER_SPEED: i32 = 2;

/// Fireballs spawn at the tip of the wizard's staff.
pub const STAFF_OFFSET: (i32, i32) = (20, -9);
pub const PROJECTILE_STEP: i32 = 5;

pub const HIT_REWARD: i64 = 2;
pub const ESCAPE_PENALTY: i64 = 1;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the opening state: player on the left, enemies queued off the right
/// edge at random heights.
pub fn init_state(assets: &Assets, rng: &mut impl Rng) -> GameState {
    let (px, py) = PLAYER_START;
    let enemies = (0..ENEMY_COUNT)
        .map(|_| {
            Sprite::new(
                Arc::clone(&assets.enemy),
                ENEMY_RESET_X,
                rng.gen_range(0..ESCAPE_RESPAWN_Y),
            )
        })
        .collect();
    GameState {
        player: Sprite {
            active: true,
            ..Sprite::new(Arc::clone(&assets.player), px, py)
        },
        enemies,
        projectiles: Vec::new(),
        score: 0,
        scroll_offset: 0,
        speed: 0,
        background: Arc::clone(&assets.background),
        shot: Arc::clone(&assets.shot),
    }
}

// ── Per-frame steps (pure apart from the injected RNG) ──────────────────────

/// Shift the background left, wrapping at twice its width so the tiled draw
/// stays seamless.
pub fn scroll_background(state: &GameState) -> GameState {
    let max_x = state.background.width() * 2;
    let shifted = state.scroll_offset - SCROLL_STEP;
    GameState {
        scroll_offset: shifted.checked_rem(max_x).unwrap_or(shifted),
        ..state.clone()
    }
}

/// Move every enemy left.  Escaped enemies re-enter on the right at a random
/// height and cost one point each.
pub fn advance_enemies(state: &GameState, rng: &mut impl Rng) -> GameState {
    let mut escaped: i64 = 0;
    let enemies = state
        .enemies
        .iter()
        .map(|e| {
            let x = e.x - ENEMY_STEP;
            if x < ENEMY_ESCAPE_X {
                escaped += 1;
                Sprite {
                    x: ENEMY_RESET_X,
                    y: rng.gen_range(0..ESCAPE_RESPAWN_Y),
                    ..e.clone()
                }
            } else {
                Sprite { x, ..e.clone() }
            }
        })
        .collect();
    GameState {
        enemies,
        score: state.score - escaped * ESCAPE_PENALTY,
        ..state.clone()
    }
}

/// Apply held movement keys.  Up and down are independent; holding both
/// nets a zero move.  The player is not clamped to the screen.
pub fn steer_player(state: &GameState, controls: &Controls) -> GameState {
    let speed = PLAYER_SPEED;
    let mut y = state.player.y;
    if controls.up {
        y += speed - 7;
    }
    if controls.down {
        y += speed + 3;
    }
    GameState {
        player: Sprite {
            y,
            ..state.player.clone()
        },
        speed,
        ..state.clone()
    }
}

/// Launch a fireball from the staff.  No cap on fireballs in flight.
pub fn cast_fireball(state: &GameState) -> GameState {
    let (dx, dy) = STAFF_OFFSET;
    let mut projectiles = state.projectiles.clone();
    projectiles.push(Sprite::new(
        Arc::clone(&state.shot),
        state.player.x + dx,
        state.player.y + dy,
    ));
    GameState {
        projectiles,
        ..state.clone()
    }
}

pub fn advance_projectiles(state: &GameState) -> GameState {
    let projectiles = state
        .projectiles
        .iter()
        .map(|p| Sprite {
            x: p.x + PROJECTILE_STEP,
            ..p.clone()
        })
        .collect();
    GameState {
        projectiles,
        ..state.clone()
    }
}

/// Test every fireball against every enemy.  Each hit respawns the enemy,
/// plays the hit cue and scores; a fireball that hits anything is removed
/// once, however many enemies it struck this frame.
pub fn resolve_hits(
    state: &GameState,
    rng: &mut impl Rng,
    audio: &mut dyn CuePlayer,
) -> Result<GameState, AudioError> {
    let mut enemies = state.enemies.clone();
    let mut spent: BTreeSet<usize> = BTreeSet::new();
    let mut score = state.score;

    for (pi, projectile) in state.projectiles.iter().enumerate() {
        let shot = projectile.bounds();
        for enemy in enemies.iter_mut() {
            if overlaps(&shot, &enemy.bounds()) {
                spent.insert(pi);
                enemy.x = ENEMY_RESET_X;
                enemy.y = rng.gen_range(0..HIT_RESPAWN_Y);
                audio.replay(Cue::Hit)?;
                score += HIT_REWARD;
                log::debug!("Fireball {} hit, score {}", pi, score);
            }
        }
    }

    // Highest index first keeps the lower indices valid.
    let mut projectiles = state.projectiles.clone();
    for &index in spent.iter().rev() {
        projectiles.remove(index);
    }

    Ok(GameState {
        enemies,
        projectiles,
        score,
        ..state.clone()
    })
}

/// Drop fireballs that have flown past the furthest point any enemy can
/// occupy; they can never hit anything again.
pub fn cull_projectiles(state: &GameState) -> GameState {
    let reach = ENEMY_RESET_X
        + state
            .enemies
            .iter()
            .map(|e| e.image.width())
            .max()
            .unwrap_or(0);
    GameState {
        projectiles: state
            .projectiles
            .iter()
            .filter(|p| p.x < reach)
            .cloned()
            .collect(),
        ..state.clone()
    }
}

// ── Per-frame tick ──────────────────────────────────────────────────────────

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (tests use a seeded RNG).  A failing cue
/// aborts the frame and is returned to the caller.
pub fn tick(
    state: &GameState,
    controls: &Controls,
    rng: &mut impl Rng,
    audio: &mut dyn CuePlayer,
) -> Result<GameState, AudioError> {
    // ── 1. Background ────────────────────────────────────────────────────────
    let state = scroll_background(state);

    // ── 2. Enemies ───────────────────────────────────────────────────────────
    let state = advance_enemies(&state, rng);

    // ── 3. Player movement ───────────────────────────────────────────────────
    let state = steer_player(&state, controls);

    // ── 4. Fire (edge-triggered) ─────────────────────────────────────────────
    let state = if controls.fire {
        let state = cast_fireball(&state);
        audio.replay(Cue::Fire)?;
        state
    } else {
        state
    };

    // ── 5. Fireballs ─────────────────────────────────────────────────────────
    let state = advance_projectiles(&state);

    // ── 6–7. Collisions and removal ──────────────────────────────────────────
    let state = resolve_hits(&state, rng, audio)?;

    Ok(cull_projectiles(&state))
}
