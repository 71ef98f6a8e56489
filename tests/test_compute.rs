use std::error::Error;
use std::sync::Arc;

use farmer_arcade::assets::Assets;
use farmer_arcade::audio::{AudioError, Cue, CuePlayer};
use farmer_arcade::compute::*;
use farmer_arcade::entities::*;
use farmer_arcade::input::Controls;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rodio::source::SeekError;

fn art(text: &str) -> Arc<Image> {
    Arc::new(Image::from_art(text))
}

/// 50 x 50 world units.
fn enemy_image() -> Arc<Image> {
    art("#####\n#####")
}

fn make_state() -> GameState {
    let enemy = enemy_image();
    GameState {
        player: Sprite {
            active: true,
            ..Sprite::new(art("@@"), 0, 300)
        },
        enemies: vec![
            Sprite::new(Arc::clone(&enemy), 500, 0),
            Sprite::new(Arc::clone(&enemy), 500, 200),
            Sprite::new(enemy, 500, 400),
        ],
        projectiles: Vec::new(),
        score: 0,
        scroll_offset: 0,
        speed: 0,
        // 60 columns → 600 units wide
        background: art(&".".repeat(60)),
        // 20 x 25 units
        shot: art("~~"),
    }
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle() -> Controls {
    Controls::default()
}

#[derive(Default)]
struct Recorder {
    played: Vec<Cue>,
}

impl CuePlayer for Recorder {
    fn replay(&mut self, cue: Cue) -> Result<(), AudioError> {
        self.played.push(cue);
        Ok(())
    }
}

struct Broken;

impl CuePlayer for Broken {
    fn replay(&mut self, cue: Cue) -> Result<(), AudioError> {
        Err(AudioError::Rewind {
            cue,
            source: SeekError::NotSupported {
                underlying_source: "test clip",
            },
        })
    }
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_layout() {
    let assets = Assets {
        player: art("@"),
        enemy: enemy_image(),
        background: art("."),
        shot: art("~"),
    };
    let s = init_state(&assets, &mut seeded_rng());
    assert_eq!((s.player.x, s.player.y), (0, 300));
    assert!(s.player.active);
    assert_eq!(s.enemies.len(), ENEMY_COUNT);
    for e in &s.enemies {
        assert_eq!(e.x, 1000);
        assert!((0..750).contains(&e.y));
        assert!(Arc::ptr_eq(&e.image, &assets.enemy));
    }
    assert!(s.projectiles.is_empty());
    assert_eq!(s.score, 0);
    assert_eq!(s.scroll_offset, 0);
}

// ── scroll_background ─────────────────────────────────────────────────────────

#[test]
fn scroll_moves_left() {
    let s = scroll_background(&make_state());
    assert_eq!(s.scroll_offset, -4);
}

#[test]
fn scroll_wraps_at_twice_background_width() {
    let mut s = make_state(); // background 600 wide → wraps at 1200
    s.scroll_offset = -1196;
    assert_eq!(scroll_background(&s).scroll_offset, 0);
    s.scroll_offset = -1198;
    assert_eq!(scroll_background(&s).scroll_offset, -2);
}

#[test]
fn scroll_with_empty_background_does_not_divide_by_zero() {
    let mut s = make_state();
    s.background = art("");
    assert_eq!(scroll_background(&s).scroll_offset, -4);
}

// ── advance_enemies ───────────────────────────────────────────────────────────

#[test]
fn enemies_step_left() {
    let s = advance_enemies(&make_state(), &mut seeded_rng());
    assert!(s.enemies.iter().all(|e| e.x == 496));
    assert_eq!(s.score, 0);
}

#[test]
fn enemy_at_escape_line_is_kept() {
    let mut s = make_state();
    s.enemies[0].x = -96; // lands exactly on -100
    let s2 = advance_enemies(&s, &mut seeded_rng());
    assert_eq!(s2.enemies[0].x, -100);
    assert_eq!(s2.score, 0);
}

#[test]
fn escaped_enemy_respawns_right_and_costs_a_point() {
    let mut s = make_state();
    s.enemies[1].x = -150;
    let s2 = advance_enemies(&s, &mut seeded_rng());
    assert_eq!(s2.enemies[1].x, 1000);
    assert!((0..750).contains(&s2.enemies[1].y));
    assert_eq!(s2.score, -1);
    assert_eq!(s2.enemies.len(), 3);
}

#[test]
fn several_escapes_in_one_frame_each_cost_a_point() {
    let mut s = make_state();
    s.score = 5;
    for e in s.enemies.iter_mut() {
        e.x = -98;
    }
    let s2 = advance_enemies(&s, &mut seeded_rng());
    assert_eq!(s2.score, 2);
    assert!(s2.enemies.iter().all(|e| e.x == 1000));
}

#[test]
fn respawn_height_is_reproducible_with_same_seed() {
    let mut s = make_state();
    s.enemies[0].x = -200;
    let a = advance_enemies(&s, &mut StdRng::seed_from_u64(7));
    let b = advance_enemies(&s, &mut StdRng::seed_from_u64(7));
    assert_eq!(a.enemies[0].y, b.enemies[0].y);
}

// ── steer_player ──────────────────────────────────────────────────────────────

#[test]
fn up_moves_player_up_by_five() {
    let c = Controls { up: true, ..idle() };
    let s = steer_player(&make_state(), &c);
    assert_eq!(s.player.y, 295);
    assert_eq!(s.speed, 2);
}

#[test]
fn down_moves_player_down_by_five() {
    let c = Controls { down: true, ..idle() };
    assert_eq!(steer_player(&make_state(), &c).player.y, 305);
}

#[test]
fn up_and_down_together_cancel() {
    let c = Controls {
        up: true,
        down: true,
        ..idle()
    };
    let s = steer_player(&make_state(), &c);
    assert_eq!(s.player.y, 300);
    assert_eq!(s.player.x, 0);
}

#[test]
fn player_is_not_clamped() {
    let mut s = make_state();
    s.player.y = 0;
    let c = Controls { up: true, ..idle() };
    assert_eq!(steer_player(&s, &c).player.y, -5);
}

// ── cast_fireball ─────────────────────────────────────────────────────────────

#[test]
fn fireball_spawns_at_staff() {
    let s = make_state();
    let s2 = cast_fireball(&s);
    assert_eq!(s2.projectiles.len(), 1);
    let f = &s2.projectiles[0];
    assert_eq!((f.x, f.y), (20, 291));
    assert!(Arc::ptr_eq(&f.image, &s.shot));
}

#[test]
fn fireballs_are_not_capped() {
    let mut s = make_state();
    for _ in 0..50 {
        s = cast_fireball(&s);
    }
    assert_eq!(s.projectiles.len(), 50);
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_fire_spawns_moves_and_plays_cue() {
    let mut cues = Recorder::default();
    let c = Controls { fire: true, ..idle() };
    let s = tick(&make_state(), &c, &mut seeded_rng(), &mut cues).unwrap();
    assert_eq!(s.projectiles.len(), 1);
    assert_eq!(s.projectiles[0].x, 25); // spawned at 20, then +5
    assert_eq!(cues.played, vec![Cue::Fire]);
}

#[test]
fn tick_without_fire_spawns_nothing() {
    let mut cues = Recorder::default();
    let s = tick(&make_state(), &idle(), &mut seeded_rng(), &mut cues).unwrap();
    assert!(s.projectiles.is_empty());
    assert!(cues.played.is_empty());
}

#[test]
fn tick_does_not_mutate_original() {
    let s = make_state();
    let c = Controls {
        up: true,
        fire: true,
        ..idle()
    };
    let _ = tick(&s, &c, &mut seeded_rng(), &mut Recorder::default()).unwrap();
    assert_eq!(s.player.y, 300);
    assert_eq!(s.enemies[0].x, 500);
    assert!(s.projectiles.is_empty());
    assert_eq!(s.scroll_offset, 0);
}

#[test]
fn hit_scores_two_and_removes_fireball() {
    let mut s = make_state();
    s.enemies = vec![Sprite::new(enemy_image(), 50, 100)];
    s.projectiles = vec![Sprite::new(Arc::clone(&s.shot), 50, 100)];

    let mut cues = Recorder::default();
    let s2 = tick(&s, &idle(), &mut seeded_rng(), &mut cues).unwrap();

    assert_eq!(s2.score, 2);
    assert!(s2.projectiles.is_empty());
    assert_eq!(s2.enemies[0].x, 1000);
    assert!((0..700).contains(&s2.enemies[0].y));
    assert_eq!(cues.played, vec![Cue::Hit]);
}

#[test]
fn fireball_hitting_two_enemies_scores_both_and_is_removed_once() {
    let mut s = make_state();
    s.enemies[0].x = 300;
    s.enemies[0].y = 100;
    s.enemies[1].x = 310;
    s.enemies[1].y = 100;
    s.projectiles = vec![
        Sprite::new(Arc::clone(&s.shot), 300, 100),
        Sprite::new(Arc::clone(&s.shot), 0, 700),
    ];

    let mut cues = Recorder::default();
    let s2 = tick(&s, &idle(), &mut seeded_rng(), &mut cues).unwrap();

    assert_eq!(s2.score, 4);
    assert_eq!(s2.enemies[0].x, 1000);
    assert_eq!(s2.enemies[1].x, 1000);
    assert_eq!(s2.projectiles.len(), 1);
    assert_eq!((s2.projectiles[0].x, s2.projectiles[0].y), (5, 700));
    assert_eq!(cues.played, vec![Cue::Hit, Cue::Hit]);
}

#[test]
fn removal_keeps_the_right_survivors() {
    let mut s = make_state();
    s.projectiles = vec![
        Sprite::new(Arc::clone(&s.shot), 500, 0),
        Sprite::new(Arc::clone(&s.shot), 0, 600),
        Sprite::new(Arc::clone(&s.shot), 500, 400),
        Sprite::new(Arc::clone(&s.shot), 100, 650),
    ];

    let s2 = tick(&s, &idle(), &mut seeded_rng(), &mut Recorder::default()).unwrap();

    assert_eq!(s2.score, 4);
    let left: Vec<(i32, i32)> = s2.projectiles.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(left, vec![(5, 600), (105, 650)]);
    assert_eq!(s2.enemies[1].x, 496); // untouched
}

#[test]
fn touching_edges_do_not_hit() {
    let mut s = make_state();
    s.enemies = vec![Sprite::new(enemy_image(), 500, 100)];
    // After the tick the enemy is at 496 and the fireball spans 476..496
    s.projectiles = vec![Sprite::new(Arc::clone(&s.shot), 471, 100)];
    let s2 = tick(&s, &idle(), &mut seeded_rng(), &mut Recorder::default()).unwrap();
    assert_eq!(s2.score, 0);
    assert_eq!(s2.projectiles.len(), 1);
}

#[test]
fn escape_during_tick_costs_a_point() {
    let mut s = make_state();
    s.enemies[2].x = -97;
    let s2 = tick(&s, &idle(), &mut seeded_rng(), &mut Recorder::default()).unwrap();
    assert_eq!(s2.enemies[2].x, 1000);
    assert_eq!(s2.score, -1);
}

#[test]
fn enemies_stay_in_range_over_many_frames() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    let mut cues = Recorder::default();
    for frame in 0..1000 {
        let c = Controls {
            fire: frame % 25 == 0,
            ..idle()
        };
        s = tick(&s, &c, &mut rng, &mut cues).unwrap();
        assert_eq!(s.enemies.len(), ENEMY_COUNT);
        for e in &s.enemies {
            assert!(e.x >= -100 || e.x == 1000, "enemy x {} at frame {}", e.x, frame);
        }
    }
}

#[test]
fn far_fireballs_are_culled() {
    let mut s = make_state(); // enemies 50 wide → reach 1050
    s.projectiles = vec![
        Sprite::new(Arc::clone(&s.shot), 1046, 600),
        Sprite::new(Arc::clone(&s.shot), 1040, 600),
    ];
    let s2 = tick(&s, &idle(), &mut seeded_rng(), &mut Recorder::default()).unwrap();
    assert_eq!(s2.projectiles.len(), 1);
    assert_eq!(s2.projectiles[0].x, 1045);
}

// ── cue failures ──────────────────────────────────────────────────────────────

#[test]
fn failing_fire_cue_aborts_tick() {
    let c = Controls { fire: true, ..idle() };
    let err = tick(&make_state(), &c, &mut seeded_rng(), &mut Broken).unwrap_err();
    assert!(err.to_string().contains("Fire"));
}

#[test]
fn cue_error_keeps_the_playback_cause() {
    let err = Broken.replay(Cue::Hit).unwrap_err();
    let cause = err.source().expect("rewind error carries its cause");
    assert!(cause.to_string().contains("test clip"));
}

#[test]
fn failing_hit_cue_aborts_tick() {
    let mut s = make_state();
    s.projectiles = vec![Sprite::new(Arc::clone(&s.shot), 500, 0)];
    assert!(resolve_hits(&s, &mut seeded_rng(), &mut Broken).is_err());
    assert!(tick(&s, &idle(), &mut seeded_rng(), &mut Broken).is_err());
}

#[test]
fn no_hit_means_no_cue_even_when_broken() {
    let s = make_state();
    assert!(tick(&s, &idle(), &mut seeded_rng(), &mut Broken).is_ok());
}
