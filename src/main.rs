use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;

use farmer_arcade::assets::Assets;
use farmer_arcade::audio::{open_cues, CuePlayer};
use farmer_arcade::compute::{init_state, tick};
use farmer_arcade::display;
use farmer_arcade::entities::GameState;
use farmer_arcade::input::{KeyReports, KeyTracker};
use farmer_arcade::Settings;

// ── Game loop ─────────────────────────────────────────────────────────────────

/// One `tick` then one draw per frame until the player quits or a sound cue
/// fails.
fn game_loop<W: Write>(
    out: &mut W,
    settings: &Settings,
    mut state: GameState,
    cues: &mut dyn CuePlayer,
    reports: KeyReports,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    let mut rng = thread_rng();
    let mut keys = KeyTracker::new(reports);
    let mut size = terminal::size()?;

    loop {
        let frame_start = Instant::now();
        keys.begin_frame();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(key) => keys.handle(&key),
                Event::Resize(cols, rows) => {
                    size = (cols, rows);
                    out.execute(terminal::Clear(terminal::ClearType::All))?;
                }
                _ => {}
            }
        }
        if keys.quit_requested() {
            log::info!("Quit at frame {}, score {}", keys.frame(), state.score);
            return Ok(());
        }

        state = tick(&state, &keys.controls(), &mut rng, cues)?;

        let canvas = display::compose(&state, size.0, size.1);
        display::render(out, &canvas)?;

        let elapsed = frame_start.elapsed();
        if elapsed < settings.frame {
            thread::sleep(settings.frame - elapsed);
        }
    }
}

// ── Terminal setup ────────────────────────────────────────────────────────────

/// Forward every terminal event over a channel.  The reader blocks, so it
/// gets its own thread; it stops once the game drops the receiver.
fn spawn_event_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    rx
}

/// Switch the terminal into game mode and play.  `reports` records whether
/// release reporting was pushed, so the caller can pop it again.
fn run<W: Write>(
    out: &mut W,
    settings: &Settings,
    state: GameState,
    cues: &mut dyn CuePlayer,
    reports: &mut KeyReports,
) -> anyhow::Result<()> {
    let (cols, rows) = settings.terminal_cells();
    out.execute(terminal::SetTitle(settings.title))?;
    // Many terminals ignore resize requests
    let _ = out.execute(terminal::SetSize(cols, rows));
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Must be asked before the reader thread starts consuming events.
    if terminal::supports_keyboard_enhancement().unwrap_or(false) {
        out.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
        *reports = KeyReports::WithRelease;
    }
    log::info!("Key reports: {:?}", reports);

    let rx = spawn_event_reader();
    game_loop(out, settings, state, cues, *reports, &rx)
}

/// Undo `run`'s terminal changes.  Safe to call after a partial setup.
fn restore<W: Write>(out: &mut W, reports: KeyReports) {
    if reports == KeyReports::WithRelease {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::default();

    // Load before leaving the normal screen so warnings stay readable.
    let assets = Assets::load(&settings);
    let mut cues = open_cues(&settings);
    let state = init_state(&assets, &mut thread_rng());

    let mut out = BufWriter::new(stdout());
    let mut reports = KeyReports::PressOnly;

    log::info!("{} starting", settings.title);
    let result = run(&mut out, &settings, state, cues.as_mut(), &mut reports);
    restore(&mut out, reports);

    if let Err(e) = &result {
        log::error!("Failed to run game: {:#}", e);
    }
    result.context("failed to run game")
}
