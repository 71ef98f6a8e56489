//! Fire / hit sound cues.
//!
//! The update step only sees the `CuePlayer` trait.  `RodioCues` plays the
//! loaded WAV clips; `Silent` stands in when no output device is available.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::source::SeekError;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::settings::Settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// A fireball leaves the staff.
    Fire,
    /// A fireball strikes an enemy.
    Hit,
}

#[derive(Debug)]
pub enum AudioError {
    /// Restarting a cue that is still playing failed.
    Rewind { cue: Cue, source: SeekError },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Rewind { cue, .. } => write!(f, "could not rewind {:?} cue", cue),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioError::Rewind { source, .. } => Some(source),
        }
    }
}

/// Restart-and-play for the two cues.
pub trait CuePlayer {
    fn replay(&mut self, cue: Cue) -> Result<(), AudioError>;
}

/// Plays nothing.  Used when no audio device could be opened.
#[derive(Debug, Default)]
pub struct Silent;

impl CuePlayer for Silent {
    fn replay(&mut self, _cue: Cue) -> Result<(), AudioError> {
        Ok(())
    }
}

// ── Clips ─────────────────────────────────────────────────────────────────────

/// A fully decoded sound, kept in memory so replays never touch the disk.
#[derive(Clone, Debug)]
pub struct Clip {
    channels: u16,
    sample_rate: u32,
    samples: Arc<[f32]>,
}

impl Clip {
    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn buffer(&self) -> SamplesBuffer {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.to_vec())
    }
}

/// Decode a sound file.  Failures are logged and yield `None`; the cue then
/// stays silent for the rest of the session.
pub fn load_clip(path: &Path) -> Option<Clip> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Error loading sound {}: {}", path.display(), e);
            return None;
        }
    };
    let decoder = match Decoder::new(BufReader::new(file)) {
        Ok(decoder) => decoder,
        Err(e) => {
            log::warn!("Error interpreting sound file {}: {}", path.display(), e);
            return None;
        }
    };
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.collect();
    log::debug!(
        "Loaded {} ({} samples, {} ch @ {} Hz)",
        path.display(),
        samples.len(),
        channels,
        sample_rate
    );
    Some(Clip {
        channels,
        sample_rate,
        samples: samples.into(),
    })
}

// ── rodio playback ────────────────────────────────────────────────────────────

/// One sink per cue, so replaying a cue restarts it instead of stacking.
struct Channel {
    cue: Cue,
    clip: Option<Clip>,
    sink: Sink,
}

impl Channel {
    fn replay(&mut self) -> Result<(), AudioError> {
        let Some(clip) = &self.clip else {
            return Ok(());
        };
        if self.sink.empty() {
            self.sink.append(clip.buffer());
        } else {
            self.sink
                .try_seek(Duration::ZERO)
                .map_err(|source| AudioError::Rewind {
                    cue: self.cue,
                    source,
                })?;
        }
        self.sink.play();
        Ok(())
    }
}

pub struct RodioCues {
    // Dropping the stream stops all playback.
    _stream: OutputStream,
    fire: Channel,
    hit: Channel,
}

impl RodioCues {
    /// Open the default output device and load both cues.
    pub fn open(settings: &Settings) -> Result<Self, rodio::StreamError> {
        let stream = OutputStreamBuilder::open_default_stream()?;
        let fire = Channel {
            cue: Cue::Fire,
            clip: load_clip(&settings.asset_path(settings.fire_sound)),
            sink: Sink::connect_new(stream.mixer()),
        };
        let hit = Channel {
            cue: Cue::Hit,
            clip: load_clip(&settings.asset_path(settings.hit_sound)),
            sink: Sink::connect_new(stream.mixer()),
        };
        Ok(RodioCues {
            _stream: stream,
            fire,
            hit,
        })
    }
}

impl CuePlayer for RodioCues {
    fn replay(&mut self, cue: Cue) -> Result<(), AudioError> {
        match cue {
            Cue::Fire => self.fire.replay(),
            Cue::Hit => self.hit.replay(),
        }
    }
}

/// Real cues if an output device is available, otherwise silence.
pub fn open_cues(settings: &Settings) -> Box<dyn CuePlayer> {
    match RodioCues::open(settings) {
        Ok(cues) => Box::new(cues),
        Err(e) => {
            log::warn!("No audio output ({}), continuing without sound", e);
            Box::new(Silent)
        }
    }
}
