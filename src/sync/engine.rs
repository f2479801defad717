//! Collaborator interfaces of the synchronizer

use crate::config::Instrument;
use crate::error::Result;
use crate::pitch::Pitch;
use crate::score::NotePair;
use serde::Serialize;

/// Identifies one conversion. Load completions carry the generation they
/// were started for; completions from an older generation are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// Identifies one playback run. Every stop or conversion starts a new epoch,
/// so note events scheduled under an old epoch can no longer land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

/// Callbacks from the playback engine, delivered by the host in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PlayerEvent {
    ArtifactLoaded { generation: Generation },
    NoteOn { epoch: Epoch, pitch: Pitch, velocity: u8 },
    EndOfTimeline { epoch: Epoch },
}

/// Loads instrument samples. Completion is reported back through
/// `Session::instrument_loaded` with the same generation.
pub trait AudioEngine {
    fn load(&mut self, instrument: Instrument, generation: Generation);
}

/// Schedules an encoded timeline and reports [`PlayerEvent`]s
pub trait PlaybackEngine {
    /// Start loading an artifact; `ArtifactLoaded` follows on success
    fn load_artifact(&mut self, bytes: &[u8], generation: Generation) -> Result<()>;

    /// Start from the current position; events are stamped with `epoch`
    fn play(&mut self, epoch: Epoch);

    fn pause(&mut self);

    /// Halt and rewind to the start
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Position as a percentage of the song, 0.0 to 100.0
    fn elapsed_percent(&self) -> f64;

    fn total_duration_secs(&self) -> f64;
}

/// Everything the synchronizer changes outside itself
pub trait PlaybackSink {
    fn highlight_score_note(&mut self, pair: &NotePair);

    /// Mark the glyph at `position` of the text line
    fn highlight_letter(&mut self, position: usize);

    /// Move the playhead to `fraction` (0.0 to 1.0) of the song
    fn move_playhead(&mut self, fraction: f64);

    fn trigger_audio(&mut self, note: &str, duration_secs: f64);

    /// Remove all score and text marks and park the playhead at the start
    fn clear_highlights(&mut self);
}
