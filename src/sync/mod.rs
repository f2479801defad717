//! # Playback Synchronizer
//!
//! Keeps audio, the score cursor, the text cursor and the playhead in step
//! while a timeline plays.
//!
//! ## States
//! ```text
//!            play                pause
//! Stopped ----------> Playing <---------> Paused
//!    ^                  |        play       |
//!    |     stop / end   |                   |
//!    +------------------+-------------------+
//! ```
//! `load` (a new conversion) always lands in `Stopped` with fresh cursors.
//!
//! ## Readiness
//! `play` needs two completions for the current generation: the player has
//! loaded the artifact and the instrument has loaded its samples. Either one
//! missing makes `play` a reported no-op ([`PlaybackWarning`]).
//!
//! ## Note-on
//! Each note-on moves the score cursor one pair and the playhead to the
//! player's position. Voiced notes also move the text cursor one letter and
//! trigger audio; fillers (velocity 0) do neither. The sounding pitch comes
//! from the song, not from the event, which only says when.
//!
//! ## Stale events
//! Events stamped with an old [`Epoch`] are dropped, as is anything arriving
//! outside `Playing`. Nothing scheduled before a stop or a conversion can
//! highlight or sound afterwards.

mod engine;


pub use engine::{AudioEngine, Epoch, Generation, PlaybackEngine, PlaybackSink, PlayerEvent};

use crate::error::{PlaybackWarning, Result};
use crate::pitch::Pitch;
use crate::score::HighlightMap;
use crate::timeline::format_song_time;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Everything the synchronizer needs from one conversion
#[derive(Debug, Clone, Default)]
pub struct Song {
    pub generation: Generation,
    pub artifact: Vec<u8>,
    pub highlights: HighlightMap,
    /// Pitch of every note-on, fillers included, in playing order
    pub pitches: Vec<Pitch>,
    /// Text line positions of the letters, in playing order
    pub letters: Vec<usize>,
    /// Audio trigger length, one quarter note
    pub seconds_per_beat: f64,
}

/// The two completions `play` waits for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    generation: Generation,
    instrument: bool,
    artifact: bool,
}

impl Readiness {
    fn reset(&mut self, generation: Generation) {
        *self = Readiness {
            generation,
            instrument: false,
            artifact: false,
        };
    }

    pub fn instrument(&self) -> bool {
        self.instrument
    }

    pub fn artifact(&self) -> bool {
        self.artifact
    }

    pub fn is_ready(&self) -> bool {
        self.instrument && self.artifact
    }
}

pub struct Synchronizer<P: PlaybackEngine, S: PlaybackSink> {
    player: P,
    sink: S,
    state: PlaybackState,
    epoch: Epoch,
    readiness: Readiness,
    song: Option<Song>,
    score_cursor: usize,
    letter_cursor: usize,
    /// Whether the sink holds any marks that a stop must clear
    marked: bool,
}

impl<P: PlaybackEngine, S: PlaybackSink> Synchronizer<P, S> {
    pub fn new(player: P, sink: S) -> Self {
        Self {
            player,
            sink,
            state: PlaybackState::Stopped,
            epoch: Epoch::default(),
            readiness: Readiness::default(),
            song: None,
            score_cursor: 0,
            letter_cursor: 0,
            marked: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Whether the play control should be enabled
    pub fn can_play(&self) -> bool {
        self.song.is_some() && self.readiness.is_ready() && self.state != PlaybackState::Playing
    }

    /// Whether the stop control should be enabled
    pub fn can_stop(&self) -> bool {
        self.state != PlaybackState::Stopped
    }

    /// Total length as `m:ss`, once the player has the artifact
    pub fn song_time(&self) -> Option<String> {
        self.readiness
            .artifact
            .then(|| format_song_time(self.player.total_duration_secs()))
    }

    /// Install the song of a new conversion.
    ///
    /// Cancels whatever was playing, clears all marks and hands the artifact
    /// to the player. Both readiness flags start over.
    pub fn load(&mut self, song: Song) -> Result<()> {
        self.halt();
        self.readiness.reset(song.generation);
        tracing::debug!(
            generation = song.generation.0,
            pairs = song.highlights.len(),
            letters = song.letters.len(),
            "loading song"
        );
        let loaded = self.player.load_artifact(&song.artifact, song.generation);
        self.song = Some(song);
        loaded
    }

    pub fn instrument_loaded(&mut self, generation: Generation) {
        if generation == self.readiness.generation {
            self.readiness.instrument = true;
        } else {
            tracing::debug!(generation = generation.0, "ignoring stale instrument load");
        }
    }

    pub fn artifact_loaded(&mut self, generation: Generation) {
        if generation == self.readiness.generation {
            self.readiness.artifact = true;
        } else {
            tracing::debug!(generation = generation.0, "ignoring stale artifact load");
        }
    }

    fn reject(&self, warning: PlaybackWarning) -> std::result::Result<(), PlaybackWarning> {
        tracing::warn!("{}", warning);
        Err(warning)
    }

    pub fn play(&mut self) -> std::result::Result<(), PlaybackWarning> {
        if self.song.is_none() {
            return self.reject(PlaybackWarning::NoTimeline);
        }
        if self.state == PlaybackState::Playing {
            return self.reject(PlaybackWarning::AlreadyPlaying);
        }
        if !self.readiness.artifact {
            return self.reject(PlaybackWarning::ArtifactNotLoaded);
        }
        if !self.readiness.instrument {
            return self.reject(PlaybackWarning::InstrumentNotLoaded);
        }

        // Paused resumes where it left off; Stopped was rewound by stop/load
        self.player.play(self.epoch);
        self.state = PlaybackState::Playing;
        tracing::debug!(epoch = self.epoch.0, "playing");
        Ok(())
    }

    pub fn pause(&mut self) -> std::result::Result<(), PlaybackWarning> {
        if self.state != PlaybackState::Playing || !self.player.is_playing() {
            return self.reject(PlaybackWarning::NotPlaying);
        }
        self.player.pause();
        self.state = PlaybackState::Paused;
        Ok(())
    }

    /// Rewind and clear. Calling it again while stopped does nothing.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Stopped && !self.marked {
            return;
        }
        self.halt();
    }

    fn halt(&mut self) {
        self.player.stop();
        self.epoch = self.epoch.next();
        self.state = PlaybackState::Stopped;
        self.score_cursor = 0;
        self.letter_cursor = 0;
        if self.marked {
            self.sink.clear_highlights();
            self.marked = false;
        }
    }

    /// Dispatch a player callback
    pub fn handle(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::ArtifactLoaded { generation } => self.artifact_loaded(generation),
            PlayerEvent::NoteOn {
                epoch,
                pitch,
                velocity,
            } => self.on_note_on(epoch, pitch, velocity),
            PlayerEvent::EndOfTimeline { epoch } => self.on_end_of_timeline(epoch),
        }
    }

    fn is_current(&self, epoch: Epoch) -> bool {
        if epoch != self.epoch || self.state != PlaybackState::Playing {
            tracing::debug!(epoch = epoch.0, current = self.epoch.0, "dropping stale event");
            return false;
        }
        true
    }

    pub fn on_note_on(&mut self, epoch: Epoch, pitch: Pitch, velocity: u8) {
        if !self.is_current(epoch) {
            return;
        }
        let Some(song) = &self.song else {
            return;
        };

        let slot = self.score_cursor;
        match song.highlights.get(slot) {
            Some(pair) => self.sink.highlight_score_note(pair),
            None => tracing::debug!(cursor = slot, "no score note to highlight"),
        }
        self.score_cursor += 1;
        self.marked = true;

        let fraction = (self.player.elapsed_percent() / 100.0).clamp(0.0, 1.0);
        self.sink.move_playhead(fraction);

        if velocity == 0 {
            return;
        }

        match song.letters.get(self.letter_cursor) {
            Some(&position) => self.sink.highlight_letter(position),
            None => tracing::debug!(cursor = self.letter_cursor, "no letter to highlight"),
        }
        self.letter_cursor += 1;

        // the event's key is clamped to the MIDI range; the song keeps the real pitch
        let pitch = song.pitches.get(slot).copied().unwrap_or(pitch);
        self.sink.trigger_audio(&pitch.to_string(), song.seconds_per_beat);
    }

    pub fn on_end_of_timeline(&mut self, epoch: Epoch) {
        if !self.is_current(epoch) {
            return;
        }
        tracing::debug!("end of timeline");
        self.halt();
    }
}
