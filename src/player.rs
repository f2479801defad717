//! In-memory playback engine
//!
//! [`VirtualPlayer`] decodes the SMF artifact with `midly` and walks its
//! note-ons one step at a time instead of on a clock. The host pulls events
//! with [`VirtualPlayer::next_event`] and feeds them to the synchronizer, so
//! a whole song can be played back (and tested) without audio hardware.

use crate::error::Result;
use crate::sync::{Epoch, Generation, PlaybackEngine, PlayerEvent};
use crate::timeline::{decode, NoteOn, Timeline};
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct VirtualPlayer {
    timeline: Option<Timeline>,
    notes: Vec<NoteOn>,
    /// Index of the next note-on to emit
    position: usize,
    /// Tick of the last emitted event
    tick: u32,
    playing: bool,
    epoch: Epoch,
    pending: VecDeque<PlayerEvent>,
}

impl VirtualPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    fn total_ticks(&self) -> u32 {
        self.timeline.as_ref().map(Timeline::total_ticks).unwrap_or(0)
    }

    /// Next callback, if any.
    ///
    /// Load completions come first. While playing, each call yields the next
    /// note-on and finally `EndOfTimeline`, after which the player idles.
    pub fn next_event(&mut self) -> Option<PlayerEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if !self.playing {
            return None;
        }
        match self.notes.get(self.position) {
            Some(note) => {
                self.tick = note.tick;
                self.position += 1;
                Some(PlayerEvent::NoteOn {
                    epoch: self.epoch,
                    pitch: note.pitch,
                    velocity: note.velocity,
                })
            }
            None => {
                self.tick = self.total_ticks();
                self.playing = false;
                Some(PlayerEvent::EndOfTimeline { epoch: self.epoch })
            }
        }
    }

    /// Jump to `percent` of the song; the next note-on is the first one at or
    /// after that point
    pub fn seek(&mut self, percent: f64) {
        let target = (self.total_ticks() as f64 * percent.clamp(0.0, 100.0) / 100.0) as u32;
        self.position = self
            .notes
            .iter()
            .position(|n| n.tick >= target)
            .unwrap_or(self.notes.len());
        self.tick = target;
    }
}

impl PlaybackEngine for VirtualPlayer {
    fn load_artifact(&mut self, bytes: &[u8], generation: Generation) -> Result<()> {
        self.stop();
        self.pending.clear();
        self.timeline = None;
        self.notes.clear();

        let timeline = decode(bytes)?;
        tracing::debug!(
            generation = generation.0,
            notes = timeline.note_ons().len(),
            tempo = timeline.tempo_bpm,
            "artifact decoded"
        );
        self.notes = timeline.note_ons();
        self.timeline = Some(timeline);
        self.pending
            .push_back(PlayerEvent::ArtifactLoaded { generation });
        Ok(())
    }

    fn play(&mut self, epoch: Epoch) {
        if self.timeline.is_none() {
            return;
        }
        self.epoch = epoch;
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.position = 0;
        self.tick = 0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn elapsed_percent(&self) -> f64 {
        match self.total_ticks() {
            0 => 0.0,
            total => self.tick as f64 / total as f64 * 100.0,
        }
    }

    fn total_duration_secs(&self) -> f64 {
        self.timeline
            .as_ref()
            .map(Timeline::total_duration_secs)
            .unwrap_or(0.0)
    }
}
