//! Timeline type definitions

use crate::pitch::Pitch;
use serde::Serialize;

/// Resolution of the encoded artifact (ticks per quarter note)
pub const TICKS_PER_BEAT: u16 = 128;

/// Velocity of every voiced note
pub const NOTE_VELOCITY: u8 = 64;

/// Pitch carried by the silent filler between words
pub const FILLER_PITCH: Pitch = Pitch::natural(crate::pitch::NoteName::C, 0);

/// What happens at a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum EventKind {
    /// A note starts. Velocity 0 marks a word filler: it takes up time but
    /// makes no sound.
    NoteOn { pitch: Pitch, velocity: u8 },
    NoteOff { pitch: Pitch },
    EndOfTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub tick: u32,
    pub kind: EventKind,
}

/// A note-on as seen by playback: its order among all note-ons and its start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOn {
    pub index: usize,
    pub tick: u32,
    pub pitch: Pitch,
    pub velocity: u8,
}

impl NoteOn {
    pub fn is_filler(&self) -> bool {
        self.velocity == 0
    }
}

/// Ordered, tempo-stamped note events for one conversion
///
/// # Fields
/// - `tempo_bpm`: quarter notes per minute, set once at tick 0
/// - `ticks_per_beat`: resolution, always [`TICKS_PER_BEAT`] for built timelines
/// - `events`: sorted by tick; at equal ticks a note-off precedes the next note-on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub tempo_bpm: u16,
    pub ticks_per_beat: u16,
    pub events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn note_ons(&self) -> Vec<NoteOn> {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::NoteOn { pitch, velocity } => Some((e.tick, pitch, velocity)),
                _ => None,
            })
            .enumerate()
            .map(|(index, (tick, pitch, velocity))| NoteOn {
                index,
                tick,
                pitch,
                velocity,
            })
            .collect()
    }

    pub fn voiced_count(&self) -> usize {
        self.note_ons().iter().filter(|n| !n.is_filler()).count()
    }

    pub fn filler_count(&self) -> usize {
        self.note_ons().iter().filter(|n| n.is_filler()).count()
    }

    pub fn total_ticks(&self) -> u32 {
        self.events.last().map(|e| e.tick).unwrap_or(0)
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo_bpm.max(1) as f64
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.total_ticks() as f64 / self.ticks_per_beat.max(1) as f64 * self.seconds_per_beat()
    }

    pub fn is_empty(&self) -> bool {
        self.note_ons().is_empty()
    }
}
