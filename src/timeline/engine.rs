//! Timeline construction
//!
//! Walks the same slot sequence the score uses, so note-on `i` and score slot
//! `i` always describe the same beat.

use super::types::{EventKind, Timeline, TimelineEvent, FILLER_PITCH, NOTE_VELOCITY, TICKS_PER_BEAT};
use crate::measure::{flatten, Slot};
use crate::transcribe::Transcript;

/// Build the playback timeline for a transcript
///
/// Every letter becomes a quarter note, played back to back. With
/// `rest_between_words`, a silent filler quarter (velocity 0) sits between
/// words so the pause has a real length on the timeline.
///
/// # Example
/// ```rust
/// use musical_linguistics::{build_timeline, transcribe, Interval};
///
/// let transcript = transcribe("HI", Interval::Chromatic, 3);
/// let timeline = build_timeline(&transcript, 120, false);
///
/// let notes = timeline.note_ons();
/// assert_eq!(notes.len(), 2);
/// assert_eq!(notes[0].pitch.to_string(), "G3");
/// assert_eq!(notes[1].pitch.to_string(), "G#3");
/// assert_eq!(timeline.total_duration_secs(), 1.0);
/// ```
pub fn build_timeline(
    transcript: &Transcript,
    tempo_bpm: u16,
    rest_between_words: bool,
) -> Timeline {
    let quarter = TICKS_PER_BEAT as u32;
    let slots = flatten(transcript, rest_between_words);
    let mut events = Vec::with_capacity(slots.len() * 2 + 1);
    let mut tick = 0u32;

    for slot in &slots {
        let (pitch, velocity) = match slot {
            Slot::Note(pitch) => (*pitch, NOTE_VELOCITY),
            Slot::Rest => (FILLER_PITCH, 0),
        };
        events.push(TimelineEvent {
            tick,
            kind: EventKind::NoteOn { pitch, velocity },
        });
        tick += quarter;
        events.push(TimelineEvent {
            tick,
            kind: EventKind::NoteOff { pitch },
        });
    }

    events.push(TimelineEvent {
        tick,
        kind: EventKind::EndOfTrack,
    });

    Timeline {
        tempo_bpm,
        ticks_per_beat: TICKS_PER_BEAT,
        events,
    }
}
