//! # Timeline Module
//!
//! Build the playable event timeline for a transcript and encode it as a
//! Standard MIDI File.
//!
//! ## Purpose
//! The timeline is what a playback engine schedules. Each note-on it emits
//! drives one step of the synchronizer:
//! 1. **Audio** - voiced note-ons trigger the instrument
//! 2. **Score highlighting** - every note-on (fillers included) moves the
//!    score cursor one slot
//! 3. **Text highlighting** - voiced note-ons move the letter cursor
//!
//! ## Sub-modules
//! - `types` - Timeline, TimelineEvent, EventKind, NoteOn
//! - `engine` - transcript -> timeline
//! - `midi` - timeline <-> SMF bytes (via `midly`)
//!
//! ## Example
//! ```rust
//! use musical_linguistics::{build_timeline, transcribe, Interval};
//! use musical_linguistics::timeline::decode;
//!
//! let transcript = transcribe("AB CD", Interval::CMajor, 3);
//! let timeline = build_timeline(&transcript, 200, true);
//!
//! assert_eq!(timeline.voiced_count(), 4);
//! assert_eq!(timeline.filler_count(), 1);
//!
//! let bytes = timeline.encode().unwrap();
//! let reloaded = decode(&bytes).unwrap();
//! assert_eq!(reloaded.tempo_bpm, 200);
//! assert_eq!(reloaded.note_ons().len(), 5);
//! ```
//!
//! ## Timing
//! Every slot is one quarter note ([`TICKS_PER_BEAT`] ticks). The tempo is a
//! single value placed at tick 0, so seconds per slot is `60 / tempo`.

mod engine;
mod midi;
mod types;


pub use engine::build_timeline;
pub use midi::{decode, encode};
pub use types::{
    EventKind, NoteOn, Timeline, TimelineEvent, FILLER_PITCH, NOTE_VELOCITY, TICKS_PER_BEAT,
};

impl Timeline {
    /// Encode as a playable SMF artifact
    pub fn encode(&self) -> crate::error::Result<Vec<u8>> {
        midi::encode(self)
    }
}

/// Format a song length as `m:ss`, rounding seconds up
///
/// ```rust
/// use musical_linguistics::timeline::format_song_time;
///
/// assert_eq!(format_song_time(0.0), "0:00");
/// assert_eq!(format_song_time(4.2), "0:05");
/// assert_eq!(format_song_time(75.0), "1:15");
/// ```
pub fn format_song_time(seconds: f64) -> String {
    let total = seconds.max(0.0).ceil() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
