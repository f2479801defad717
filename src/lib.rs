//! Musical Linguistics: turn text into music.
//!
//! Every letter becomes a pitch in a chosen scale. The pitches are laid out
//! on a grand staff and written to a playable MIDI timeline, and playback
//! highlights each note and letter as it sounds.

pub mod config;
pub mod error;
pub mod measure;
pub mod pitch;
pub mod player;
pub mod scale;
pub mod score;
pub mod session;
pub mod sync;
pub mod timeline;
pub mod transcribe;

pub use config::{Instrument, Settings};
pub use error::*;
pub use measure::{partition, Measure, GROUP_SIZE};
pub use pitch::{Accidental, NoteName, Pitch, Register};
pub use player::VirtualPlayer;
pub use scale::{pitch_at, Interval};
pub use score::{HighlightMap, NotationEngine, ScoreRenderer};
pub use session::{compose, Composition, Session};
pub use sync::{PlaybackState, Synchronizer};
pub use timeline::{build_timeline, Timeline};
pub use transcribe::{normalize, transcribe, Transcript};

/// Convert text straight to MIDI bytes with the given settings.
pub fn text_to_midi(text: &str, settings: &Settings) -> Result<Vec<u8>> {
    let transcript = transcribe(text, settings.interval, settings.octave);
    build_timeline(&transcript, settings.tempo, settings.rest_on_spaces).encode()
}
