//! # Measure Partitioner
//!
//! Lays the transcript out as 4/4 measures on a grand staff.
//!
//! ## Steps
//! 1. [`flatten`] the transcript into [`Slot`]s, optionally adding a rest
//!    after each word (the same sequence the timeline plays).
//! 2. Chunk into groups of `group_size` (4), padding the last group with rests.
//! 3. Split every group into a treble view and a bass view. A note shows up
//!    in the view of its register; the other view gets a rest in that slot.
//!    Both views always have `group_size` slots so the staves line up.
//!
//! ## Example
//! ```rust
//! use musical_linguistics::{partition, transcribe, Interval};
//!
//! let transcript = transcribe("ABCDEF", Interval::CMajor, 3);
//! let measures = partition(&transcript, 4, false);
//!
//! assert_eq!(measures.len(), 2);
//! assert_eq!(measures[1].treble_tokens(), ["B4/q/r"; 4]);
//! assert_eq!(measures[1].bass_tokens(), ["G3/q", "A3/q", "D3/q/r", "D3/q/r"]);
//! ```

use crate::pitch::{Pitch, Register};
use crate::transcribe::Transcript;
use serde::Serialize;

/// Slots per measure in 4/4 with quarter notes
pub const GROUP_SIZE: usize = 4;

/// A position in the flattened pitch sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Note(Pitch),
    Rest,
}

/// What one staff shows in one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffNote {
    Note(Pitch),
    /// A quarter rest drawn at the given staff position
    Rest(Pitch),
}

impl StaffNote {
    /// Notation token, e.g. `C3/q` or `B4/q/r`
    pub fn token(&self) -> String {
        match self {
            StaffNote::Note(pitch) => format!("{}/q", pitch),
            StaffNote::Rest(position) => format!("{}/q/r", position),
        }
    }

}

/// One measure of the grand staff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    pub slots: Vec<Slot>,
    pub treble: Vec<StaffNote>,
    pub bass: Vec<StaffNote>,
}

impl Measure {
    fn from_slots(slots: Vec<Slot>) -> Self {
        let treble = slots.iter().map(|s| staff_view(s, Register::Treble)).collect();
        let bass = slots.iter().map(|s| staff_view(s, Register::Bass)).collect();
        Self {
            slots,
            treble,
            bass,
        }
    }

    pub fn treble_tokens(&self) -> Vec<String> {
        self.treble.iter().map(StaffNote::token).collect()
    }

    pub fn bass_tokens(&self) -> Vec<String> {
        self.bass.iter().map(StaffNote::token).collect()
    }
}

fn staff_view(slot: &Slot, register: Register) -> StaffNote {
    match slot {
        Slot::Note(pitch) if pitch.register() == register => StaffNote::Note(*pitch),
        _ => StaffNote::Rest(register.rest_position()),
    }
}

/// Flatten the transcript into the slot sequence shared by score and timeline.
///
/// With `rest_between_words`, a rest follows every non-empty word except the
/// last one.
pub fn flatten(transcript: &Transcript, rest_between_words: bool) -> Vec<Slot> {
    let last = transcript.words.len().saturating_sub(1);
    let mut slots = Vec::with_capacity(transcript.letter_count() + transcript.words.len());
    for (i, word) in transcript.words.iter().enumerate() {
        slots.extend(word.iter().copied().map(Slot::Note));
        if rest_between_words && i < last && !word.is_empty() {
            slots.push(Slot::Rest);
        }
    }
    slots
}

/// Chunk into groups of `n`, padding the final group
pub fn group_by<T: Clone>(items: &[T], n: usize, pad: T) -> Vec<Vec<T>> {
    items
        .chunks(n.max(1))
        .map(|chunk| {
            let mut group = chunk.to_vec();
            group.resize(n.max(1), pad.clone());
            group
        })
        .collect()
}

/// Split the transcript into grand-staff measures
pub fn partition(
    transcript: &Transcript,
    group_size: usize,
    rest_between_words: bool,
) -> Vec<Measure> {
    let slots = flatten(transcript, rest_between_words);
    group_by(&slots, group_size, Slot::Rest)
        .into_iter()
        .map(Measure::from_slots)
        .collect()
}
