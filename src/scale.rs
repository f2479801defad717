//! # Scale Mapper
//!
//! Maps a letter index (`A = 0 .. Z = 25`) to a pitch. The interval supplies
//! the note names; the index walks through them and climbs one octave every
//! time it wraps around the interval.
//!
//! ```rust
//! use musical_linguistics::{pitch_at, Interval};
//!
//! // cmajor has 7 notes: index 7 ('H') wraps to C one octave up
//! assert_eq!(pitch_at(0, Interval::CMajor, 3).to_string(), "C3");
//! assert_eq!(pitch_at(7, Interval::CMajor, 3).to_string(), "C4");
//! // arpeggios has 3 notes: 'Z' lands eight octaves above the start
//! assert_eq!(pitch_at(25, Interval::Arpeggios, 3).to_string(), "E11");
//! ```

use crate::pitch::{Accidental, NoteName, Pitch};
use serde::Serialize;
use std::fmt;

/// Highest letter index the mapper accepts (`'Z' - 'A'`)
pub const MAX_INDEX: i32 = 25;

/// Starting octave used when none is configured
pub const DEFAULT_OCTAVE: i32 = 3;

/// Returned for any index outside `0..=MAX_INDEX`.
///
/// This keeps the pipeline running on odd input (tabs, carriage returns). It
/// is a safety valve, not a musical choice.
pub const FALLBACK_PITCH: Pitch = Pitch::natural(NoteName::C, 1);

const fn nat(name: NoteName) -> (NoteName, Accidental) {
    (name, Accidental::Natural)
}

const fn sharp(name: NoteName) -> (NoteName, Accidental) {
    (name, Accidental::Sharp)
}

const fn flat(name: NoteName) -> (NoteName, Accidental) {
    (name, Accidental::Flat)
}

const CMAJOR: [(NoteName, Accidental); 7] = [
    nat(NoteName::C),
    nat(NoteName::D),
    nat(NoteName::E),
    nat(NoteName::F),
    nat(NoteName::G),
    nat(NoteName::A),
    nat(NoteName::B),
];

const CHROMATIC: [(NoteName, Accidental); 12] = [
    nat(NoteName::C),
    sharp(NoteName::C),
    nat(NoteName::D),
    sharp(NoteName::D),
    nat(NoteName::E),
    nat(NoteName::F),
    sharp(NoteName::F),
    nat(NoteName::G),
    sharp(NoteName::G),
    nat(NoteName::A),
    sharp(NoteName::A),
    nat(NoteName::B),
];

const ARPEGGIOS: [(NoteName, Accidental); 3] =
    [nat(NoteName::C), nat(NoteName::E), nat(NoteName::G)];

const CMINOR: [(NoteName, Accidental); 7] = [
    nat(NoteName::C),
    nat(NoteName::D),
    flat(NoteName::E),
    nat(NoteName::F),
    nat(NoteName::G),
    nat(NoteName::A),
    flat(NoteName::B),
];

/// The interval (scale) letters are mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "cmajor")]
    CMajor,
    #[serde(rename = "chromatic")]
    Chromatic,
    #[serde(rename = "arpeggios")]
    Arpeggios,
    #[serde(rename = "cminor")]
    CMinor,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::CMajor,
        Interval::Chromatic,
        Interval::Arpeggios,
        Interval::CMinor,
    ];

    /// Parse an interval identifier such as `cmajor` (case-insensitive)
    pub fn from_id(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.id().eq_ignore_ascii_case(s.trim()))
    }

    pub fn id(&self) -> &'static str {
        match self {
            Interval::CMajor => "cmajor",
            Interval::Chromatic => "chromatic",
            Interval::Arpeggios => "arpeggios",
            Interval::CMinor => "cminor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interval::CMajor => "C Major",
            Interval::Chromatic => "Chromatic",
            Interval::Arpeggios => "Arpeggios",
            Interval::CMinor => "C Minor",
        }
    }

    fn notes(&self) -> &'static [(NoteName, Accidental)] {
        match self {
            Interval::CMajor => &CMAJOR,
            Interval::Chromatic => &CHROMATIC,
            Interval::Arpeggios => &ARPEGGIOS,
            Interval::CMinor => &CMINOR,
        }
    }

    pub fn len(&self) -> usize {
        self.notes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes().is_empty()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Pitch for letter index `index` under `interval`, starting at `starting_octave`
pub fn pitch_at(index: i32, interval: Interval, starting_octave: i32) -> Pitch {
    if !(0..=MAX_INDEX).contains(&index) {
        return FALLBACK_PITCH;
    }
    let notes = interval.notes();
    let len = notes.len() as i32;
    let (name, accidental) = notes[(index % len) as usize];
    Pitch::new(name, accidental, starting_octave + index / len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmajor_mapping() {
        let names: Vec<String> = (0..8)
            .map(|i| pitch_at(i, Interval::CMajor, 3).to_string())
            .collect();
        assert_eq!(names, ["C3", "D3", "E3", "F3", "G3", "A3", "B3", "C4"]);
    }

    #[test]
    fn test_chromatic_and_minor_spelling() {
        assert_eq!(pitch_at(1, Interval::Chromatic, 3).to_string(), "C#3");
        assert_eq!(pitch_at(12, Interval::Chromatic, 3).to_string(), "C4");
        assert_eq!(pitch_at(2, Interval::CMinor, 3).to_string(), "Eb3");
        assert_eq!(pitch_at(6, Interval::CMinor, 3).to_string(), "Bb3");
    }

    #[test]
    fn test_starting_octave_shifts_everything() {
        assert_eq!(pitch_at(0, Interval::CMajor, 5).to_string(), "C5");
        assert_eq!(pitch_at(25, Interval::CMajor, 1).to_string(), "G4");
    }

    #[test]
    fn test_out_of_range_uses_fallback() {
        assert_eq!(pitch_at(-1, Interval::CMajor, 3), FALLBACK_PITCH);
        assert_eq!(pitch_at(26, Interval::Chromatic, 3), FALLBACK_PITCH);
        assert_eq!(pitch_at(-56, Interval::Arpeggios, 6), FALLBACK_PITCH);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        for interval in Interval::ALL {
            for index in 0..=MAX_INDEX {
                assert_eq!(
                    pitch_at(index, interval, 3),
                    pitch_at(index, interval, 3)
                );
            }
        }
    }

    #[test]
    fn test_height_monotonic_within_octave_and_across_boundary() {
        for interval in Interval::ALL {
            let len = interval.len() as i32;
            for index in 1..=MAX_INDEX {
                let prev = pitch_at(index - 1, interval, 3).diatonic_height();
                let cur = pitch_at(index, interval, 3).diatonic_height();
                assert!(cur >= prev, "{} at {}", interval, index);
                if index % len == 0 {
                    assert!(cur > prev, "{} wraps at {}", interval, index);
                }
            }
        }
    }

    #[test]
    fn test_interval_ids() {
        assert_eq!(Interval::from_id("cminor"), Some(Interval::CMinor));
        assert_eq!(Interval::from_id(" Chromatic "), Some(Interval::Chromatic));
        assert_eq!(Interval::from_id("dorian"), None);
        assert_eq!(Interval::Arpeggios.len(), 3);
    }
}
