//! # Pitch Model
//!
//! A [`Pitch`] is a note letter, an accidental, and an octave number in
//! scientific pitch notation (middle C = `C4`).
//!
//! ## Diatonic Height
//! Register decisions only look at the letter and the octave:
//! `letter_order + octave * 7`, with `C = 0 .. B = 6`. Accidentals are ignored,
//! so `C#4` and `C4` share a height. Middle C has height 28, which is the
//! first treble height (see [`TREBLE_THRESHOLD`]).
//!
//! ## MIDI Keys
//! [`Pitch::midi_key`] gives the sounding key number (`C4 = 60`), clamped to
//! the MIDI range.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest diatonic height that still belongs on the bass staff.
pub const TREBLE_THRESHOLD: i32 = 27;

/// Note names C through B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NoteName {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    /// Position of the letter within the octave, C = 0 through B = 6
    pub fn letter_order(&self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 1,
            NoteName::E => 2,
            NoteName::F => 3,
            NoteName::G => 4,
            NoteName::A => 5,
            NoteName::B => 6,
        }
    }

    fn semitone(&self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::D => "D",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::G => "G",
            NoteName::A => "A",
            NoteName::B => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp, // #
    Flat,  // b
}

impl Accidental {
    fn offset(&self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// A concrete pitch: letter, accidental and octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pitch {
    pub name: NoteName,
    pub accidental: Accidental,
    pub octave: i32,
}

impl Pitch {
    pub const fn new(name: NoteName, accidental: Accidental, octave: i32) -> Self {
        Self {
            name,
            accidental,
            octave,
        }
    }

    pub const fn natural(name: NoteName, octave: i32) -> Self {
        Self::new(name, Accidental::Natural, octave)
    }

    /// Staff height used to pick a register: `letter_order + octave * 7`
    pub fn diatonic_height(&self) -> i32 {
        self.name.letter_order() + self.octave * 7
    }

    pub fn register(&self) -> Register {
        if self.diatonic_height() > TREBLE_THRESHOLD {
            Register::Treble
        } else {
            Register::Bass
        }
    }

    /// Pitch for a MIDI key, spelled with sharps
    pub fn from_midi_key(key: u8) -> Self {
        const SPELLING: [(NoteName, Accidental); 12] = [
            (NoteName::C, Accidental::Natural),
            (NoteName::C, Accidental::Sharp),
            (NoteName::D, Accidental::Natural),
            (NoteName::D, Accidental::Sharp),
            (NoteName::E, Accidental::Natural),
            (NoteName::F, Accidental::Natural),
            (NoteName::F, Accidental::Sharp),
            (NoteName::G, Accidental::Natural),
            (NoteName::G, Accidental::Sharp),
            (NoteName::A, Accidental::Natural),
            (NoteName::A, Accidental::Sharp),
            (NoteName::B, Accidental::Natural),
        ];
        let (name, accidental) = SPELLING[(key % 12) as usize];
        Pitch::new(name, accidental, key as i32 / 12 - 1)
    }

    /// MIDI key number (C4 = 60), clamped to 0..=127
    pub fn midi_key(&self) -> u8 {
        let key = (self.octave + 1) * 12 + self.name.semitone() + self.accidental.offset();
        key.clamp(0, 127) as u8
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.name.as_str(),
            self.accidental.as_str(),
            self.octave
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pitch: {0}")]
pub struct ParsePitchError(pub String);

impl FromStr for Pitch {
    type Err = ParsePitchError;

    /// Parse `C3`, `C#3`, `Eb4`, `C-1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePitchError(s.to_string());
        let mut chars = s.chars();
        let name = chars.next().and_then(NoteName::from_char).ok_or_else(err)?;
        let rest = chars.as_str();
        let (accidental, octave) = if let Some(o) = rest.strip_prefix('#') {
            (Accidental::Sharp, o)
        } else if let Some(o) = rest.strip_prefix('b') {
            (Accidental::Flat, o)
        } else {
            (Accidental::Natural, rest)
        };
        let octave = octave.parse().map_err(|_| err())?;
        Ok(Pitch::new(name, accidental, octave))
    }
}

/// One of the two staves of the grand staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    Treble,
    Bass,
}

impl Register {
    /// Where a rest sits on this staff
    pub fn rest_position(&self) -> Pitch {
        match self {
            Register::Treble => Pitch::natural(NoteName::B, 4),
            Register::Bass => Pitch::natural(NoteName::D, 3),
        }
    }

    pub fn clef_name(&self) -> &'static str {
        match self {
            Register::Treble => "treble",
            Register::Bass => "bass",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let sharp: Pitch = "C#3".parse().unwrap();
        assert_eq!(sharp, Pitch::new(NoteName::C, Accidental::Sharp, 3));
        assert_eq!(sharp.to_string(), "C#3");

        let flat: Pitch = "Bb4".parse().unwrap();
        assert_eq!(flat.accidental, Accidental::Flat);
        assert_eq!(flat.to_string(), "Bb4");

        assert!("H3".parse::<Pitch>().is_err());
        assert!("C".parse::<Pitch>().is_err());
        assert!("".parse::<Pitch>().is_err());
    }

    #[test]
    fn test_parse_error_message() {
        let err = "X9".parse::<Pitch>().unwrap_err();
        assert_eq!(err, ParsePitchError("X9".to_string()));
        assert_eq!(err.to_string(), "invalid pitch: X9");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert_eq!(boxed.to_string(), "invalid pitch: X9");
    }

    #[test]
    fn test_diatonic_height_middle_c_split() {
        let middle_c = Pitch::natural(NoteName::C, 4);
        let b3 = Pitch::natural(NoteName::B, 3);
        assert_eq!(middle_c.diatonic_height(), 28);
        assert_eq!(b3.diatonic_height(), 27);
        assert_eq!(middle_c.register(), Register::Treble);
        assert_eq!(b3.register(), Register::Bass);
    }

    #[test]
    fn test_two_digit_octaves_stay_treble() {
        let e11: Pitch = "E11".parse().unwrap();
        assert_eq!(e11.diatonic_height(), 79);
        assert_eq!(e11.register(), Register::Treble);
        assert_eq!("C10".parse::<Pitch>().unwrap().register(), Register::Treble);
    }

    #[test]
    fn test_accidental_does_not_change_height() {
        let c = Pitch::natural(NoteName::C, 3);
        let c_sharp = Pitch::new(NoteName::C, Accidental::Sharp, 3);
        assert_eq!(c.diatonic_height(), c_sharp.diatonic_height());
    }

    #[test]
    fn test_midi_keys() {
        assert_eq!(Pitch::natural(NoteName::C, 4).midi_key(), 60);
        assert_eq!(Pitch::natural(NoteName::A, 4).midi_key(), 69);
        assert_eq!("Eb3".parse::<Pitch>().unwrap().midi_key(), 51);
        assert_eq!(Pitch::natural(NoteName::C, 0).midi_key(), 12);
        assert_eq!(Pitch::natural(NoteName::B, 12).midi_key(), 127);
    }

    #[test]
    fn test_from_midi_key() {
        assert_eq!(Pitch::from_midi_key(60).to_string(), "C4");
        assert_eq!(Pitch::from_midi_key(51).to_string(), "D#3");
        assert_eq!(Pitch::from_midi_key(12).to_string(), "C0");
        for key in 0..=127u8 {
            assert_eq!(Pitch::from_midi_key(key).midi_key(), key);
        }
    }

    #[test]
    fn test_rest_positions() {
        assert_eq!(Register::Treble.rest_position().to_string(), "B4");
        assert_eq!(Register::Bass.rest_position().to_string(), "D3");
    }
}
