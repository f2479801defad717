//! # Transcriber
//!
//! Turns raw text into a [`Transcript`]: one word of pitches per
//! space-separated word, one pitch per letter.
//!
//! ## Normalization
//! 1. Drop everything that is not an ASCII letter or whitespace.
//! 2. Uppercase.
//! 3. Newlines become spaces.
//!
//! Only the space character separates words. Consecutive spaces leave empty
//! words behind, and any other whitespace that survived normalization (tabs,
//! carriage returns) stays inside its word and maps to the fallback pitch.
//!
//! ## Text Line
//! The normalized text is also exposed as a [`TextLine`] so a display can
//! highlight letters while the music plays. Spaces are marked and never
//! correspond to a note; every other glyph lines up with one voiced note-on.

use crate::pitch::Pitch;
use crate::scale::{pitch_at, Interval};
use serde::Serialize;

/// Words of pitches, one pitch per letter
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Transcript {
    pub words: Vec<Vec<Pitch>>,
}

impl Transcript {
    pub fn letter_count(&self) -> usize {
        self.words.iter().map(Vec::len).sum()
    }

    /// All pitches in reading order
    pub fn pitches(&self) -> impl Iterator<Item = &Pitch> {
        self.words.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.letter_count() == 0
    }
}

/// One displayed character of the normalized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Glyph {
    pub ch: char,
    pub is_space: bool,
}

/// The normalized text, glyph by glyph
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TextLine {
    pub glyphs: Vec<Glyph>,
}

impl TextLine {
    pub fn new(normalized: &str) -> Self {
        let glyphs = normalized
            .chars()
            .map(|ch| Glyph {
                ch,
                is_space: ch == ' ',
            })
            .collect();
        Self { glyphs }
    }

    /// Glyph positions that consume a note, in order
    pub fn letter_positions(&self) -> Vec<usize> {
        self.glyphs
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_space)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn as_string(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }
}

pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .map(|c| match c {
            '\n' => ' ',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

fn letter_index(c: char) -> i32 {
    c as i32 - 'A' as i32
}

/// Map already-normalized text to pitches
pub fn transcribe_normalized(
    normalized: &str,
    interval: Interval,
    starting_octave: i32,
) -> Transcript {
    let words = normalized
        .split(' ')
        .map(|word| {
            word.chars()
                .map(|c| pitch_at(letter_index(c), interval, starting_octave))
                .collect()
        })
        .collect();
    Transcript { words }
}

/// Normalize `raw` and map every letter to a pitch
pub fn transcribe(raw: &str, interval: Interval, starting_octave: i32) -> Transcript {
    transcribe_normalized(&normalize(raw), interval, starting_octave)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::FALLBACK_PITCH;

    fn names(transcript: &Transcript) -> Vec<Vec<String>> {
        transcript
            .words
            .iter()
            .map(|w| w.iter().map(Pitch::to_string).collect())
            .collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Hello, World!"), "HELLO WORLD");
        assert_eq!(normalize("one\ntwo"), "ONE TWO");
        assert_eq!(normalize("a1b2 c3"), "AB C");
        assert_eq!(normalize("tab\there"), "TAB\tHERE");
    }

    #[test]
    fn test_transcribe_two_words() {
        let transcript = transcribe("AB CD", Interval::CMajor, 3);
        assert_eq!(names(&transcript), [["C3", "D3"], ["E3", "F3"]]);
        assert_eq!(transcript.letter_count(), 4);
    }

    #[test]
    fn test_lowercase_and_punctuation() {
        let transcript = transcribe("ab, cd.", Interval::CMajor, 3);
        assert_eq!(names(&transcript), [["C3", "D3"], ["E3", "F3"]]);
    }

    #[test]
    fn test_consecutive_spaces_keep_empty_words() {
        let transcript = transcribe("A  B", Interval::CMajor, 3);
        assert_eq!(transcript.words.len(), 3);
        assert!(transcript.words[1].is_empty());
        assert_eq!(transcript.letter_count(), 2);
    }

    #[test]
    fn test_empty_input() {
        let transcript = transcribe("", Interval::CMajor, 3);
        assert_eq!(transcript.words, vec![Vec::<Pitch>::new()]);
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_tab_maps_to_fallback() {
        let transcript = transcribe("A\tB", Interval::Chromatic, 3);
        assert_eq!(transcript.words.len(), 1);
        assert_eq!(transcript.words[0][1], FALLBACK_PITCH);
    }

    #[test]
    fn test_text_line_letter_positions() {
        let line = TextLine::new(&normalize("Hi there"));
        assert_eq!(line.as_string(), "HI THERE");
        assert!(line.glyphs[2].is_space);
        assert_eq!(line.letter_positions(), vec![0, 1, 3, 4, 5, 6, 7]);
        let transcript = transcribe("Hi there", Interval::CMajor, 3);
        assert_eq!(line.letter_positions().len(), transcript.letter_count());
    }
}
