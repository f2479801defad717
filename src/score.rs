//! # Score Assembly
//!
//! Lays partitioned measures out as grand-staff systems and hands them to a
//! [`NotationEngine`], which does the actual typesetting.
//!
//! ## Layout
//! - The first system carries both clefs and the 4/4 time signature and is
//!   closed by connectors on both sides.
//! - Every later system is narrower, has no clef or time signature, and only a
//!   right-hand connector.
//! - Systems sit side by side, left to right, on one line.
//!
//! ## Highlight Map
//! The engine reports the notes it drew in document order, tagged with their
//! staff. Each gets `beat = position mod 4`; the treble note and the bass note
//! of the same system and beat become one [`NotePair`]. The synchronizer walks
//! these pairs, one per note-on.
//!
//! ## Failures
//! Engine errors are logged and swallowed. The score may then be partly drawn
//! or empty, but conversion and playback carry on.

use crate::error::LinguisticsError;
use crate::measure::{Measure, StaffNote};
use crate::pitch::Register;
use serde::Serialize;

pub const SURFACE_WIDTH: f32 = 1500.0;
pub const SURFACE_HEIGHT: f32 = 250.0;
pub const MEASURE_WIDTH: f32 = 150.0;
/// Extra room the first system needs for clefs and time signature
pub const FIRST_MEASURE_EXTRA: f32 = 60.0;
pub const SPACE_BETWEEN_STAVES: f32 = 10.0;
const ORIGIN: (f32, f32) = (20.0, 20.0);
const BEATS_PER_MEASURE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Connector {
    SingleLeft,
    SingleRight,
}

/// One staff of one system
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaveLayout {
    pub register: Register,
    /// Notation tokens, e.g. `C3/q` or `D3/q/r`
    pub tokens: Vec<String>,
    pub show_clef: bool,
    pub show_time_signature: bool,
}

impl StaveLayout {
    fn new(register: Register, notes: &[StaffNote], first: bool) -> Self {
        Self {
            register,
            tokens: notes.iter().map(StaffNote::token).collect(),
            show_clef: first,
            show_time_signature: first,
        }
    }

    pub fn clef(&self) -> &'static str {
        self.register.clef_name()
    }
}

/// A treble and a bass stave joined by connectors
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub space_between_staves: f32,
    pub treble: StaveLayout,
    pub bass: StaveLayout,
    pub connectors: Vec<Connector>,
}

/// Opaque id for a drawn note, assigned by the notation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NoteHandle(pub usize);

/// A note as reported back by the engine after drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderedNote {
    pub handle: NoteHandle,
    pub register: Register,
}

/// Treble and bass notes sounding on the same beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotePair {
    pub beat: usize,
    pub treble: Option<NoteHandle>,
    pub bass: Option<NoteHandle>,
}

/// Notes to highlight, in playing order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HighlightMap {
    pub pairs: Vec<NotePair>,
}

impl HighlightMap {
    /// Pair drawn notes by beat.
    ///
    /// Notes are tagged `beat = i mod 4` in document order. Each treble note
    /// takes the first not-yet-paired bass note with the same beat that comes
    /// after the previously paired one.
    pub fn from_rendered(notes: &[RenderedNote]) -> Self {
        let tagged: Vec<(usize, &RenderedNote)> = notes
            .iter()
            .enumerate()
            .map(|(i, n)| (i % BEATS_PER_MEASURE, n))
            .collect();

        let mut pairs = Vec::new();
        let mut bass_from = 0;
        for (beat, note) in tagged.iter().filter(|(_, n)| n.register == Register::Treble) {
            let found = tagged
                .iter()
                .enumerate()
                .skip(bass_from)
                .find(|(_, (b, n))| n.register == Register::Bass && b == beat);
            let bass = found.map(|(pos, (_, n))| {
                bass_from = pos + 1;
                n.handle
            });
            pairs.push(NotePair {
                beat: *beat,
                treble: Some(note.handle),
                bass,
            });
        }
        Self { pairs }
    }

    pub fn get(&self, index: usize) -> Option<&NotePair> {
        self.pairs.get(index)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// The external typesetting engine
pub trait NotationEngine {
    /// Drop anything drawn for a previous score
    fn clear(&mut self);

    fn add_system(&mut self, system: &SystemLayout) -> Result<(), LinguisticsError>;

    /// Draw everything added so far, returning the drawn notes in document order
    fn draw(&mut self) -> Result<Vec<RenderedNote>, LinguisticsError>;
}

/// Build system layouts for a list of measures
pub fn layout_systems(measures: &[Measure]) -> Vec<SystemLayout> {
    let (mut x, y) = ORIGIN;
    measures
        .iter()
        .enumerate()
        .map(|(i, measure)| {
            let first = i == 0;
            let width = if first {
                MEASURE_WIDTH + FIRST_MEASURE_EXTRA
            } else {
                MEASURE_WIDTH
            };
            let connectors = if first {
                vec![Connector::SingleLeft, Connector::SingleRight]
            } else {
                vec![Connector::SingleRight]
            };
            let system = SystemLayout {
                x,
                y,
                width,
                space_between_staves: SPACE_BETWEEN_STAVES,
                treble: StaveLayout::new(Register::Treble, &measure.treble, first),
                bass: StaveLayout::new(Register::Bass, &measure.bass, first),
                connectors,
            };
            x += width;
            system
        })
        .collect()
}

/// Result of rendering one score
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreLayout {
    pub systems: Vec<SystemLayout>,
    pub highlights: HighlightMap,
}

pub struct ScoreRenderer<N: NotationEngine> {
    engine: N,
}

impl<N: NotationEngine> ScoreRenderer<N> {
    pub fn new(engine: N) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &N {
        &self.engine
    }

    /// Render the measures, never failing
    pub fn render(&mut self, measures: &[Measure]) -> ScoreLayout {
        self.engine.clear();
        let systems = layout_systems(measures);
        if systems.is_empty() {
            return ScoreLayout::default();
        }

        let drawn = systems
            .iter()
            .try_for_each(|system| self.engine.add_system(system))
            .and_then(|_| self.engine.draw());

        let highlights = match drawn {
            Ok(notes) => HighlightMap::from_rendered(&notes),
            Err(e) => {
                tracing::error!("{}", e);
                HighlightMap::default()
            }
        };
        tracing::debug!(
            systems = systems.len(),
            pairs = highlights.len(),
            "score rendered"
        );
        ScoreLayout {
            systems,
            highlights,
        }
    }
}
