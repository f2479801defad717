//! # Session
//!
//! Owns everything one user works with: the current [`Settings`], the last
//! [`Composition`], the score renderer, the synchronizer and the audio engine.
//!
//! ## Convert
//! 1. Stop whatever is playing (stale callbacks are invalidated).
//! 2. Normalize and transcribe the text with the current settings.
//! 3. Partition into measures, build the timeline and encode the artifact.
//! 4. Render the score and collect the highlight map.
//! 5. Ask the audio engine for the instrument and hand the song to the
//!    synchronizer.
//!
//! Settings changes take effect on the next convert only.
//!
//! ## Example
//! ```rust
//! use musical_linguistics::{compose, Interval, Settings};
//! use musical_linguistics::sync::Generation;
//!
//! let settings = Settings { interval: Interval::Chromatic, tempo: 120, ..Settings::default() };
//! let composition = compose("HI", &settings, Generation(1)).unwrap();
//!
//! assert_eq!(composition.measures.len(), 1);
//! assert_eq!(composition.timeline.note_ons().len(), 2);
//! assert_eq!(&composition.artifact[0..4], b"MThd");
//! ```

use crate::config::Settings;
use crate::error::{PlaybackWarning, Result};
use crate::measure::{partition, Measure, GROUP_SIZE};
use crate::player::VirtualPlayer;
use crate::score::{NotationEngine, ScoreLayout, ScoreRenderer};
use crate::sync::{
    AudioEngine, Generation, PlaybackEngine, PlaybackSink, PlaybackState, PlayerEvent, Song,
    Synchronizer,
};
use crate::timeline::{build_timeline, format_song_time, Timeline};
use crate::transcribe::{normalize, transcribe_normalized, TextLine, Transcript};

/// Everything derived from one piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub generation: Generation,
    pub settings: Settings,
    pub text: TextLine,
    pub transcript: Transcript,
    pub measures: Vec<Measure>,
    pub timeline: Timeline,
    /// Encoded Standard MIDI File
    pub artifact: Vec<u8>,
}

impl Composition {
    /// Total length as `m:ss`
    pub fn song_time(&self) -> String {
        format_song_time(self.timeline.total_duration_secs())
    }
}

/// Run the conversion pipeline without rendering or playback
pub fn compose(raw: &str, settings: &Settings, generation: Generation) -> Result<Composition> {
    let normalized = normalize(raw);
    let transcript = transcribe_normalized(&normalized, settings.interval, settings.octave);
    let measures = partition(&transcript, GROUP_SIZE, settings.rest_on_spaces);
    let timeline = build_timeline(&transcript, settings.tempo, settings.rest_on_spaces);
    let artifact = timeline.encode()?;

    Ok(Composition {
        generation,
        settings: *settings,
        text: TextLine::new(&normalized),
        transcript,
        measures,
        timeline,
        artifact,
    })
}

pub struct Session<A, P, S, N>
where
    A: AudioEngine,
    P: PlaybackEngine,
    S: PlaybackSink,
    N: NotationEngine,
{
    settings: Settings,
    audio: A,
    renderer: ScoreRenderer<N>,
    sync: Synchronizer<P, S>,
    generation: Generation,
    composition: Option<Composition>,
    layout: ScoreLayout,
}

impl<A, P, S, N> Session<A, P, S, N>
where
    A: AudioEngine,
    P: PlaybackEngine,
    S: PlaybackSink,
    N: NotationEngine,
{
    pub fn new(settings: Settings, audio: A, player: P, sink: S, notation: N) -> Self {
        Self {
            settings,
            audio,
            renderer: ScoreRenderer::new(notation),
            sync: Synchronizer::new(player, sink),
            generation: Generation::default(),
            composition: None,
            layout: ScoreLayout::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change settings; the current composition is kept until the next convert
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn composition(&self) -> Option<&Composition> {
        self.composition.as_ref()
    }

    pub fn layout(&self) -> &ScoreLayout {
        &self.layout
    }

    pub fn synchronizer(&self) -> &Synchronizer<P, S> {
        &self.sync
    }

    pub fn synchronizer_mut(&mut self) -> &mut Synchronizer<P, S> {
        &mut self.sync
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn notation(&self) -> &N {
        self.renderer.engine()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> PlaybackState {
        self.sync.state()
    }

    /// Convert text into a new composition, replacing the previous one
    pub fn convert(&mut self, raw: &str) -> Result<&Composition> {
        self.sync.stop();
        self.generation = self.generation.next();

        let composition = compose(raw, &self.settings, self.generation)?;
        tracing::info!(
            generation = self.generation.0,
            letters = composition.transcript.letter_count(),
            measures = composition.measures.len(),
            interval = %self.settings.interval,
            instrument = %self.settings.instrument,
            tempo = self.settings.tempo,
            "converted text"
        );

        self.layout = self.renderer.render(&composition.measures);
        self.audio.load(self.settings.instrument, self.generation);

        let song = Song {
            generation: self.generation,
            artifact: composition.artifact.clone(),
            highlights: self.layout.highlights.clone(),
            pitches: composition
                .timeline
                .note_ons()
                .iter()
                .map(|note| note.pitch)
                .collect(),
            letters: composition.text.letter_positions(),
            seconds_per_beat: composition.timeline.seconds_per_beat(),
        };
        let loaded = self.sync.load(song);
        let composition: &Composition = self.composition.insert(composition);
        loaded?;
        Ok(composition)
    }

    /// Completion callback of [`AudioEngine::load`]
    pub fn instrument_loaded(&mut self, generation: Generation) {
        self.sync.instrument_loaded(generation);
    }

    pub fn handle(&mut self, event: PlayerEvent) {
        self.sync.handle(event);
    }

    pub fn play(&mut self) -> std::result::Result<(), PlaybackWarning> {
        self.sync.play()
    }

    pub fn pause(&mut self) -> std::result::Result<(), PlaybackWarning> {
        self.sync.pause()
    }

    pub fn stop(&mut self) {
        self.sync.stop();
    }

    pub fn can_play(&self) -> bool {
        self.sync.can_play()
    }

    pub fn can_stop(&self) -> bool {
        self.sync.can_stop()
    }
}

impl<A, S, N> Session<A, VirtualPlayer, S, N>
where
    A: AudioEngine,
    S: PlaybackSink,
    N: NotationEngine,
{
    /// Pull one event from the in-memory player and dispatch it
    pub fn step(&mut self) -> Option<PlayerEvent> {
        let event = self.sync.player_mut().next_event()?;
        self.sync.handle(event);
        Some(event)
    }

    /// Dispatch events until the player goes quiet
    pub fn run_until_idle(&mut self) -> usize {
        let mut count = 0;
        while self.step().is_some() {
            count += 1;
        }
        count
    }
}
