//! Integration tests for the text-to-music pipeline
//!
//! Drives a full `Session` with the in-memory player, a recording display and
//! a fake notation engine.

use musical_linguistics::score::{NoteHandle, NotePair, RenderedNote, SystemLayout};
use musical_linguistics::sync::{AudioEngine, Generation, PlaybackEngine, PlaybackSink, PlayerEvent};
use musical_linguistics::timeline::decode;
use musical_linguistics::{
    pitch_at, text_to_midi, transcribe, Instrument, Interval, LinguisticsError, NotationEngine,
    PlaybackState, PlaybackWarning, Register, Session, Settings, VirtualPlayer,
};

#[derive(Default)]
struct Audio {
    requests: Vec<(Instrument, Generation)>,
}

impl AudioEngine for Audio {
    fn load(&mut self, instrument: Instrument, generation: Generation) {
        self.requests.push((instrument, generation));
    }
}

#[derive(Default)]
struct Display {
    pairs: Vec<NotePair>,
    letters: Vec<usize>,
    playhead: Vec<f64>,
    sounds: Vec<(String, f64)>,
    clears: usize,
}

impl PlaybackSink for Display {
    fn highlight_score_note(&mut self, pair: &NotePair) {
        self.pairs.push(*pair);
    }

    fn highlight_letter(&mut self, position: usize) {
        self.letters.push(position);
    }

    fn move_playhead(&mut self, fraction: f64) {
        self.playhead.push(fraction);
    }

    fn trigger_audio(&mut self, note: &str, duration_secs: f64) {
        self.sounds.push((note.to_string(), duration_secs));
    }

    fn clear_highlights(&mut self) {
        self.clears += 1;
    }
}

#[derive(Default)]
struct Notation {
    systems: Vec<SystemLayout>,
}

impl NotationEngine for Notation {
    fn clear(&mut self) {
        self.systems.clear();
    }

    fn add_system(&mut self, system: &SystemLayout) -> Result<(), LinguisticsError> {
        self.systems.push(system.clone());
        Ok(())
    }

    fn draw(&mut self) -> Result<Vec<RenderedNote>, LinguisticsError> {
        let mut notes = Vec::new();
        for system in &self.systems {
            for stave in [&system.treble, &system.bass] {
                for _ in &stave.tokens {
                    notes.push(RenderedNote {
                        handle: NoteHandle(notes.len()),
                        register: stave.register,
                    });
                }
            }
        }
        Ok(notes)
    }
}

type TestSession = Session<Audio, VirtualPlayer, Display, Notation>;

fn session(settings: Settings) -> TestSession {
    Session::new(
        settings,
        Audio::default(),
        VirtualPlayer::new(),
        Display::default(),
        Notation::default(),
    )
}

/// Convert and deliver both load completions
fn ready(session: &mut TestSession, text: &str) {
    session.convert(text).unwrap();
    session.run_until_idle();
    let generation = session.generation();
    session.instrument_loaded(generation);
}

fn display(session: &TestSession) -> &Display {
    session.synchronizer().sink()
}

#[test]
fn test_hi_chromatic_end_to_end() {
    let settings = Settings {
        interval: Interval::Chromatic,
        tempo: 120,
        ..Settings::default()
    };
    let mut session = session(settings);
    ready(&mut session, "HI");

    let composition = session.composition().unwrap();
    assert_eq!(composition.measures.len(), 1);
    assert_eq!(composition.timeline.filler_count(), 0);
    assert_eq!(composition.song_time(), "0:01");
    assert_eq!(session.synchronizer().song_time().as_deref(), Some("0:01"));

    session.play().unwrap();
    session.run_until_idle();

    let display = display(&session);
    assert_eq!(display.sounds, [("G3".to_string(), 0.5), ("G#3".to_string(), 0.5)]);
    assert_eq!(display.letters, [0, 1]);
    assert_eq!(display.pairs.len(), 2);
    assert_eq!(display.clears, 1);
    assert_eq!(session.state(), PlaybackState::Stopped);
}

#[test]
fn test_ab_cd_transcript_and_measures() {
    let transcript = transcribe("AB CD", Interval::CMajor, 3);
    let names: Vec<Vec<String>> = transcript
        .words
        .iter()
        .map(|w| w.iter().map(|p| p.to_string()).collect())
        .collect();
    assert_eq!(names, [["C3", "D3"], ["E3", "F3"]]);

    let mut session = session(Settings {
        rest_on_spaces: true,
        ..Settings::default()
    });
    let composition = session.convert("ab cd").unwrap();
    assert_eq!(composition.text.as_string(), "AB CD");
    assert_eq!(composition.measures.len(), 2);
    assert_eq!(composition.timeline.note_ons().len(), 5);
}

#[test]
fn test_rests_play_silently_but_advance_score() {
    let mut session = session(Settings {
        rest_on_spaces: true,
        ..Settings::default()
    });
    ready(&mut session, "AB CD");
    session.play().unwrap();
    session.run_until_idle();

    let display = display(&session);
    assert_eq!(display.pairs.len(), 5);
    assert_eq!(display.playhead, [0.0, 0.2, 0.4, 0.6, 0.8]);
    // the space at position 2 is never highlighted
    assert_eq!(display.letters, [0, 1, 3, 4]);
    let notes: Vec<&str> = display.sounds.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(notes, ["C3", "D3", "E3", "F3"]);
    assert!(display.sounds.iter().all(|(_, secs)| *secs == 0.3));
}

#[test]
fn test_six_letters_pad_second_measure() {
    let mut session = session(Settings::default());
    let composition = session.convert("ABCDEF").unwrap();
    assert_eq!(composition.measures.len(), 2);
    let second = &composition.measures[1];
    assert_eq!(second.treble_tokens().len(), 4);
    assert_eq!(second.bass_tokens().len(), 4);
    assert_eq!(session.layout().systems.len(), 2);
    assert_eq!(session.layout().highlights.len(), 8);
}

#[test]
fn test_registers_split_at_threshold() {
    let mut session = session(Settings {
        octave: 4,
        ..Settings::default()
    });
    let composition = session.convert("AZ").unwrap();
    for measure in &composition.measures {
        for token in measure.treble_tokens() {
            if let Some(note) = token.strip_suffix("/q") {
                let pitch: musical_linguistics::Pitch = note.parse().unwrap();
                assert_eq!(pitch.register(), Register::Treble);
            }
        }
        for token in measure.bass_tokens() {
            if let Some(note) = token.strip_suffix("/q") {
                let pitch: musical_linguistics::Pitch = note.parse().unwrap();
                assert_eq!(pitch.register(), Register::Bass);
            }
        }
    }
    assert!(composition.measures[0].treble_tokens().contains(&"B4/q/r".to_string()));
}

#[test]
fn test_play_before_instrument_loaded() {
    let mut session = session(Settings::default());
    session.convert("HELLO").unwrap();
    session.run_until_idle();

    assert!(!session.can_play());
    assert_eq!(session.play(), Err(PlaybackWarning::InstrumentNotLoaded));
    assert_eq!(session.state(), PlaybackState::Stopped);
    assert!(display(&session).sounds.is_empty());
}

#[test]
fn test_stop_twice() {
    let mut session = session(Settings::default());
    ready(&mut session, "HELLO");
    session.play().unwrap();
    session.step();
    session.step();

    session.stop();
    session.stop();
    assert_eq!(session.state(), PlaybackState::Stopped);
    assert_eq!(display(&session).clears, 1);
    assert!(!session.can_stop());
}

#[test]
fn test_convert_during_playback_discards_old_events() {
    let mut session = session(Settings::default());
    ready(&mut session, "HELLO");
    session.play().unwrap();
    let stale = session.synchronizer_mut().player_mut().next_event();
    assert!(matches!(stale, Some(PlayerEvent::NoteOn { .. })));

    session.convert("WORLD").unwrap();
    assert_eq!(session.state(), PlaybackState::Stopped);
    assert!(!session.can_play());

    let before = display(&session).sounds.len();
    if let Some(event) = stale {
        session.handle(event);
    }
    assert_eq!(display(&session).sounds.len(), before);

    // completions from the first convert do not make the second one ready
    session.instrument_loaded(Generation(1));
    session.run_until_idle();
    assert!(!session.can_play());
    session.instrument_loaded(session.generation());
    assert!(session.can_play());
}

#[test]
fn test_pause_resume_finishes_song() {
    let mut session = session(Settings::default());
    ready(&mut session, "ABCD");
    session.play().unwrap();
    session.step();
    session.step();
    session.pause().unwrap();
    assert_eq!(session.step(), None);

    session.play().unwrap();
    session.run_until_idle();
    let notes: Vec<&str> = display(&session)
        .sounds
        .iter()
        .map(|(n, _)| n.as_str())
        .collect();
    assert_eq!(notes, ["C3", "D3", "E3", "F3"]);
}

#[test]
fn test_settings_apply_on_next_convert() {
    let mut session = session(Settings::default());
    session.convert("A").unwrap();
    session.settings_mut().instrument = Instrument::Marimba;
    session.settings_mut().octave = 5;
    assert_eq!(session.composition().unwrap().settings.octave, 3);

    let composition = session.convert("A").unwrap();
    assert_eq!(composition.transcript.words[0][0].to_string(), "C5");
    assert_eq!(
        session.audio().requests,
        [
            (Instrument::AcousticGrandPiano, Generation(1)),
            (Instrument::Marimba, Generation(2)),
        ]
    );
}

#[test]
fn test_empty_text() {
    let mut session = session(Settings::default());
    ready(&mut session, "123 !?");
    let composition = session.composition().unwrap();
    assert!(composition.transcript.is_empty());
    assert!(session.layout().systems.is_empty());

    session.play().unwrap();
    session.run_until_idle();
    assert!(display(&session).sounds.is_empty());
    assert_eq!(session.state(), PlaybackState::Stopped);
}

#[test]
fn test_text_to_midi() {
    let settings = Settings::from_yaml("interval: cminor\ntempo: 100").unwrap();
    let bytes = text_to_midi("Hello", &settings).unwrap();
    let timeline = decode(&bytes).unwrap();
    assert_eq!(timeline.tempo_bpm, 100);
    let expected: Vec<u8> = "HELLO"
        .chars()
        .map(|c| pitch_at(c as i32 - 'A' as i32, Interval::CMinor, 3).midi_key())
        .collect();
    let keys: Vec<u8> = timeline.note_ons().iter().map(|n| n.pitch.midi_key()).collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_high_arpeggios_sound_as_written() {
    let mut session = session(Settings {
        interval: Interval::Arpeggios,
        ..Settings::default()
    });
    ready(&mut session, "VZ");
    let written: Vec<String> = session
        .composition()
        .unwrap()
        .transcript
        .pitches()
        .map(|p| p.to_string())
        .collect();
    assert_eq!(written, ["C10", "E11"]);

    session.play().unwrap();
    session.run_until_idle();
    let notes: Vec<&str> = display(&session)
        .sounds
        .iter()
        .map(|(n, _)| n.as_str())
        .collect();
    assert_eq!(notes, ["C10", "E11"]);
}

#[test]
fn test_slow_tempo_lengths_agree() {
    let mut session = session(Settings {
        tempo: 1,
        ..Settings::default()
    });
    ready(&mut session, "HI");
    assert_eq!(session.composition().unwrap().song_time(), "2:00");
    assert_eq!(session.synchronizer().song_time().as_deref(), Some("2:00"));
    assert_eq!(session.synchronizer().player().total_duration_secs(), 120.0);

    session.play().unwrap();
    session.run_until_idle();
    assert!(display(&session).sounds.iter().all(|(_, secs)| *secs == 60.0));
}
