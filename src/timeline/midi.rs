//! Standard MIDI File encoding of a [`Timeline`]
//!
//! The artifact is a single-track (format 0) file: a tempo meta event at tick
//! 0, the note events on channel 0, and an end-of-track marker. Filler notes
//! are written as note-ons with velocity 0, the way playback engines expect
//! them; [`decode`] keeps them as note-ons.
//!
//! A tempo meta event holds at most 0xFFFFFF microseconds per quarter (about
//! 3.6 bpm). Slower timelines are written at an integer multiple of their
//! tempo with every tick stretched by the same factor, so the file still
//! plays for exactly the timeline's duration. Decoding such a file yields the
//! faster tempo and the stretched ticks.

use super::types::{EventKind, Timeline, TimelineEvent};
use crate::error::{LinguisticsError, Result};
use crate::pitch::Pitch;
use midly::num::{u15, u24, u28, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

const MICROS_PER_MINUTE: u32 = 60_000_000;

/// Largest tempo value a 24-bit meta event holds (about 3.6 bpm)
const MAX_MICROS_PER_BEAT: u32 = 0xFF_FFFF;

/// Microseconds per quarter to write, and the factor ticks are stretched by
fn encoded_tempo(tempo_bpm: u16) -> (u32, u32) {
    let requested = MICROS_PER_MINUTE / tempo_bpm.max(1) as u32;
    let stretch = requested.div_ceil(MAX_MICROS_PER_BEAT);
    (requested / stretch, stretch)
}

fn key(pitch: &Pitch) -> Result<u7> {
    u7::try_from(pitch.midi_key())
        .ok_or_else(|| LinguisticsError::Encode(format!("key out of range for {}", pitch)))
}

fn velocity(value: u8) -> Result<u7> {
    u7::try_from(value)
        .ok_or_else(|| LinguisticsError::Encode(format!("velocity out of range: {}", value)))
}

/// Write the timeline as SMF bytes
pub fn encode(timeline: &Timeline) -> Result<Vec<u8>> {
    let metric = u15::try_from(timeline.ticks_per_beat).ok_or_else(|| {
        LinguisticsError::Encode(format!("ticks per beat overflow: {}", timeline.ticks_per_beat))
    })?;
    let (micros, stretch) = encoded_tempo(timeline.tempo_bpm);
    let micros = u24::try_from(micros).ok_or_else(|| {
        LinguisticsError::Encode(format!("tempo out of range: {}", timeline.tempo_bpm))
    })?;

    let mut track: Vec<TrackEvent<'static>> = Vec::with_capacity(timeline.events.len() + 1);
    // tempo is microseconds per quarter note
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(micros)),
    });

    let mut last_tick = 0u32;
    for event in &timeline.events {
        let overflow = || LinguisticsError::Encode(format!("tick overflow at {}", event.tick));
        let delta = event
            .tick
            .saturating_sub(last_tick)
            .checked_mul(stretch)
            .ok_or_else(overflow)?;
        let delta = u28::try_from(delta).ok_or_else(overflow)?;
        last_tick = event.tick;
        let kind = match event.kind {
            EventKind::NoteOn { pitch, velocity: v } => TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOn {
                    key: key(&pitch)?,
                    vel: velocity(v)?,
                },
            },
            EventKind::NoteOff { pitch } => TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOff {
                    key: key(&pitch)?,
                    vel: 0.into(),
                },
            },
            EventKind::EndOfTrack => TrackEventKind::Meta(MetaMessage::EndOfTrack),
        };
        track.push(TrackEvent { delta, kind });
    }

    let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(metric)));
    smf.tracks.push(track);

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)
        .map_err(|e| LinguisticsError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Read an SMF artifact back into a timeline.
///
/// All tracks are merged by absolute tick. Pitches come back spelled with
/// sharps, so `Eb3` decodes as `D#3`.
pub fn decode(bytes: &[u8]) -> Result<Timeline> {
    let smf = Smf::parse(bytes).map_err(|e| LinguisticsError::Artifact(e.to_string()))?;
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) => tpb.as_int(),
        Timing::Timecode(..) => {
            return Err(LinguisticsError::Artifact("timecode timing is not supported".to_string()))
        }
    };

    let mut tempo_bpm = 120u16;
    let mut events = Vec::new();
    let mut end_tick = 0u32;
    for track in &smf.tracks {
        let mut tick = 0u32;
        for event in track {
            tick += event.delta.as_int();
            match &event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(micros)) if tick == 0 => {
                    let micros = micros.as_int().max(1);
                    tempo_bpm = (MICROS_PER_MINUTE / micros).clamp(1, u16::MAX as u32) as u16;
                }
                TrackEventKind::Meta(MetaMessage::EndOfTrack) => end_tick = end_tick.max(tick),
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, vel },
                    ..
                } => events.push(TimelineEvent {
                    tick,
                    kind: EventKind::NoteOn {
                        pitch: Pitch::from_midi_key(key.as_int()),
                        velocity: vel.as_int(),
                    },
                }),
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { key, .. },
                    ..
                } => events.push(TimelineEvent {
                    tick,
                    kind: EventKind::NoteOff {
                        pitch: Pitch::from_midi_key(key.as_int()),
                    },
                }),
                _ => {}
            }
        }
    }

    // stable: same-tick events keep their file order
    events.sort_by_key(|e| e.tick);
    let last = events.last().map(|e| e.tick).unwrap_or(0);
    events.push(TimelineEvent {
        tick: end_tick.max(last),
        kind: EventKind::EndOfTrack,
    });

    Ok(Timeline {
        tempo_bpm,
        ticks_per_beat,
        events,
    })
}
