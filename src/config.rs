//! # Settings
//!
//! The five user choices that shape a conversion: interval, instrument,
//! starting octave, tempo and whether spaces become rests.
//!
//! Settings can be written as a small YAML document:
//!
//! ```yaml
//! interval: chromatic
//! instrument: marimba
//! octave: 4
//! tempo: "150"
//! rest-on-spaces: true
//! ```
//!
//! Missing keys keep their defaults. Octave and tempo accept numbers or
//! numeric strings; anything else falls back to the default, and values out
//! of range are clamped. Unknown interval or instrument ids are errors.

use crate::error::{LinguisticsError, Result};
use crate::scale::{Interval, DEFAULT_OCTAVE};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_OCTAVE: i32 = 1;
pub const MAX_OCTAVE: i32 = 6;
pub const DEFAULT_TEMPO: u16 = 200;
pub const MIN_TEMPO: u16 = 1;
pub const MAX_TEMPO: u16 = 1000;

/// Instrument the audio engine loads samples for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    #[default]
    AcousticGrandPiano,
    Marimba,
    Vibraphone,
    AcousticGuitarSteel,
    ElectricGuitarClean,
    Clarinet,
    AltoSax,
    Flute,
    Violin,
    Trumpet,
    ChoirAahs,
}

impl Instrument {
    pub const ALL: [Instrument; 11] = [
        Instrument::AcousticGrandPiano,
        Instrument::Marimba,
        Instrument::Vibraphone,
        Instrument::AcousticGuitarSteel,
        Instrument::ElectricGuitarClean,
        Instrument::Clarinet,
        Instrument::AltoSax,
        Instrument::Flute,
        Instrument::Violin,
        Instrument::Trumpet,
        Instrument::ChoirAahs,
    ];

    pub fn from_id(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|instrument| instrument.id().eq_ignore_ascii_case(s.trim()))
    }

    /// Sample set name, e.g. `acoustic_grand_piano`
    pub fn id(&self) -> &'static str {
        match self {
            Instrument::AcousticGrandPiano => "acoustic_grand_piano",
            Instrument::Marimba => "marimba",
            Instrument::Vibraphone => "vibraphone",
            Instrument::AcousticGuitarSteel => "acoustic_guitar_steel",
            Instrument::ElectricGuitarClean => "electric_guitar_clean",
            Instrument::Clarinet => "clarinet",
            Instrument::AltoSax => "alto_sax",
            Instrument::Flute => "flute",
            Instrument::Violin => "violin",
            Instrument::Trumpet => "trumpet",
            Instrument::ChoirAahs => "choir_aahs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Instrument::AcousticGrandPiano => "Piano",
            Instrument::Marimba => "Marimba",
            Instrument::Vibraphone => "Vibraphone",
            Instrument::AcousticGuitarSteel => "Acoustic Guitar",
            Instrument::ElectricGuitarClean => "Electric Guitar",
            Instrument::Clarinet => "Clarinet",
            Instrument::AltoSax => "Saxophone",
            Instrument::Flute => "Flute",
            Instrument::Violin => "Violin",
            Instrument::Trumpet => "Trumpet",
            Instrument::ChoirAahs => "Choir \"Aah\"",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub interval: Interval,
    pub instrument: Instrument,
    pub octave: i32,
    pub tempo: u16,
    pub rest_on_spaces: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: Interval::default(),
            instrument: Instrument::default(),
            octave: DEFAULT_OCTAVE,
            tempo: DEFAULT_TEMPO,
            rest_on_spaces: false,
        }
    }
}

/// Raw settings for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
struct RawSettings {
    interval: Option<String>,
    instrument: Option<String>,
    octave: Option<serde_yaml::Value>, // number or numeric string
    tempo: Option<serde_yaml::Value>,
    rest_on_spaces: Option<bool>,
}

impl Settings {
    /// Parse a YAML settings document
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        let raw: RawSettings =
            serde_yaml::from_str(content).map_err(|e| LinguisticsError::Config(e.to_string()))?;

        let mut settings = Settings::default();
        if let Some(id) = &raw.interval {
            settings.set_interval(id)?;
        }
        if let Some(id) = &raw.instrument {
            settings.set_instrument(id)?;
        }
        if let Some(value) = &raw.octave {
            settings.octave = clamp_octave(number(value));
        }
        if let Some(value) = &raw.tempo {
            settings.tempo = clamp_tempo(number(value));
        }
        if let Some(rest) = raw.rest_on_spaces {
            settings.rest_on_spaces = rest;
        }
        Ok(settings)
    }

    pub fn set_interval(&mut self, id: &str) -> Result<()> {
        self.interval = Interval::from_id(id)
            .ok_or_else(|| LinguisticsError::Config(format!("unknown interval: {}", id)))?;
        Ok(())
    }

    pub fn set_instrument(&mut self, id: &str) -> Result<()> {
        self.instrument = Instrument::from_id(id)
            .ok_or_else(|| LinguisticsError::Config(format!("unknown instrument: {}", id)))?;
        Ok(())
    }

    /// Set the octave from user text; non-numeric text gives the default
    pub fn set_octave(&mut self, text: &str) {
        self.octave = clamp_octave(text.trim().parse().ok());
    }

    /// Set the tempo from user text; non-numeric text gives the default
    pub fn set_tempo(&mut self, text: &str) {
        self.tempo = clamp_tempo(text.trim().parse().ok());
    }
}

fn number(value: &serde_yaml::Value) -> Option<f64> {
    match value {
        serde_yaml::Value::Number(n) => n.as_f64(),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn clamp_octave(value: Option<f64>) -> i32 {
    match value {
        Some(v) if v.is_finite() => (v.trunc() as i32).clamp(MIN_OCTAVE, MAX_OCTAVE),
        _ => DEFAULT_OCTAVE,
    }
}

fn clamp_tempo(value: Option<f64>) -> u16 {
    match value {
        Some(v) if v.is_finite() => v.trunc().clamp(MIN_TEMPO as f64, MAX_TEMPO as f64) as u16,
        _ => DEFAULT_TEMPO,
    }
}
