//! # Error Types
//!
//! Two families of errors live here.
//!
//! - [`LinguisticsError`] - failures of the conversion pipeline (bad settings,
//!   artifact encoding/decoding, notation engine failures, I/O in the binary).
//! - [`PlaybackWarning`] - precondition failures of the transport controls.
//!   These are never fatal: the operation is ignored and the state is kept.
//!
//! Out-of-range letters are not errors at all; they map to the fallback pitch
//! (see [`crate::scale::FALLBACK_PITCH`]).
//!
//! ## Usage
//! ```rust
//! use musical_linguistics::{PlaybackWarning, Settings};
//!
//! match Settings::from_yaml("interval: dorian") {
//!     Ok(settings) => println!("tempo {}", settings.tempo),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//!
//! let warning = PlaybackWarning::InstrumentNotLoaded;
//! assert_eq!(warning.to_string(), "Instrument not yet loaded");
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinguisticsError {
    /// Invalid settings value.
    ///
    /// # Example
    /// ```
    /// # use musical_linguistics::LinguisticsError;
    /// let err = LinguisticsError::Config("unknown interval: dorian".to_string());
    /// assert_eq!(err.to_string(), "Invalid settings: unknown interval: dorian");
    /// ```
    #[error("Invalid settings: {0}")]
    Config(String),

    /// The timeline could not be written as a MIDI file.
    #[error("Failed to encode timeline: {0}")]
    Encode(String),

    /// A MIDI artifact could not be decoded by the player.
    #[error("Unreadable artifact: {0}")]
    Artifact(String),

    /// The notation engine failed while laying out or drawing the score.
    ///
    /// # Example
    /// ```
    /// # use musical_linguistics::LinguisticsError;
    /// let err = LinguisticsError::Render { message: "too many ticks in voice".to_string() };
    /// assert_eq!(err.to_string(), "Score rendering failed: too many ticks in voice");
    /// ```
    #[error("Score rendering failed: {message}")]
    Render { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A transport control was used in a state that does not allow it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackWarning {
    #[error("No timeline found, convert some text first")]
    NoTimeline,

    #[error("Timeline not yet loaded by the player")]
    ArtifactNotLoaded,

    #[error("Instrument not yet loaded")]
    InstrumentNotLoaded,

    #[error("Playback is already running")]
    AlreadyPlaying,

    #[error("Cannot pause playback: player is not currently playing")]
    NotPlaying,
}

pub type Result<T> = std::result::Result<T, LinguisticsError>;
