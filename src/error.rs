// src/error.rs

use thiserror::Error;

/// A synthesis backend refused to start a voice.
///
/// Returned to whichever input adapter initiated the press; the note
/// stays idle and nothing is registered for it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("Synthesis backend unavailable: {0}")]
    Unavailable(String),

    #[error("Voice limit of {limit} reached")]
    VoiceLimit { limit: usize },

    #[error("Invalid voice frequency {0} Hz")]
    InvalidFrequency(f64),
}

/// Invalid value on the configuration surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown waveform: {0}")]
    UnknownWaveform(String),

    #[error("Unknown key arrangement: {0}")]
    UnknownArrangement(String),

    #[error("Invalid key range {low}..={high}")]
    InvalidRange { low: u8, high: u8 },
}
