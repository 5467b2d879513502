// src/voice.rs

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, SynthError};

/// Oscillator shape for newly started voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
    /// Backend-defined periodic wave.
    Custom,
}

impl Waveform {
    pub const ALL: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
        Waveform::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Custom => "custom",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.name() == s)
            .ok_or_else(|| ConfigError::UnknownWaveform(s.to_string()))
    }
}

/// Produces and silences audio voices.
///
/// Voices do NOT know which note they belong to; the voice manager keeps
/// that mapping. A handle is created on press and handed back exactly
/// once on release.
pub trait SynthBackend {
    /// Handle to one live voice.
    type Voice;

    /// Start a voice. Audible immediately.
    fn create_voice(&mut self, frequency: f64, waveform: Waveform)
    -> Result<Self::Voice, SynthError>;

    /// Stop a voice and release its resources.
    fn stop_voice(&mut self, voice: Self::Voice);

    /// Set the shared output gain, in `[0, 1]`.
    fn set_gain(&mut self, gain: f32);

    fn gain(&self) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_names_round_trip() {
        for waveform in Waveform::ALL {
            assert_eq!(waveform.to_string().parse::<Waveform>(), Ok(waveform));
        }
    }

    #[test]
    fn test_unknown_waveform() {
        assert_eq!(
            "noise".parse::<Waveform>(),
            Err(ConfigError::UnknownWaveform("noise".into()))
        );
    }
}
