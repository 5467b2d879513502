// src/config.rs
//
// Configuration surface consumed by the instrument.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ConfigError;
use crate::note_table::{HIGHEST_MIDI, LOWEST_MIDI};
use crate::voice::Waveform;

// Default keyboard: 61 keys, C2..=C7
const DEFAULT_LOW_MIDI: u8 = 36;
const DEFAULT_HIGH_MIDI: u8 = 96;
const DEFAULT_VOLUME: f32 = 0.5;

/// Order in which keys are drawn.
///
/// Only changes presentation; note identities are untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyArrangement {
    #[default]
    LowToHigh,
    HighToLow,
    /// Shuffled on every rebuild.
    Random,
}

impl KeyArrangement {
    pub const ALL: [KeyArrangement; 3] = [
        KeyArrangement::LowToHigh,
        KeyArrangement::HighToLow,
        KeyArrangement::Random,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KeyArrangement::LowToHigh => "low-to-high",
            KeyArrangement::HighToLow => "high-to-low",
            KeyArrangement::Random => "random",
        }
    }

    /// Reorder items that are given in low-to-high order.
    pub fn apply<T, R: Rng + ?Sized>(self, items: &mut [T], rng: &mut R) {
        match self {
            KeyArrangement::LowToHigh => {}
            KeyArrangement::HighToLow => items.reverse(),
            KeyArrangement::Random => items.shuffle(rng),
        }
    }
}

impl fmt::Display for KeyArrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyArrangement {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| ConfigError::UnknownArrangement(s.to_string()))
    }
}

/// Inclusive MIDI range of the rendered keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRange {
    low: u8,
    high: u8,
}

impl KeyRange {
    /// Must lie within the note table and not be empty.
    pub fn new(low: u8, high: u8) -> Result<Self, ConfigError> {
        if low > high || low < LOWEST_MIDI || high > HIGHEST_MIDI {
            return Err(ConfigError::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    /// The whole note table.
    pub fn full() -> Self {
        Self {
            low: LOWEST_MIDI,
            high: HIGHEST_MIDI,
        }
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    #[inline]
    pub fn contains(&self, midi: u8) -> bool {
        (self.low..=self.high).contains(&midi)
    }

    pub fn len(&self) -> usize {
        (self.high - self.low) as usize + 1
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_MIDI,
            high: DEFAULT_HIGH_MIDI,
        }
    }
}

/// Everything the host can configure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardConfig {
    /// Waveform for newly started voices.
    pub waveform: Waveform,
    /// Label keys with their note names. Rebuilds the keyboard.
    pub show_note_names: bool,
    /// Rebuilds the keyboard.
    pub arrangement: KeyArrangement,
    /// Shared output gain in `[0, 1]`.
    pub volume: f32,
    /// Rebuilds the keyboard.
    pub range: KeyRange,
    /// Only draw natural (white) keys. Rebuilds the keyboard.
    pub naturals_only: bool,
}

impl KeyboardConfig {
    /// Whether going from `self` to `other` needs a keyboard rebuild.
    pub fn needs_rebuild(&self, other: &KeyboardConfig) -> bool {
        self.show_note_names != other.show_note_names
            || self.arrangement != other.arrangement
            || self.range != other.range
            || self.naturals_only != other.naturals_only
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            show_note_names: true,
            arrangement: KeyArrangement::LowToHigh,
            volume: DEFAULT_VOLUME,
            range: KeyRange::default(),
            naturals_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_arrangement_names() {
        for arrangement in KeyArrangement::ALL {
            assert_eq!(arrangement.name().parse::<KeyArrangement>(), Ok(arrangement));
        }
        assert!(matches!(
            "sideways".parse::<KeyArrangement>(),
            Err(ConfigError::UnknownArrangement(_))
        ));
    }

    #[test]
    fn test_arrangement_apply() {
        let mut rng = StdRng::seed_from_u64(7);

        let mut items = vec![1, 2, 3, 4];
        KeyArrangement::HighToLow.apply(&mut items, &mut rng);
        assert_eq!(items, vec![4, 3, 2, 1]);

        let mut items: Vec<u32> = (0..32).collect();
        KeyArrangement::Random.apply(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_default_range_has_61_keys() {
        let range = KeyRange::default();
        assert_eq!(range.len(), 61);
        assert!(range.contains(60));
        assert!(!range.contains(97));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(KeyRange::new(60, 48).is_err());
        assert!(KeyRange::new(20, 60).is_err());
        assert!(KeyRange::new(60, 109).is_err());
        assert_eq!(KeyRange::new(24, 108), Ok(KeyRange::full()));
    }

    #[test]
    fn test_needs_rebuild() {
        let config = KeyboardConfig::default();

        let mut louder = config;
        louder.volume = 0.9;
        louder.waveform = Waveform::Square;
        assert!(!config.needs_rebuild(&louder));

        let mut reversed = config;
        reversed.arrangement = KeyArrangement::HighToLow;
        assert!(config.needs_rebuild(&reversed));
    }
}
