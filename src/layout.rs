// src/layout.rs
//
// Keyboard view model: the ordered key widgets a view draws.
//
// A widget carries the identity of its note so the view can hand it back
// with pointer events. Rebuilding replaces the whole widget list.

use rand::Rng;

use crate::config::KeyboardConfig;
use crate::event::VoiceKey;
use crate::note_table::{NoteEntry, NoteTable, PitchClass};

/// Text drawn on a key: pitch name with the octave as a subscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLabel {
    pub name: &'static str,
    pub octave: u8,
}

/// One drawn key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyWidget {
    pub note: NoteEntry,
    pub label: Option<KeyLabel>,
}

impl KeyWidget {
    #[inline]
    pub fn voice_key(&self) -> VoiceKey {
        self.note.voice_key()
    }

    pub fn pitch(&self) -> PitchClass {
        self.note.pitch
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    /// Widgets in drawn order.
    keys: Vec<KeyWidget>,
    /// Playable notes in low-to-high order, independent of arrangement.
    playable: Vec<NoteEntry>,
}

impl KeyboardLayout {
    pub fn build<R: Rng + ?Sized>(
        table: &NoteTable,
        config: &KeyboardConfig,
        rng: &mut R,
    ) -> Self {
        let playable: Vec<NoteEntry> = table
            .iter()
            .filter(|n| config.range.contains(n.midi))
            .filter(|n| !config.naturals_only || n.pitch.is_natural())
            .copied()
            .collect();

        let mut keys: Vec<KeyWidget> = playable
            .iter()
            .map(|&note| KeyWidget {
                note,
                label: config.show_note_names.then_some(KeyLabel {
                    name: note.pitch.name(),
                    octave: note.octave,
                }),
            })
            .collect();
        config.arrangement.apply(&mut keys, rng);

        log::info!(
            "Built keyboard: {} keys, {}, labels {}",
            keys.len(),
            config.arrangement,
            if config.show_note_names { "on" } else { "off" }
        );

        Self { keys, playable }
    }

    #[inline]
    pub fn keys(&self) -> &[KeyWidget] {
        &self.keys
    }

    pub fn widget(&self, index: usize) -> Option<&KeyWidget> {
        self.keys.get(index)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Playable notes lowest first; what the computer keyboard indexes.
    pub fn playable(&self) -> &[NoteEntry] {
        &self.playable
    }

    /// Drawn index of a note, for highlighting keys played from elsewhere.
    pub fn position_of(&self, key: VoiceKey) -> Option<usize> {
        let key = key.canonical();
        self.keys.iter().position(|w| w.voice_key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyArrangement;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn midis(layout: &KeyboardLayout) -> Vec<u8> {
        layout.keys().iter().map(|w| w.note.midi).collect()
    }

    #[test]
    fn test_default_layout() {
        let table = NoteTable::build();
        let config = KeyboardConfig::default();
        let layout = KeyboardLayout::build(&table, &config, &mut StdRng::seed_from_u64(1));

        assert_eq!(layout.len(), 61);
        assert_eq!(midis(&layout), (36..=96).collect::<Vec<_>>());
        assert_eq!(
            layout.widget(0).unwrap().label,
            Some(KeyLabel { name: "C", octave: 2 })
        );
    }

    #[test]
    fn test_high_to_low() {
        let table = NoteTable::build();
        let config = KeyboardConfig {
            arrangement: KeyArrangement::HighToLow,
            ..KeyboardConfig::default()
        };
        let layout = KeyboardLayout::build(&table, &config, &mut StdRng::seed_from_u64(1));

        assert_eq!(midis(&layout), (36..=96).rev().collect::<Vec<_>>());
        // Playable order does not follow the arrangement
        assert_eq!(layout.playable()[0].midi, 36);
    }

    #[test]
    fn test_random_is_permutation() {
        let table = NoteTable::build();
        let config = KeyboardConfig {
            arrangement: KeyArrangement::Random,
            ..KeyboardConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let layout = KeyboardLayout::build(&table, &config, &mut rng);

        let mut sorted = midis(&layout);
        assert_ne!(sorted, (36..=96).collect::<Vec<_>>());
        sorted.sort();
        assert_eq!(sorted, (36..=96).collect::<Vec<_>>());
    }

    #[test]
    fn test_labels_hidden() {
        let table = NoteTable::build();
        let config = KeyboardConfig {
            show_note_names: false,
            ..KeyboardConfig::default()
        };
        let layout = KeyboardLayout::build(&table, &config, &mut StdRng::seed_from_u64(1));
        assert!(layout.keys().iter().all(|w| w.label.is_none()));
    }

    #[test]
    fn test_naturals_only() {
        let table = NoteTable::build();
        let config = KeyboardConfig {
            naturals_only: true,
            ..KeyboardConfig::default()
        };
        let layout = KeyboardLayout::build(&table, &config, &mut StdRng::seed_from_u64(1));

        // 5 octaves of 7 white keys plus the top C
        assert_eq!(layout.len(), 36);
        assert!(layout.keys().iter().all(|w| w.pitch().is_natural()));
    }

    #[test]
    fn test_position_of() {
        let table = NoteTable::build();
        let config = KeyboardConfig {
            arrangement: KeyArrangement::HighToLow,
            ..KeyboardConfig::default()
        };
        let layout = KeyboardLayout::build(&table, &config, &mut StdRng::seed_from_u64(1));

        assert_eq!(layout.position_of(VoiceKey::Midi(96)), Some(0));
        assert_eq!(
            layout.position_of(VoiceKey::Named {
                octave: 2,
                pitch: PitchClass::C
            }),
            Some(60)
        );
        assert_eq!(layout.position_of(VoiceKey::Midi(100)), None);
    }
}
