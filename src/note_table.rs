// src/note_table.rs
//
// Canonical note -> frequency -> MIDI number table.
//
// One complete octave is seeded from known equal-tempered frequencies and
// every later octave is derived from the previous octave's entry for the
// same pitch class. The table closes with a single C8.

use std::collections::HashMap;
use std::fmt;

use crate::event::VoiceKey;

/// Tuning reference.
pub const A4_FREQUENCY: f64 = 440.0;
pub const A4_MIDI: u8 = 69;

/// First (seeded) octave of the table.
pub const FIRST_OCTAVE: u8 = 1;
/// Last complete octave of the table.
pub const LAST_FULL_OCTAVE: u8 = 7;
/// Octave holding the single closing note.
pub const TOP_OCTAVE: u8 = 8;

/// MIDI number of C1, the lowest note in the table.
pub const LOWEST_MIDI: u8 = 24;
/// MIDI number of C8, the highest note in the table.
pub const HIGHEST_MIDI: u8 = 108;

const SEMITONES: u8 = 12;

/// Octave 1 in canonical pitch-class order.
const OCTAVE_ONE: [(PitchClass, f64); 12] = [
    (PitchClass::C, 32.70319566257483),
    (PitchClass::CSharp, 34.64782887210901),
    (PitchClass::D, 36.70809598967595),
    (PitchClass::DSharp, 38.89087296526011),
    (PitchClass::E, 41.20344461410874),
    (PitchClass::F, 43.65352892912549),
    (PitchClass::FSharp, 46.2493028389543),
    (PitchClass::G, 48.99942949771866),
    (PitchClass::GSharp, 51.91308719749314),
    (PitchClass::A, 55.0),
    (PitchClass::ASharp, 58.27047018976124),
    (PitchClass::B, 61.73541265701551),
];

/// One of the twelve pitch classes, named with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes in canonical (ascending) order.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitone offset from C.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// White key on a piano keyboard.
    pub fn is_natural(self) -> bool {
        self.name().len() == 1
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single playable note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEntry {
    pub pitch: PitchClass,
    pub octave: u8,
    /// Frequency in Hz.
    pub frequency: f64,
    pub midi: u8,
}

impl NoteEntry {
    /// Stable identity used to deduplicate sounding voices.
    #[inline]
    pub fn voice_key(&self) -> VoiceKey {
        VoiceKey::Midi(self.midi)
    }

    /// Derive the same pitch class one octave up.
    fn octave_up(&self) -> Self {
        Self {
            pitch: self.pitch,
            octave: self.octave + 1,
            frequency: self.frequency * 2.0,
            midi: self.midi + SEMITONES,
        }
    }
}

impl fmt::Display for NoteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch, self.octave)
    }
}

/// Equal-tempered frequency of a MIDI note number.
#[inline]
pub fn frequency_for_midi(midi: u8) -> f64 {
    A4_FREQUENCY * 2.0_f64.powf((midi as f64 - A4_MIDI as f64) / SEMITONES as f64)
}

/// Ordered, immutable table of every note the instrument can play.
///
/// Ordered by (octave, pitch class). Rebuilt rather than mutated when the
/// configuration changes.
#[derive(Debug, Clone)]
pub struct NoteTable {
    entries: Vec<NoteEntry>,
    by_midi: HashMap<u8, usize>,
    by_name: HashMap<(u8, PitchClass), usize>,
}

impl NoteTable {
    /// Build the full C1..=C8 table.
    pub fn build() -> Self {
        let mut entries = Vec::with_capacity(
            (LAST_FULL_OCTAVE - FIRST_OCTAVE + 1) as usize * SEMITONES as usize + 1,
        );

        let mut previous: [NoteEntry; 12] = OCTAVE_ONE.map(|(pitch, frequency)| NoteEntry {
            pitch,
            octave: FIRST_OCTAVE,
            frequency,
            midi: LOWEST_MIDI + pitch.index(),
        });
        entries.extend_from_slice(&previous);

        for _ in (FIRST_OCTAVE + 1)..=LAST_FULL_OCTAVE {
            // Index by pitch class, never by position in `entries`
            previous = PitchClass::ALL.map(|pitch| previous[pitch.index() as usize].octave_up());
            entries.extend_from_slice(&previous);
        }

        let c1 = OCTAVE_ONE[PitchClass::C.index() as usize].1;
        entries.push(NoteEntry {
            pitch: PitchClass::C,
            octave: TOP_OCTAVE,
            frequency: c1 * 2.0_f64.powi((TOP_OCTAVE - FIRST_OCTAVE) as i32),
            midi: HIGHEST_MIDI,
        });

        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<NoteEntry>) -> Self {
        let by_midi = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.midi, i))
            .collect();
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| ((e.octave, e.pitch), i))
            .collect();

        Self {
            entries,
            by_midi,
            by_name,
        }
    }

    #[inline]
    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_midi(&self, midi: u8) -> Option<&NoteEntry> {
        self.by_midi.get(&midi).map(|&i| &self.entries[i])
    }

    pub fn by_name(&self, pitch: PitchClass, octave: u8) -> Option<&NoteEntry> {
        self.by_name.get(&(octave, pitch)).map(|&i| &self.entries[i])
    }

    /// Look up the entry for either form of voice key.
    pub fn resolve(&self, key: VoiceKey) -> Option<&NoteEntry> {
        match key {
            VoiceKey::Midi(midi) => self.by_midi(midi),
            VoiceKey::Named { octave, pitch } => self.by_name(pitch, octave),
        }
    }
}

impl Default for NoteTable {
    fn default() -> Self {
        Self::build()
    }
}
