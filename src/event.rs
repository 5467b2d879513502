// src/event.rs

use crate::note_table::{NoteEntry, PitchClass};

/// Velocity used by sources that have none (pointer, computer keyboard).
pub const MAX_VELOCITY: u8 = 127;

/// Identity of one playable note.
///
/// Used to deduplicate sounding voices, so it must stay stable for the
/// whole life of a press. Every `NoteEntry` produces the `Midi` form;
/// `Named` is accepted wherever a note is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceKey {
    Midi(u8),
    Named { octave: u8, pitch: PitchClass },
}

impl VoiceKey {
    /// The `Midi` form of this key, so both forms of one note compare equal.
    ///
    /// Names that fall outside MIDI (0..=127) stay `Named`.
    pub fn canonical(self) -> VoiceKey {
        match self {
            VoiceKey::Midi(_) => self,
            VoiceKey::Named { octave, pitch } => octave
                .checked_add(1)
                .and_then(|o| o.checked_mul(12))
                .and_then(|base| base.checked_add(pitch.index()))
                .filter(|&midi| midi <= 127)
                .map_or(self, VoiceKey::Midi),
        }
    }
}

/// Where an input event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    ComputerKey,
    Midi,
    /// Programmatic press/release from the host.
    Host,
}

/// ===============================
/// Normalized input event
/// ===============================

/// A press or release, in the same shape for every input source.
///
/// This is the only thing the voice manager consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub key: VoiceKey,
    pub pressed: bool,
    pub velocity: u8,
    /// Frequency in Hz of the note being pressed or released.
    pub frequency: f64,
    pub source: InputSource,
}

impl InputEvent {
    pub fn press(note: &NoteEntry, velocity: u8, source: InputSource) -> Self {
        Self {
            key: note.voice_key(),
            pressed: true,
            velocity: velocity.min(MAX_VELOCITY),
            frequency: note.frequency,
            source,
        }
    }

    pub fn release(note: &NoteEntry, source: InputSource) -> Self {
        Self {
            key: note.voice_key(),
            pressed: false,
            velocity: 0,
            frequency: note.frequency,
            source,
        }
    }
}
