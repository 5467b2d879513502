// Physical (computer) keyboard input.

use std::collections::HashMap;

use crate::event::{InputEvent, InputSource, MAX_VELOCITY};
use crate::note_table::NoteEntry;

/// Key codes in playing order, lowest note first.
///
/// Position `i` plays the `i`-th playable note from the bottom of the
/// keyboard, whatever order the keys are currently drawn in.
#[rustfmt::skip]
pub const KEY_CODES: [&str; 52] = [
    "Space",
    "ShiftLeft", "KeyZ", "KeyX", "KeyC", "KeyV", "KeyB", "KeyN", "KeyM", "Comma", "Period", "Slash", "ShiftRight",
    "KeyA", "KeyS", "KeyD", "KeyF", "KeyG", "KeyH", "KeyJ", "KeyK", "KeyL", "Semicolon", "Quote", "Enter",
    "Tab", "KeyQ", "KeyW", "KeyE", "KeyR", "KeyT", "KeyY", "KeyU", "KeyI", "KeyO", "KeyP", "BracketLeft", "BracketRight",
    "Digit1", "Digit2", "Digit3", "Digit4", "Digit5", "Digit6", "Digit7", "Digit8", "Digit9", "Digit0", "Minus", "Equal", "Backspace",
    "Escape",
];

/// Position of a key code in [`KEY_CODES`].
pub fn key_position(code: &str) -> Option<usize> {
    KEY_CODES.iter().position(|&c| c == code)
}

/// Maps key codes to notes and swallows key repeat.
#[derive(Debug, Default)]
pub struct ComputerKeyboard {
    /// Held codes and the note each one pressed.
    held: HashMap<&'static str, NoteEntry>,
}

impl ComputerKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The note a code plays, given the playable notes in low-to-high order.
    pub fn note_for<'a>(code: &str, notes: &'a [NoteEntry]) -> Option<&'a NoteEntry> {
        key_position(code).and_then(|i| notes.get(i))
    }

    pub fn key_down(&mut self, code: &str, notes: &[NoteEntry]) -> Option<InputEvent> {
        let position = key_position(code)?;
        let note = notes.get(position)?;

        // Auto-repeat keydowns
        if self.held.contains_key(KEY_CODES[position]) {
            return None;
        }
        self.held.insert(KEY_CODES[position], *note);

        Some(InputEvent::press(note, MAX_VELOCITY, InputSource::ComputerKey))
    }

    /// Release the note this code pressed, if it is held.
    pub fn key_up(&mut self, code: &str) -> Option<InputEvent> {
        let note = self.held.remove(code)?;
        Some(InputEvent::release(&note, InputSource::ComputerKey))
    }

    pub fn is_held(&self, code: &str) -> bool {
        self.held.contains_key(code)
    }

    /// Drop a held code whose press never produced a voice.
    pub fn forget(&mut self, code: &str) {
        self.held.remove(code);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::VoiceKey;
    use crate::note_table::NoteTable;

    fn playable() -> Vec<NoteEntry> {
        NoteTable::build()
            .iter()
            .filter(|n| (36..=96).contains(&n.midi))
            .copied()
            .collect()
    }

    #[test]
    fn test_code_table_is_unique() {
        for (i, code) in KEY_CODES.iter().enumerate() {
            assert_eq!(key_position(code), Some(i));
        }
    }

    #[test]
    fn test_positions_follow_playable_order() {
        let notes = playable();
        let mut keys = ComputerKeyboard::new();

        let space = keys.key_down("Space", &notes).unwrap();
        assert_eq!(space.key, VoiceKey::Midi(36));

        let z = keys.key_down("KeyZ", &notes).unwrap();
        assert_eq!(z.key, VoiceKey::Midi(38));

        let escape = keys.key_down("Escape", &notes).unwrap();
        assert_eq!(escape.key, VoiceKey::Midi(36 + 51));
    }

    #[test]
    fn test_key_repeat_does_not_retrigger() {
        let notes = playable();
        let mut keys = ComputerKeyboard::new();

        assert!(keys.key_down("KeyA", &notes).is_some());
        assert!(keys.key_down("KeyA", &notes).is_none());
        assert!(keys.key_down("KeyA", &notes).is_none());

        let up = keys.key_up("KeyA").unwrap();
        assert!(!up.pressed);
        assert!(keys.key_up("KeyA").is_none());
    }

    #[test]
    fn test_unmapped_codes() {
        let notes = playable();
        let mut keys = ComputerKeyboard::new();

        assert!(keys.key_down("F5", &notes).is_none());
        assert!(keys.key_up("F5").is_none());

        // Mapped code but beyond a short keyboard
        let short = &notes[..4];
        assert!(keys.key_down("KeyM", short).is_none());
        assert!(!keys.is_held("KeyM"));
    }
}
