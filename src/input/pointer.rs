// Pointer (mouse/touch) input on rendered key widgets.

use std::collections::HashSet;

use crate::event::{InputEvent, InputSource, MAX_VELOCITY, VoiceKey};
use crate::note_table::NoteEntry;

/// Bit of the pointer `buttons` mask for the primary button.
pub const PRIMARY_BUTTON: u16 = 1;

/// A raw pointer interaction with one key widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Down { buttons: u16 },
    /// Pointer moved onto the widget.
    Enter { buttons: u16 },
    Up,
    /// Pointer moved off the widget.
    Leave,
}

/// Tracks which widgets the pointer is holding down.
///
/// Down and enter fire together when a key is clicked, so a press for a
/// key that is already held is dropped, as is a release for one that
/// isn't.
#[derive(Debug, Default)]
pub struct PointerAdapter {
    pressed: HashSet<VoiceKey>,
}

impl PointerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, note: &NoteEntry, action: PointerAction) -> Option<InputEvent> {
        let key = note.voice_key();
        match action {
            PointerAction::Down { buttons } | PointerAction::Enter { buttons } => {
                if buttons & PRIMARY_BUTTON == 0 || !self.pressed.insert(key) {
                    return None;
                }
                Some(InputEvent::press(note, MAX_VELOCITY, InputSource::Pointer))
            }
            PointerAction::Up | PointerAction::Leave => {
                if !self.pressed.remove(&key) {
                    return None;
                }
                Some(InputEvent::release(note, InputSource::Pointer))
            }
        }
    }

    pub fn is_pressed(&self, key: &VoiceKey) -> bool {
        self.pressed.contains(key)
    }

    /// Drop the pressed mark for a press that never produced a voice.
    pub fn forget(&mut self, key: &VoiceKey) {
        self.pressed.remove(key);
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}
