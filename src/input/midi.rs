// MIDI input: channel-voice message decoding and note mapping.

use crate::event::{InputEvent, InputSource};
use crate::note_table::NoteTable;

const STATUS_NOTE_OFF: u8 = 0x80;
const STATUS_NOTE_ON: u8 = 0x90;
const STATUS_CONTROL_CHANGE: u8 = 0xB0;

const CC_ALL_SOUND_OFF: u8 = 120;
const CC_ALL_NOTES_OFF: u8 = 123;

/// A decoded channel-voice message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Any other status byte.
    Other { status: u8 },
}

impl MidiMessage {
    /// Decode a 3-byte channel-voice message.
    ///
    /// Returns `None` for short messages or a missing status byte.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status & 0x80 == 0 {
            return None;
        }

        let command = status & 0xF0;
        let channel = status & 0x0F;

        let msg = match command {
            STATUS_NOTE_ON | STATUS_NOTE_OFF | STATUS_CONTROL_CHANGE => {
                let (a, b) = (*data.first()? & 0x7F, *data.get(1)? & 0x7F);
                match command {
                    STATUS_NOTE_ON => MidiMessage::NoteOn {
                        channel,
                        note: a,
                        velocity: b,
                    },
                    STATUS_NOTE_OFF => MidiMessage::NoteOff {
                        channel,
                        note: a,
                        velocity: b,
                    },
                    _ => MidiMessage::ControlChange {
                        channel,
                        controller: a,
                        value: b,
                    },
                }
            }
            _ => MidiMessage::Other { status },
        };

        Some(msg)
    }

    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. } => Some(channel),
            MidiMessage::Other { .. } => None,
        }
    }
}

/// What a MIDI message asks the instrument to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiInput {
    Note(InputEvent),
    /// All-notes-off or all-sound-off controller.
    AllNotesOff,
}

/// Maps MIDI messages to notes by MIDI number.
///
/// Notes are looked up in the note table, never by rendered position, so
/// the mapping holds for every key arrangement.
#[derive(Debug, Default)]
pub struct MidiAdapter {
    /// Only accept this channel; `None` is omni.
    channel: Option<u8>,
}

impl MidiAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(channel: u8) -> Self {
        Self {
            channel: Some(channel & 0x0F),
        }
    }

    pub fn set_channel(&mut self, channel: Option<u8>) {
        self.channel = channel.map(|c| c & 0x0F);
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Translate raw message bytes.
    pub fn handle(&self, bytes: &[u8], table: &NoteTable) -> Option<MidiInput> {
        let msg = MidiMessage::parse(bytes)?;
        self.translate(msg, table)
    }

    pub fn translate(&self, msg: MidiMessage, table: &NoteTable) -> Option<MidiInput> {
        if let (Some(wanted), Some(channel)) = (self.channel, msg.channel()) {
            if wanted != channel {
                return None;
            }
        }

        match msg {
            MidiMessage::NoteOn { note, velocity, .. } if velocity > 0 => {
                let entry = table.by_midi(note)?;
                Some(MidiInput::Note(InputEvent::press(
                    entry,
                    velocity,
                    InputSource::Midi,
                )))
            }
            // Note-on with velocity 0 is a release
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => {
                let entry = table.by_midi(note)?;
                Some(MidiInput::Note(InputEvent::release(entry, InputSource::Midi)))
            }
            MidiMessage::ControlChange { controller, .. }
                if controller == CC_ALL_SOUND_OFF || controller == CC_ALL_NOTES_OFF =>
            {
                Some(MidiInput::AllNotesOff)
            }
            MidiMessage::ControlChange { .. } | MidiMessage::Other { .. } => None,
        }
    }
}
