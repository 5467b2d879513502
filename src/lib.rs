// src/lib.rs
//
// Library entry point for Rust consumers and the browser (`web` feature).

pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod instrument;
pub mod layout;
pub mod note_table;
pub mod synth;
pub mod voice;
pub mod voice_manager;

#[cfg(feature = "web")]
pub mod wasm;

// Re-export key types for Rust consumers
pub use config::{KeyArrangement, KeyRange, KeyboardConfig};
pub use error::{ConfigError, SynthError};
pub use event::{InputEvent, InputSource, VoiceKey};
pub use input::{MidiMessage, PointerAction};
pub use instrument::Instrument;
pub use layout::{KeyWidget, KeyboardLayout};
pub use note_table::{NoteEntry, NoteTable, PitchClass, frequency_for_midi};
pub use synth::OscillatorBank;
pub use voice::{SynthBackend, Waveform};
pub use voice_manager::{Transition, VoiceManager, VoiceRegistry};
