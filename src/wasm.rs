//! WebAssembly bindings via wasm-bindgen for browser integration.
//!
//! This module is only compiled when the `web` feature is enabled.
//!
//! # Usage
//!
//! Build with wasm-pack:
//! ```bash
//! wasm-pack build --target web --features web
//! ```
//!
//! # JavaScript Example
//!
//! ```javascript
//! import init, { synthkeys_init, WebKeyboard } from './synthkeys.js';
//!
//! await init();
//! synthkeys_init();
//!
//! const keyboard = new WebKeyboard(48000);
//! for (let i = 0; i < keyboard.key_count(); i++) {
//!   const el = drawKey(keyboard.key_label(i));
//!   el.onmousedown = (e) => keyboard.pointer_down(i, e.buttons);
//!   el.onmouseover = (e) => keyboard.pointer_enter(i, e.buttons);
//!   el.onmouseup = () => keyboard.pointer_up(i);
//!   el.onmouseleave = () => keyboard.pointer_leave(i);
//! }
//! addEventListener("keydown", (e) => keyboard.key_down(e.code) && e.preventDefault());
//! addEventListener("keyup", (e) => keyboard.key_up(e.code) && e.preventDefault());
//!
//! // In the AudioWorklet
//! keyboard.render(128, interleavedStereo);
//! ```

use wasm_bindgen::prelude::*;

use crate::config::{KeyArrangement, KeyboardConfig};
use crate::error::SynthError;
use crate::input::PointerAction;
use crate::instrument::Instrument;
use crate::event::VoiceKey;
use crate::synth::{DEFAULT_MAX_VOICES, OscillatorBank, PeriodicWave};
use crate::voice::Waveform;
use crate::voice_manager::Transition;

// ═══════════════════════════════════════════════════════════════════════════
// Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the wasm module. Call this once before using any other functions.
/// Sets up panic hooks and console logging.
#[wasm_bindgen]
pub fn synthkeys_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

// ═══════════════════════════════════════════════════════════════════════════
// Keyboard
// ═══════════════════════════════════════════════════════════════════════════

/// Browser-facing keyboard. Input handlers return `true` when the event
/// changed what is sounding.
#[wasm_bindgen]
pub struct WebKeyboard {
    inner: Instrument<OscillatorBank>,
}

#[wasm_bindgen]
impl WebKeyboard {
    /// Create a keyboard with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64) -> WebKeyboard {
        let bank = OscillatorBank::new(sample_rate, DEFAULT_MAX_VOICES);
        WebKeyboard {
            inner: Instrument::new(bank, KeyboardConfig::default()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pointer
    // ─────────────────────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, index: usize, buttons: u16) -> bool {
        changed(self.inner.pointer(index, PointerAction::Down { buttons }))
    }

    pub fn pointer_enter(&mut self, index: usize, buttons: u16) -> bool {
        changed(self.inner.pointer(index, PointerAction::Enter { buttons }))
    }

    pub fn pointer_up(&mut self, index: usize) -> bool {
        changed(self.inner.pointer(index, PointerAction::Up))
    }

    pub fn pointer_leave(&mut self, index: usize) -> bool {
        changed(self.inner.pointer(index, PointerAction::Leave))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Computer keyboard
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns whether the code is mapped; the caller should then prevent
    /// the browser's default action.
    pub fn key_down(&mut self, code: &str) -> bool {
        if !self.inner.handles_code(code) {
            return false;
        }
        changed(self.inner.key_down(code));
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        if !self.inner.handles_code(code) {
            return false;
        }
        changed(self.inner.key_up(code));
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // MIDI
    // ─────────────────────────────────────────────────────────────────────────

    /// Forward `MIDIMessageEvent.data`.
    pub fn midi_message(&mut self, data: &[u8]) -> bool {
        changed(self.inner.midi_message(data))
    }

    /// Report that Web MIDI is unsupported or was denied. Other inputs keep working.
    pub fn midi_unavailable(&self, reason: &str) {
        log::warn!("MIDI input unavailable: {}", reason);
    }

    /// Limit MIDI input to one channel (0-15); any other value means omni.
    pub fn set_midi_channel(&mut self, channel: u8) {
        self.inner
            .set_midi_channel((channel < 16).then_some(channel));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Controls
    // ─────────────────────────────────────────────────────────────────────────

    /// Stop every sounding note.
    pub fn panic(&mut self) -> u32 {
        self.inner.panic() as u32
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.inner.set_volume(volume);
    }

    /// Returns false for an unknown waveform name.
    pub fn set_waveform(&mut self, name: &str) -> bool {
        match name.parse::<Waveform>() {
            Ok(waveform) => {
                self.inner.set_waveform(waveform);
                true
            }
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }

    /// Returns false for an unknown arrangement name. Redraw the keys after.
    pub fn set_arrangement(&mut self, name: &str) -> bool {
        match name.parse::<KeyArrangement>() {
            Ok(arrangement) => {
                self.inner.set_arrangement(arrangement);
                true
            }
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }

    /// Replace the `custom` waveform's Fourier terms, as in
    /// `createPeriodicWave(real, imag)`. Applies to voices started after.
    pub fn set_custom_wave(&mut self, cosine: &[f32], sine: &[f32]) {
        self.inner
            .backend_mut()
            .set_custom_wave(PeriodicWave::new(cosine, sine));
    }

    /// Redraw the keys after.
    pub fn set_show_note_names(&mut self, show: bool) {
        self.inner.set_show_note_names(show);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Readback
    // ─────────────────────────────────────────────────────────────────────────

    pub fn key_count(&self) -> usize {
        self.inner.layout().len()
    }

    /// Label of the key at drawn position `index`, if names are shown.
    pub fn key_label(&self, index: usize) -> Option<String> {
        self.inner
            .layout()
            .widget(index)
            .and_then(|w| w.label)
            .map(|l| format!("{}{}", l.name, l.octave))
    }

    pub fn key_note(&self, index: usize) -> Option<String> {
        self.inner
            .layout()
            .widget(index)
            .map(|w| w.note.pitch.name().to_string())
    }

    pub fn key_octave(&self, index: usize) -> Option<u8> {
        self.inner.layout().widget(index).map(|w| w.note.octave)
    }

    pub fn key_midi(&self, index: usize) -> Option<u8> {
        self.inner.layout().widget(index).map(|w| w.note.midi)
    }

    pub fn key_frequency(&self, index: usize) -> Option<f64> {
        self.inner.layout().widget(index).map(|w| w.note.frequency)
    }

    /// Drawn position of a MIDI note, for highlighting.
    pub fn key_position(&self, midi: u8) -> Option<usize> {
        self.inner
            .layout()
            .position_of(VoiceKey::Midi(midi))
    }

    pub fn is_key_sounding(&self, index: usize) -> bool {
        self.inner.is_widget_sounding(index)
    }

    /// Velocity of the sounding note on the key at `index`, for shading.
    pub fn key_velocity(&self, index: usize) -> Option<u8> {
        let key = self.inner.layout().widget(index)?.voice_key();
        self.inner.velocity(key)
    }

    pub fn active_voices(&self) -> u32 {
        self.inner.active_voices() as u32
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Audio
    // ─────────────────────────────────────────────────────────────────────────

    /// Render audio frames to the provided output buffer (interleaved stereo).
    /// Output format: [L0, R0, L1, R1, L2, R2, ...]
    ///
    /// The output slice must have length >= frames * 2; a shorter one is
    /// filled with silence and `false` is returned.
    pub fn render(&mut self, frames: u32, output: &mut [f32]) -> bool {
        self.inner.backend_mut().render_stereo(frames, output)
    }
}

/// Log backend failures; the note simply stays silent.
fn changed(result: Result<Transition, SynthError>) -> bool {
    match result {
        Ok(transition) => transition != Transition::Ignored,
        Err(e) => {
            log::warn!("Note not started: {}", e);
            false
        }
    }
}
