// src/instrument.rs
//
// The playable instrument.
//
// Owns the note table, the keyboard layout, the three input adapters and
// the voice manager. Every input method normalizes its raw event and
// feeds the result through the voice manager; configuration changes that
// alter the drawn keyboard rebuild table and layout together.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{KeyArrangement, KeyRange, KeyboardConfig};
use crate::error::SynthError;
use crate::event::{InputEvent, InputSource, VoiceKey};
use crate::input::{ComputerKeyboard, MidiAdapter, MidiInput, PointerAction, PointerAdapter};
use crate::layout::KeyboardLayout;
use crate::note_table::NoteTable;
use crate::voice::{SynthBackend, Waveform};
use crate::voice_manager::{Transition, VoiceManager};

/// Virtual keyboard instrument.
///
/// Single-threaded: events are applied one at a time in arrival order.
/// Out-of-order or duplicate events become `Transition::Ignored`.
pub struct Instrument<B: SynthBackend> {
    config: KeyboardConfig,
    table: NoteTable,
    layout: KeyboardLayout,

    pointer: PointerAdapter,
    computer_keys: ComputerKeyboard,
    midi: MidiAdapter,

    voices: VoiceManager<B>,

    /// Drives the random key arrangement.
    rng: StdRng,
}

impl<B: SynthBackend> Instrument<B> {
    pub fn new(backend: B, config: KeyboardConfig) -> Self {
        Self::with_rng(backend, config, StdRng::from_entropy())
    }

    /// Create with a given random source, for reproducible arrangements.
    pub fn with_rng(backend: B, config: KeyboardConfig, mut rng: StdRng) -> Self {
        let table = NoteTable::build();
        let layout = KeyboardLayout::build(&table, &config, &mut rng);

        let mut voices = VoiceManager::new(backend, config.waveform);
        voices.set_gain(config.volume);

        Self {
            config,
            table,
            layout,
            pointer: PointerAdapter::new(),
            computer_keys: ComputerKeyboard::new(),
            midi: MidiAdapter::new(),
            voices,
            rng,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Pointer interaction with the widget at drawn position `index`.
    pub fn pointer(&mut self, index: usize, action: PointerAction) -> Result<Transition, SynthError> {
        let Some(widget) = self.layout.widget(index) else {
            return Ok(Transition::Ignored);
        };
        let note = widget.note;

        let Some(event) = self.pointer.handle(&note, action) else {
            return Ok(Transition::Ignored);
        };

        let result = self.apply(&event);
        if result.is_err() {
            self.pointer.forget(&event.key);
        }
        result
    }

    /// Whether a key code plays a note, so the host can suppress its default action.
    pub fn handles_code(&self, code: &str) -> bool {
        ComputerKeyboard::note_for(code, self.layout.playable()).is_some()
    }

    pub fn key_down(&mut self, code: &str) -> Result<Transition, SynthError> {
        let Some(event) = self.computer_keys.key_down(code, self.layout.playable()) else {
            return Ok(Transition::Ignored);
        };

        let result = self.apply(&event);
        if result.is_err() {
            self.computer_keys.forget(code);
        }
        result
    }

    pub fn key_up(&mut self, code: &str) -> Result<Transition, SynthError> {
        match self.computer_keys.key_up(code) {
            Some(event) => self.apply(&event),
            None => Ok(Transition::Ignored),
        }
    }

    /// Raw MIDI message bytes from an input port.
    ///
    /// All-notes-off controllers panic the instrument.
    pub fn midi_message(&mut self, bytes: &[u8]) -> Result<Transition, SynthError> {
        match self.midi.handle(bytes, &self.table) {
            Some(MidiInput::Note(event)) => self.apply(&event),
            Some(MidiInput::AllNotesOff) => Ok(if self.panic() > 0 {
                Transition::Stopped
            } else {
                Transition::Ignored
            }),
            None => {
                log::trace!("Ignored MIDI message {:02X?}", bytes);
                Ok(Transition::Ignored)
            }
        }
    }

    /// Press a note directly, by either form of key.
    pub fn press(&mut self, key: VoiceKey, velocity: u8) -> Result<Transition, SynthError> {
        match self.table.resolve(key) {
            Some(note) => {
                let event = InputEvent::press(note, velocity, InputSource::Host);
                self.apply(&event)
            }
            None => Ok(Transition::Ignored),
        }
    }

    pub fn release(&mut self, key: VoiceKey) -> Result<Transition, SynthError> {
        match self.table.resolve(key) {
            Some(note) => {
                let event = InputEvent::release(note, InputSource::Host);
                self.apply(&event)
            }
            None => Ok(Transition::Ignored),
        }
    }

    /// Feed one event to the voice manager.
    ///
    /// A stopped note is no longer held by the pointer, whichever source
    /// stopped it, so the next drag over its widget plays it again.
    fn apply(&mut self, event: &InputEvent) -> Result<Transition, SynthError> {
        let transition = self.voices.handle(event)?;
        if transition == Transition::Stopped {
            self.pointer.forget(&event.key.canonical());
        }
        Ok(transition)
    }

    /// Silence every sounding note and forget all held inputs.
    ///
    /// Returns how many voices were stopped.
    pub fn panic(&mut self) -> usize {
        self.pointer.clear();
        self.computer_keys.clear();
        self.voices.panic()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a whole configuration, rebuilding the keyboard if needed.
    pub fn configure(&mut self, config: KeyboardConfig) {
        let rebuild = self.config.needs_rebuild(&config);
        self.config = config;
        self.voices.set_waveform(config.waveform);
        self.set_volume(config.volume);
        if rebuild {
            self.rebuild();
        }
    }

    /// Applies to notes pressed from now on.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.config.waveform = waveform;
        self.voices.set_waveform(waveform);
    }

    /// Visible to sounding voices immediately. Non-finite values are ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            log::warn!("Ignored non-finite volume {}", volume);
            return;
        }
        self.config.volume = volume.clamp(0.0, 1.0);
        self.voices.set_gain(self.config.volume);
    }

    pub fn set_show_note_names(&mut self, show: bool) {
        if self.config.show_note_names != show {
            self.config.show_note_names = show;
            self.rebuild();
        }
    }

    pub fn toggle_show_note_names(&mut self) {
        self.set_show_note_names(!self.config.show_note_names);
    }

    /// Choosing `Random` again reshuffles.
    pub fn set_arrangement(&mut self, arrangement: KeyArrangement) {
        if self.config.arrangement != arrangement || arrangement == KeyArrangement::Random {
            self.config.arrangement = arrangement;
            self.rebuild();
        }
    }

    pub fn set_range(&mut self, range: KeyRange) {
        if self.config.range != range {
            self.config.range = range;
            self.rebuild();
        }
    }

    pub fn set_naturals_only(&mut self, naturals_only: bool) {
        if self.config.naturals_only != naturals_only {
            self.config.naturals_only = naturals_only;
            self.rebuild();
        }
    }

    /// Limit MIDI input to one channel, or `None` for omni.
    pub fn set_midi_channel(&mut self, channel: Option<u8>) {
        self.midi.set_channel(channel);
    }

    /// Replace table and layout. Sounding notes are stopped first so no
    /// voice outlives the widget that started it.
    fn rebuild(&mut self) {
        self.panic();
        self.table = NoteTable::build();
        self.layout = KeyboardLayout::build(&self.table, &self.config, &mut self.rng);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Readback
    // ─────────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    pub fn table(&self) -> &NoteTable {
        &self.table
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn is_sounding(&self, key: VoiceKey) -> bool {
        self.table
            .resolve(key)
            .is_some_and(|note| self.voices.is_sounding(&note.voice_key()))
    }

    /// Whether the widget at drawn position `index` is sounding.
    pub fn is_widget_sounding(&self, index: usize) -> bool {
        self.layout
            .widget(index)
            .is_some_and(|w| self.voices.is_sounding(&w.voice_key()))
    }

    /// Velocity a sounding note was pressed with.
    pub fn velocity(&self, key: VoiceKey) -> Option<u8> {
        self.voices.velocity(&key)
    }

    pub fn active_voices(&self) -> usize {
        self.voices.active_count()
    }

    pub fn voices(&self) -> &VoiceManager<B> {
        &self.voices
    }

    pub fn backend(&self) -> &B {
        self.voices.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.voices.backend_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice_manager::tests::RecordingBackend;

    fn instrument(config: KeyboardConfig) -> Instrument<RecordingBackend> {
        Instrument::with_rng(RecordingBackend::default(), config, StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_volume_reaches_backend() {
        let mut keys = instrument(KeyboardConfig::default());
        assert_eq!(keys.backend().gain, 0.5);

        keys.set_volume(0.8);
        assert_eq!(keys.backend().gain, 0.8);
        keys.set_volume(3.0);
        assert_eq!(keys.config().volume, 1.0);
    }

    #[test]
    fn test_failed_press_can_retry() {
        let mut keys = instrument(KeyboardConfig::default());
        keys.backend_mut().fail = true;

        assert!(keys.key_down("KeyQ").is_err());
        assert!(keys.pointer(10, PointerAction::Down { buttons: 1 }).is_err());
        assert_eq!(keys.active_voices(), 0);

        keys.backend_mut().fail = false;
        assert_eq!(keys.key_down("KeyQ"), Ok(Transition::Started));
        assert_eq!(
            keys.pointer(10, PointerAction::Down { buttons: 1 }),
            Ok(Transition::Started)
        );
    }

    #[test]
    fn test_rebuild_stops_voices() {
        let mut keys = instrument(KeyboardConfig::default());
        keys.key_down("KeyA").unwrap();
        keys.pointer(0, PointerAction::Down { buttons: 1 }).unwrap();
        assert_eq!(keys.active_voices(), 2);

        keys.toggle_show_note_names();
        assert_eq!(keys.active_voices(), 0);
        assert_eq!(keys.backend().stopped.len(), 2);
        assert!(keys.layout().keys().iter().all(|w| w.label.is_none()));

        // Held inputs were forgotten along with their voices
        assert_eq!(keys.key_up("KeyA"), Ok(Transition::Ignored));
        assert_eq!(keys.key_down("KeyA"), Ok(Transition::Started));
    }

    #[test]
    fn test_waveform_change_does_not_rebuild() {
        let mut keys = instrument(KeyboardConfig::default());
        keys.key_down("KeyA").unwrap();
        keys.set_waveform(Waveform::Triangle);
        assert_eq!(keys.active_voices(), 1);

        keys.key_down("KeyS").unwrap();
        let started = &keys.backend().started;
        assert_eq!(started[0].2, Waveform::Sine);
        assert_eq!(started[1].2, Waveform::Triangle);
    }

    #[test]
    fn test_host_press_by_name() {
        let mut keys = instrument(KeyboardConfig::default());
        let c4 = VoiceKey::Named {
            octave: 4,
            pitch: crate::note_table::PitchClass::C,
        };

        assert_eq!(keys.press(c4, 90), Ok(Transition::Started));
        assert!(keys.is_sounding(VoiceKey::Midi(60)));
        // Same note by MIDI number is already sounding
        assert_eq!(keys.press(VoiceKey::Midi(60), 90), Ok(Transition::Ignored));
        assert_eq!(keys.release(VoiceKey::Midi(60)), Ok(Transition::Stopped));
        assert_eq!(keys.press(VoiceKey::Midi(10), 90), Ok(Transition::Ignored));
    }

    #[test]
    fn test_volume_change_keeps_random_layout() {
        let config = KeyboardConfig {
            arrangement: KeyArrangement::Random,
            ..KeyboardConfig::default()
        };
        let mut keys = instrument(config);
        keys.midi_message(&[0x90, 60, 100]).unwrap();
        let before: Vec<u8> = keys.layout().keys().iter().map(|w| w.note.midi).collect();

        keys.configure(KeyboardConfig {
            volume: 0.9,
            ..*keys.config()
        });

        let after: Vec<u8> = keys.layout().keys().iter().map(|w| w.note.midi).collect();
        assert_eq!(after, before);
        assert!(keys.is_sounding(VoiceKey::Midi(60)));
        assert!(keys.backend().stopped.is_empty());
        assert_eq!(keys.backend().gain, 0.9);
    }

    #[test]
    fn test_non_finite_volume_is_ignored() {
        let mut keys = instrument(KeyboardConfig::default());
        keys.set_volume(f32::NAN);
        assert_eq!(keys.config().volume, 0.5);
        assert_eq!(keys.backend().gain, 0.5);

        keys.configure(KeyboardConfig {
            volume: f32::INFINITY,
            ..*keys.config()
        });
        assert_eq!(keys.config().volume, 0.5);
        assert_eq!(keys.backend().gain, 0.5);
    }

    #[test]
    fn test_midi_release_frees_pointer_key() {
        let mut keys = instrument(KeyboardConfig::default());
        let c4 = keys.layout().position_of(VoiceKey::Midi(60)).unwrap();

        assert_eq!(
            keys.pointer(c4, PointerAction::Down { buttons: 1 }),
            Ok(Transition::Started)
        );
        assert_eq!(keys.midi_message(&[0x80, 60, 0]), Ok(Transition::Stopped));

        // Dragging back over the key plays it again
        assert_eq!(
            keys.pointer(c4, PointerAction::Enter { buttons: 1 }),
            Ok(Transition::Started)
        );
        assert_eq!(keys.active_voices(), 1);
    }

    #[test]
    fn test_velocity_readback() {
        let mut keys = instrument(KeyboardConfig::default());
        keys.midi_message(&[0x90, 60, 64]).unwrap();
        keys.key_down("Space").unwrap();

        assert_eq!(keys.velocity(VoiceKey::Midi(60)), Some(64));
        assert_eq!(
            keys.velocity(VoiceKey::Named {
                octave: 4,
                pitch: crate::note_table::PitchClass::C,
            }),
            Some(64)
        );
        assert_eq!(keys.velocity(VoiceKey::Midi(36)), Some(127));
        assert_eq!(keys.velocity(VoiceKey::Midi(62)), None);
    }

    #[test]
    fn test_configure() {
        let mut keys = instrument(KeyboardConfig::default());
        let config = KeyboardConfig {
            range: KeyRange::new(48, 72).unwrap(),
            arrangement: KeyArrangement::HighToLow,
            waveform: Waveform::Sawtooth,
            ..KeyboardConfig::default()
        };
        keys.configure(config);

        assert_eq!(keys.layout().len(), 25);
        assert_eq!(keys.layout().widget(0).unwrap().note.midi, 72);
        assert_eq!(keys.voices().waveform(), Waveform::Sawtooth);
        assert!(keys.handles_code("KeyZ"));
        assert!(!keys.handles_code("KeyP"));
    }
}
