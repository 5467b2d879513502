// src/voice_manager.rs

use std::collections::HashMap;

use crate::error::SynthError;
use crate::event::{InputEvent, VoiceKey};
use crate::voice::{SynthBackend, Waveform};

/// A registered, sounding voice.
#[derive(Debug)]
pub struct ActiveVoice<V> {
    pub handle: V,
    pub velocity: u8,
}

/// Maps each sounding note to its voice handle.
///
/// Absence of a key means the note is idle. Keys are stored in canonical
/// form, so there is never more than one entry per note whichever form
/// of key addressed it.
#[derive(Debug)]
pub struct VoiceRegistry<V> {
    voices: HashMap<VoiceKey, ActiveVoice<V>>,
}

impl<V> VoiceRegistry<V> {
    pub fn new() -> Self {
        Self {
            voices: HashMap::new(),
        }
    }

    pub fn contains(&self, key: &VoiceKey) -> bool {
        self.voices.contains_key(&key.canonical())
    }

    pub fn get(&self, key: &VoiceKey) -> Option<&ActiveVoice<V>> {
        self.voices.get(&key.canonical())
    }

    fn insert(&mut self, key: VoiceKey, voice: ActiveVoice<V>) {
        self.voices.insert(key.canonical(), voice);
    }

    fn remove(&mut self, key: &VoiceKey) -> Option<ActiveVoice<V>> {
        self.voices.remove(&key.canonical())
    }

    fn drain(&mut self) -> impl Iterator<Item = (VoiceKey, ActiveVoice<V>)> + '_ {
        self.voices.drain()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

impl<V> Default for VoiceRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// What an input event did to its note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle -> Sounding.
    Started,
    /// Sounding -> Idle.
    Stopped,
    /// Press while sounding, or release while idle.
    Ignored,
}

/// Starts and stops exactly one voice per distinct note.
///
/// Responsibilities:
/// - own the voice registry
/// - apply press/release events in arrival order
/// - silence everything on panic
///
/// Does NOT:
/// - know where events came from
/// - render audio
pub struct VoiceManager<B: SynthBackend> {
    backend: B,
    registry: VoiceRegistry<B::Voice>,
    waveform: Waveform,
}

impl<B: SynthBackend> VoiceManager<B> {
    pub fn new(backend: B, waveform: Waveform) -> Self {
        Self {
            backend,
            registry: VoiceRegistry::new(),
            waveform,
        }
    }

    /// Apply one normalized input event.
    pub fn handle(&mut self, event: &InputEvent) -> Result<Transition, SynthError> {
        if event.pressed {
            self.press(event)
        } else {
            Ok(self.release(&event.key))
        }
    }

    fn press(&mut self, event: &InputEvent) -> Result<Transition, SynthError> {
        if self.registry.contains(&event.key) {
            log::trace!("{:?} already sounding", event.key);
            return Ok(Transition::Ignored);
        }

        // Nothing is registered unless the backend produced a voice
        let handle = self
            .backend
            .create_voice(event.frequency, self.waveform)
            .inspect_err(|e| log::warn!("Could not start voice for {:?}: {}", event.key, e))?;

        log::debug!(
            "Voice on {:?} at {:.3} Hz ({}, velocity {}, from {:?})",
            event.key,
            event.frequency,
            self.waveform,
            event.velocity,
            event.source
        );

        self.registry.insert(
            event.key,
            ActiveVoice {
                handle,
                velocity: event.velocity,
            },
        );

        Ok(Transition::Started)
    }

    fn release(&mut self, key: &VoiceKey) -> Transition {
        match self.registry.remove(key) {
            Some(voice) => {
                self.backend.stop_voice(voice.handle);
                log::debug!("Voice off {:?}", key);
                Transition::Stopped
            }
            None => {
                log::trace!("{:?} not sounding", key);
                Transition::Ignored
            }
        }
    }

    /// Stop every sounding voice. Returns how many were stopped.
    pub fn panic(&mut self) -> usize {
        let mut stopped = 0;
        for (_, voice) in self.registry.drain() {
            self.backend.stop_voice(voice.handle);
            stopped += 1;
        }

        if stopped > 0 {
            log::info!("Panic: stopped {} voices", stopped);
        }
        stopped
    }

    pub fn is_sounding(&self, key: &VoiceKey) -> bool {
        self.registry.contains(key)
    }

    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &VoiceRegistry<B::Voice> {
        &self.registry
    }

    /// Waveform for voices started from now on.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Shared output gain, clamped to `[0, 1]`. Non-finite values are ignored.
    pub fn set_gain(&mut self, gain: f32) {
        if !gain.is_finite() {
            log::warn!("Ignored non-finite gain {}", gain);
            return;
        }
        self.backend.set_gain(gain.clamp(0.0, 1.0));
    }

    /// Velocity a sounding note was pressed with.
    pub fn velocity(&self, key: &VoiceKey) -> Option<u8> {
        self.registry.get(key).map(|v| v.velocity)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
