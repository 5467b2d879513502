// Oscillator bank: a synthesis backend rendered in Rust.

use crate::error::SynthError;
use crate::voice::{SynthBackend, Waveform};

use super::oscillators::{Oscillator, PeriodicWave};

pub const DEFAULT_MAX_VOICES: usize = 32;
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

// Mono scratch size; longer stereo requests are rendered in chunks
const RENDER_BLOCK: usize = 512;

/// Handle to a voice slot in an [`OscillatorBank`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BankVoice(usize);

/// Fixed pool of oscillators mixed through one shared gain stage.
///
/// Voice slots are allocated up front; rendering never allocates.
pub struct OscillatorBank {
    slots: Vec<Option<Oscillator>>,
    sample_rate: f64,
    gain: f32,
    custom_wave: PeriodicWave,
    scratch: Vec<f32>,
}

impl OscillatorBank {
    pub fn new(sample_rate: f64, max_voices: usize) -> Self {
        Self {
            slots: vec![None; max_voices],
            sample_rate,
            gain: 1.0,
            custom_wave: PeriodicWave::default(),
            scratch: vec![0.0; RENDER_BLOCK],
        }
    }

    /// Replace the wave used by [`Waveform::Custom`] voices.
    pub fn set_custom_wave(&mut self, wave: PeriodicWave) {
        self.custom_wave = wave;
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Mix every live voice into `output` (mono), scaled by the shared gain.
    pub fn render(&mut self, output: &mut [f32]) {
        output.fill(0.0);
        let custom = &self.custom_wave;
        for osc in self.slots.iter_mut().flatten() {
            for sample in output.iter_mut() {
                *sample += osc.next_sample(custom);
            }
        }

        let gain = self.gain;
        output.iter_mut().for_each(|s| *s *= gain);
    }

    /// Render `frames` frames as interleaved stereo: `[L0, R0, L1, R1, ...]`.
    ///
    /// `output` must hold at least `frames * 2` samples. Otherwise it is
    /// filled with silence and `false` is returned.
    pub fn render_stereo(&mut self, frames: u32, output: &mut [f32]) -> bool {
        let total_frames = frames as usize;
        let fits = total_frames
            .checked_mul(2)
            .is_some_and(|needed| needed <= output.len());
        if !fits {
            log::warn!(
                "Render buffer of {} samples too short for {} frames",
                output.len(),
                frames
            );
            output.fill(0.0);
            return false;
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        for out_chunk in output[..total_frames * 2].chunks_mut(RENDER_BLOCK * 2) {
            let mono = &mut scratch[..out_chunk.len() / 2];
            self.render(mono);
            for (frame, &sample) in out_chunk.chunks_exact_mut(2).zip(mono.iter()) {
                frame[0] = sample;
                frame[1] = sample;
            }
        }
        self.scratch = scratch;
        true
    }
}

impl Default for OscillatorBank {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_MAX_VOICES)
    }
}

impl SynthBackend for OscillatorBank {
    type Voice = BankVoice;

    fn create_voice(&mut self, frequency: f64, waveform: Waveform) -> Result<BankVoice, SynthError> {
        if !frequency.is_finite() || frequency <= 0.0 || frequency >= self.sample_rate / 2.0 {
            return Err(SynthError::InvalidFrequency(frequency));
        }

        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(SynthError::VoiceLimit {
                limit: self.slots.len(),
            })?;

        self.slots[slot] = Some(Oscillator::new(frequency, self.sample_rate, waveform));
        Ok(BankVoice(slot))
    }

    fn stop_voice(&mut self, voice: BankVoice) {
        if let Some(slot) = self.slots.get_mut(voice.0) {
            *slot = None;
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    fn gain(&self) -> f32 {
        self.gain
    }
}
