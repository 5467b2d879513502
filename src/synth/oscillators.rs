// Per-voice oscillators.

use std::f32::consts::TAU;

use crate::voice::Waveform;

const WAVETABLE_SIZE: usize = 2048;

// ═══════════════════════════════════════════════════════════════════
// Periodic Wave
// ═══════════════════════════════════════════════════════════════════

/// A single-cycle wavetable built from Fourier terms.
///
/// Term `k` is the `k`-th harmonic; term 0 (DC) is ignored. The table is
/// normalized to a peak of 1.
#[derive(Debug, Clone)]
pub struct PeriodicWave {
    table: Vec<f32>,
}

impl PeriodicWave {
    pub fn new(cosine_terms: &[f32], sine_terms: &[f32]) -> Self {
        let harmonics = cosine_terms.len().max(sine_terms.len());
        let mut table: Vec<f32> = (0..WAVETABLE_SIZE)
            .map(|i| {
                let phase = i as f32 / WAVETABLE_SIZE as f32;
                (1..harmonics)
                    .map(|k| {
                        let a = cosine_terms.get(k).copied().unwrap_or(0.0);
                        let b = sine_terms.get(k).copied().unwrap_or(0.0);
                        let x = TAU * k as f32 * phase;
                        a * x.cos() + b * x.sin()
                    })
                    .sum()
            })
            .collect();

        let peak = table.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        if peak > 0.0 {
            table.iter_mut().for_each(|s| *s /= peak);
        }

        Self { table }
    }

    /// Linearly interpolated sample at `phase` in `[0, 1)`.
    #[inline]
    pub fn sample(&self, phase: f32) -> f32 {
        let pos = phase * WAVETABLE_SIZE as f32;
        let i = (pos as usize) % WAVETABLE_SIZE;
        let next = (i + 1) % WAVETABLE_SIZE;
        let frac = pos.fract();
        self.table[i] + (self.table[next] - self.table[i]) * frac
    }
}

impl Default for PeriodicWave {
    /// Second and fourth harmonics.
    fn default() -> Self {
        Self::new(&[0.0; 5], &[0.0, 0.0, 1.0, 0.0, 1.0])
    }
}

// ═══════════════════════════════════════════════════════════════════
// Oscillator
// ═══════════════════════════════════════════════════════════════════

/// Naive (non-bandlimited) oscillator for one voice.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f32,
    inc: f32,
    waveform: Waveform,
}

impl Oscillator {
    pub fn new(freq: f64, sample_rate: f64, waveform: Waveform) -> Self {
        Self {
            phase: 0.0,
            inc: (freq / sample_rate) as f32,
            waveform,
        }
    }

    /// Next sample in `[-1, 1]`.
    #[inline]
    pub fn next_sample(&mut self, custom: &PeriodicWave) -> f32 {
        let p = self.phase;
        let sample = match self.waveform {
            Waveform::Sine => (p * TAU).sin(),
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * p - 1.0,
            Waveform::Triangle => {
                if p < 0.5 {
                    4.0 * p - 1.0
                } else {
                    3.0 - 4.0 * p
                }
            }
            Waveform::Custom => custom.sample(p),
        };
        self.phase = (self.phase + self.inc).fract();
        sample
    }
}
