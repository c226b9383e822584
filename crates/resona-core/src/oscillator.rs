//! Sine tone generator.
//!
//! A phase-accumulator oscillator. Sine output carries a single harmonic, so
//! no band-limiting correction is needed.

use core::f32::consts::PI;
use libm::sinf;

/// Audio-rate sine oscillator.
///
/// # Example
///
/// ```rust
/// use resona_core::SineOscillator;
///
/// let mut osc = SineOscillator::new(48000.0, 65.57);
/// let first = osc.advance();
/// assert_eq!(first, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SineOscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
}

impl SineOscillator {
    /// Create an oscillator at `frequency` Hz, phase 0.
    pub fn new(sample_rate: f32, frequency: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            phase_inc: 0.0,
            sample_rate,
            frequency: 0.0,
        };
        osc.set_frequency(frequency);
        osc
    }

    /// Set frequency in Hz. Negative values are clamped to 0.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Get current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set sample rate and recalculate phase increment.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Get current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Get current phase.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Generate next sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let output = sinf(self.phase * 2.0 * PI);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        output
    }
}

impl Default for SineOscillator {
    fn default() -> Self {
        Self::new(48000.0, 440.0)
    }
}
