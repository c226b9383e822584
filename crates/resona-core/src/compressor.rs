//! Dynamics compressor with soft-knee characteristics.
//!
//! A feed-forward compressor that keeps the summed tone ensemble out of
//! clipping by attenuating the signal above a threshold.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Envelope Follower → Gain Computer → Gain Reduction → Output
//! ```
//!
//! # Parameters
//!
//! | Parameter | Range | Ensemble default |
//! |-----------|-------|------------------|
//! | Threshold | -100 to 0 dB | -24 dB |
//! | Knee | 0 to 40 dB | 30 dB |
//! | Ratio | 1:1 to 20:1 | 12:1 |
//! | Attack | 0 to 1 s | 3 ms |
//! | Release | 0 to 1 s | 250 ms |

use crate::envelope::EnvelopeFollower;
use crate::math::{db_to_linear, linear_to_db};

/// Fixed compressor configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    /// Level where compression begins, in dB.
    pub threshold_db: f32,
    /// Width of the soft knee centred on the threshold, in dB.
    pub knee_db: f32,
    /// Input/output slope above the knee.
    pub ratio: f32,
    /// Attack time in seconds.
    pub attack_secs: f32,
    /// Release time in seconds.
    pub release_secs: f32,
}

impl Default for CompressorSettings {
    /// Settings tuned for dozens of summed sine tones.
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 12.0,
            attack_secs: 0.003,
            release_secs: 0.25,
        }
    }
}

impl CompressorSettings {
    /// Return a copy with every field clamped to its supported range.
    pub fn clamped(self) -> Self {
        Self {
            threshold_db: self.threshold_db.clamp(-100.0, 0.0),
            knee_db: self.knee_db.clamp(0.0, 40.0),
            ratio: self.ratio.clamp(1.0, 20.0),
            attack_secs: self.attack_secs.clamp(0.0, 1.0),
            release_secs: self.release_secs.clamp(0.0, 1.0),
        }
    }
}

/// Gain computer for the static compression curve.
#[derive(Debug, Clone)]
struct GainComputer {
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
}

impl GainComputer {
    /// Gain change in dB (always non-positive) for an input level in dB.
    #[inline]
    fn compute_gain_db(&self, input_db: f32) -> f32 {
        let overshoot = input_db - self.threshold_db;
        let half_knee = self.knee_db / 2.0;
        let slope = 1.0 - 1.0 / self.ratio;

        if overshoot <= -half_knee {
            0.0
        } else if overshoot >= half_knee {
            -(overshoot * slope)
        } else {
            // Quadratic interpolation across the knee
            let x = overshoot + half_knee;
            -(slope * x * x / (2.0 * self.knee_db))
        }
    }
}

/// Dynamics compressor node.
///
/// # Example
///
/// ```rust
/// use resona_core::{Compressor, CompressorSettings};
///
/// let mut comp = Compressor::new(48000.0, CompressorSettings::default());
/// let output = comp.process(0.5);
/// assert!(output.abs() <= 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    envelope_follower: EnvelopeFollower,
    gain_computer: GainComputer,
    settings: CompressorSettings,
    /// Last computed gain reduction in dB (always non-positive).
    last_gain_reduction_db: f32,
}

impl Compressor {
    /// Create a compressor; out-of-range settings are clamped.
    pub fn new(sample_rate: f32, settings: CompressorSettings) -> Self {
        let settings = settings.clamped();
        Self {
            envelope_follower: EnvelopeFollower::with_times(
                sample_rate,
                settings.attack_secs * 1000.0,
                settings.release_secs * 1000.0,
            ),
            gain_computer: GainComputer {
                threshold_db: settings.threshold_db,
                ratio: settings.ratio,
                knee_db: settings.knee_db,
            },
            settings,
            last_gain_reduction_db: 0.0,
        }
    }

    /// The effective (clamped) settings.
    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    /// Last computed gain reduction in dB (always non-positive).
    pub fn gain_reduction_db(&self) -> f32 {
        self.last_gain_reduction_db
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let envelope = self.envelope_follower.process(input);
        let gain_reduction_db = self.gain_computer.compute_gain_db(linear_to_db(envelope));
        self.last_gain_reduction_db = gain_reduction_db;
        input * db_to_linear(gain_reduction_db)
    }

    /// Clear detector state.
    pub fn reset(&mut self) {
        self.envelope_follower.reset();
        self.last_gain_reduction_db = 0.0;
    }
}
