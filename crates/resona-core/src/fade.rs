//! Click-free gain fades.
//!
//! A ramp in an automation timeline starts from whatever event precedes it.
//! Scheduling a ramp without first pinning the current value makes it start
//! from a stale point (the initial value, or the start of an unfinished
//! ramp), which is heard as a jump. [`anchor_then_ramp`] always pins first:
//!
//! 1. cancel every event from now on
//! 2. set the anchor value at now
//! 3. schedule the ramp to the target

use crate::engine::{AudioEngine, EngineError};
use crate::graph::NodeId;

/// Ramp shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    /// Constant rate in linear gain.
    Linear,
    /// Constant rate in dB. Both ends must be above zero.
    Exponential,
}

/// A fade from an anchor value to a target over a duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    /// Value pinned at the current engine time.
    pub anchor: f32,
    /// Value reached at the end.
    pub target: f32,
    /// Length in seconds.
    pub duration_secs: f64,
    /// Ramp shape.
    pub curve: Curve,
}

impl Fade {
    /// Silence to full level.
    pub fn fade_in(duration_secs: f64) -> Self {
        Self {
            anchor: 0.0,
            target: 1.0,
            duration_secs,
            curve: Curve::Linear,
        }
    }

    /// From `current` down to `floor`, exponentially.
    ///
    /// The anchor is raised to `floor` when `current` is below it, so the
    /// ramp stays valid even if a fade-in had barely started.
    pub fn fade_out(current: f32, floor: f32, duration_secs: f64) -> Self {
        Self {
            anchor: current.max(floor),
            target: floor,
            duration_secs,
            curve: Curve::Exponential,
        }
    }

    /// Schedule this fade on `param`, starting now.
    pub fn schedule<E: AudioEngine + ?Sized>(
        &self,
        engine: &mut E,
        param: NodeId,
    ) -> Result<(), EngineError> {
        anchor_then_ramp(
            engine,
            param,
            self.anchor,
            self.target,
            self.duration_secs,
            self.curve,
        )
    }
}

/// Pin `param` to `anchor` at the engine's current time, then ramp to
/// `target` over `duration_secs`.
pub fn anchor_then_ramp<E: AudioEngine + ?Sized>(
    engine: &mut E,
    param: NodeId,
    anchor: f32,
    target: f32,
    duration_secs: f64,
    curve: Curve,
) -> Result<(), EngineError> {
    let now = engine.current_time();
    let end = now + duration_secs.max(0.0);
    engine.cancel_scheduled_values(param, now)?;
    engine.set_value_at_time(param, anchor, now)?;
    match curve {
        Curve::Linear => engine.linear_ramp_to_value_at_time(param, target, end),
        Curve::Exponential => engine.exponential_ramp_to_value_at_time(param, target, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineState, OfflineEngine};

    #[test]
    fn fade_in_pins_zero_then_rises() {
        let mut engine = OfflineEngine::new(1000.0, EngineState::Running);
        let gain = engine.create_gain(0.7).unwrap();
        Fade::fade_in(2.0).schedule(&mut engine, gain).unwrap();

        assert_eq!(engine.gain_value(gain).unwrap(), 0.0);
        engine.render_seconds(1.0);
        assert!((engine.gain_value(gain).unwrap() - 0.5).abs() < 1e-3);
        engine.render_seconds(1.5);
        assert_eq!(engine.gain_value(gain).unwrap(), 1.0);
    }

    #[test]
    fn fade_out_mid_fade_in_starts_from_current_value() {
        let mut engine = OfflineEngine::new(1000.0, EngineState::Running);
        let gain = engine.create_gain(0.0).unwrap();
        Fade::fade_in(2.0).schedule(&mut engine, gain).unwrap();
        engine.render_seconds(0.5);

        let current = engine.gain_value(gain).unwrap();
        Fade::fade_out(current, 0.001, 2.0)
            .schedule(&mut engine, gain)
            .unwrap();
        assert!((engine.gain_value(gain).unwrap() - current).abs() < 1e-6);

        engine.render_seconds(2.0);
        assert!((engine.gain_value(gain).unwrap() - 0.001).abs() < 1e-6);
    }

    #[test]
    fn fade_out_from_silence_uses_floor_anchor() {
        let fade = Fade::fade_out(0.0, 0.001, 2.0);
        assert_eq!(fade.anchor, 0.001);

        let mut engine = OfflineEngine::new(1000.0, EngineState::Running);
        let gain = engine.create_gain(0.0).unwrap();
        fade.schedule(&mut engine, gain).unwrap();
    }
}
