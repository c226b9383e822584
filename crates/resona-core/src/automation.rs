//! Sample-accurate parameter automation.
//!
//! A gain parameter carries an [`AutomationTimeline`]: a time-ordered list of
//! events evaluated at any point on the engine clock. Three event kinds exist:
//!
//! - **Set**: jump to a value at a time
//! - **Linear ramp**: interpolate linearly from the previous event to a
//!   target reached at the event's end time
//! - **Exponential ramp**: interpolate geometrically; both endpoints must be
//!   strictly positive, so fades "to silence" target a small floor instead
//!
//! ## Usage
//!
//! ```rust
//! use resona_core::AutomationTimeline;
//!
//! let mut gain = AutomationTimeline::new(0.0);
//! gain.set_value_at_time(0.0, 0.0).unwrap();
//! gain.linear_ramp_to_value_at_time(1.0, 2.0).unwrap();
//!
//! assert!((gain.value_at(1.0) - 0.5).abs() < 1e-6);
//! assert_eq!(gain.value_at(3.0), 1.0);
//! ```

use libm::powf;
use thiserror::Error;

/// Rejected automation request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutomationError {
    /// Time is negative, NaN or infinite.
    #[error("invalid automation time {0}")]
    InvalidTime(f64),
    /// Value is NaN or infinite.
    #[error("invalid automation value {0}")]
    InvalidValue(f32),
    /// Exponential ramps need strictly positive start and target values.
    #[error("exponential ramp from {from} to {to} must stay above zero")]
    NonPositiveExponential {
        /// Value the ramp would start from.
        from: f32,
        /// Requested target value.
        to: f32,
    },
}

/// One scheduled automation event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    /// Jump to `value` at `time`.
    SetValue {
        /// Value held from `time` onwards.
        value: f32,
        /// Engine time in seconds.
        time: f64,
    },
    /// Linear ramp reaching `value` at `end_time`.
    LinearRamp {
        /// Target value.
        value: f32,
        /// Engine time in seconds when the target is reached.
        end_time: f64,
    },
    /// Exponential ramp reaching `value` at `end_time`.
    ExponentialRamp {
        /// Target value.
        value: f32,
        /// Engine time in seconds when the target is reached.
        end_time: f64,
    },
}

impl AutomationEvent {
    /// Time at which this event completes.
    pub fn time(&self) -> f64 {
        match *self {
            Self::SetValue { time, .. } => time,
            Self::LinearRamp { end_time, .. } | Self::ExponentialRamp { end_time, .. } => end_time,
        }
    }

    /// Value this event arrives at.
    pub fn value(&self) -> f32 {
        match *self {
            Self::SetValue { value, .. }
            | Self::LinearRamp { value, .. }
            | Self::ExponentialRamp { value, .. } => value,
        }
    }
}

/// Time-ordered automation events for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationTimeline {
    /// Value before the first event.
    initial: f32,
    events: Vec<AutomationEvent>,
}

impl AutomationTimeline {
    /// Create a timeline holding `initial` with no events.
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    /// Scheduled events in time order.
    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Schedule an instantaneous change to `value` at `time`.
    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> Result<(), AutomationError> {
        check_value(value)?;
        check_time(time)?;
        self.insert(AutomationEvent::SetValue { value, time });
        Ok(())
    }

    /// Schedule a linear ramp that reaches `value` at `end_time`.
    pub fn linear_ramp_to_value_at_time(
        &mut self,
        value: f32,
        end_time: f64,
    ) -> Result<(), AutomationError> {
        check_value(value)?;
        check_time(end_time)?;
        self.insert(AutomationEvent::LinearRamp { value, end_time });
        Ok(())
    }

    /// Schedule an exponential ramp that reaches `value` at `end_time`.
    ///
    /// Fails when the target, or the value the ramp would start from, is not
    /// strictly positive.
    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        value: f32,
        end_time: f64,
    ) -> Result<(), AutomationError> {
        check_value(value)?;
        check_time(end_time)?;
        let from = self.value_before(end_time);
        if value <= 0.0 || from <= 0.0 {
            return Err(AutomationError::NonPositiveExponential { from, to: value });
        }
        self.insert(AutomationEvent::ExponentialRamp { value, end_time });
        Ok(())
    }

    /// Remove every event at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) -> Result<(), AutomationError> {
        check_time(time)?;
        self.events.retain(|e| e.time() < time);
        Ok(())
    }

    /// Evaluate the parameter at engine time `time` (seconds).
    pub fn value_at(&self, time: f64) -> f32 {
        let mut prev_time = 0.0;
        let mut prev_value = self.initial;

        for event in &self.events {
            let event_time = event.time();
            if event_time <= time {
                prev_time = event_time;
                prev_value = event.value();
                continue;
            }

            // `time` falls inside this event's interval
            let span = event_time - prev_time;
            let progress = if span > 0.0 {
                ((time - prev_time) / span) as f32
            } else {
                1.0
            };
            return match *event {
                AutomationEvent::SetValue { .. } => prev_value,
                AutomationEvent::LinearRamp { value, .. } => {
                    prev_value + (value - prev_value) * progress
                }
                AutomationEvent::ExponentialRamp { value, .. } => {
                    if prev_value <= 0.0 {
                        prev_value
                    } else {
                        prev_value * powf(value / prev_value, progress)
                    }
                }
            };
        }

        prev_value
    }

    /// Drop events that can no longer influence values at or after `time`.
    ///
    /// The last event completed by `time` becomes the new initial value, so
    /// evaluation results are unchanged.
    pub fn prune(&mut self, time: f64) {
        let completed = self.events.iter().take_while(|e| e.time() <= time).count();
        if completed > 1 {
            self.events.drain(..completed - 1);
        }
        if let Some(first) = self.events.first()
            && first.time() <= time
        {
            self.initial = first.value();
        }
    }

    /// Value reached by the last event at or before `time`.
    fn value_before(&self, time: f64) -> f32 {
        self.events
            .iter()
            .take_while(|e| e.time() <= time)
            .last()
            .map_or(self.initial, AutomationEvent::value)
    }

    /// Insert keeping time order; equal times keep insertion order.
    fn insert(&mut self, event: AutomationEvent) {
        let at = self
            .events
            .iter()
            .position(|e| e.time() > event.time())
            .unwrap_or(self.events.len());
        self.events.insert(at, event);
    }
}

impl Default for AutomationTimeline {
    fn default() -> Self {
        Self::new(0.0)
    }
}

fn check_time(time: f64) -> Result<(), AutomationError> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(AutomationError::InvalidTime(time))
    }
}

fn check_value(value: f32) -> Result<(), AutomationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AutomationError::InvalidValue(value))
    }
}
