//! Resona Core - tone ensemble engine
//!
//! This crate plays a set of sine tones together behind a master fader and a
//! compressor, and manages the lifecycle of that graph across start/stop
//! cycles without clicks or leaked resources.
//!
//! # Core Abstractions
//!
//! ## DSP
//!
//! - [`SineOscillator`] - Phase-accumulator sine generator
//! - [`AutomationTimeline`] - Set / linear / exponential parameter automation
//! - [`EnvelopeFollower`] - Amplitude envelope detection
//! - [`Compressor`] - Soft-knee feed-forward compressor
//!
//! ## Graph & Engines
//!
//! - [`AudioEngine`] - Handle to one live audio context
//! - [`EngineProvider`] - Fresh engine per session
//! - [`GraphEngine`] + [`Renderer`] - Control handle and render-side graph
//!   joined by a command channel
//! - [`OfflineEngine`] - Engine rendered on demand (tests, file export)
//!
//! ## Playback
//!
//! - [`Preset`] / [`PresetTable`] - Named frequency sets
//! - [`build`] - Tone graph builder producing a [`Session`]
//! - [`anchor_then_ramp`] / [`Fade`] - Click-free fades
//! - [`PlaybackController`] - Idle / Playing / StoppingFadeOut state machine
//! - [`Clock`] / [`Timer`] - Deferred teardown on an injectable clock
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use resona_core::{
//!     LifecycleState, ManualClock, OfflineEngineProvider, PlaybackController,
//!     PlaybackSettings, Preset, PresetTable,
//! };
//!
//! let presets = PresetTable::from_presets([
//!     Preset::new("fifths", vec![55.0, 82.5, 123.75]).unwrap(),
//! ])
//! .unwrap();
//! let clock = ManualClock::new();
//! let provider = OfflineEngineProvider::new(48000.0);
//! let mut player =
//!     PlaybackController::with_clock(provider, presets, PlaybackSettings::default(), clock.clone());
//!
//! player.start("fifths").unwrap();
//! assert_eq!(player.generator_count(), 3);
//!
//! // Render a second of fade-in
//! let session = player.session_mut().unwrap();
//! let audio = session.engine_mut().render_seconds(1.0);
//! assert!(audio.iter().any(|&s| s != 0.0));
//!
//! player.stop();
//! clock.advance(Duration::from_secs(2));
//! assert_eq!(player.poll(), LifecycleState::Idle);
//! ```
//!
//! # Design Principles
//!
//! - **Audio thread owns DSP**: the [`Renderer`] holds every oscillator and
//!   filter; the control side only sends commands
//! - **Validate before sending**: graph and automation errors surface on the
//!   control thread, never in the audio callback
//! - **Single-use engines**: each session acquires a fresh engine and closes
//!   it on teardown

pub mod automation;
pub mod clock;
pub mod compressor;
pub mod controller;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod fade;
pub mod graph;
pub mod math;
pub mod oscillator;
pub mod preset;
pub mod session;

// Re-export main types at crate root
pub use automation::{AutomationError, AutomationEvent, AutomationTimeline};
pub use clock::{Clock, ManualClock, SystemClock, Timer};
pub use compressor::{Compressor, CompressorSettings};
pub use controller::{LifecycleState, PlaybackController, PlaybackSettings};
pub use engine::{
    AudioEngine, EngineError, EngineProvider, EngineState, GraphEngine, OfflineEngine,
    OfflineEngineProvider,
};
pub use envelope::EnvelopeFollower;
pub use error::PlaybackError;
pub use fade::{Curve, Fade, anchor_then_ramp};
pub use graph::{AutomationOp, GraphCommand, NodeId, NodeKind, Renderer, Waveform};
pub use math::{db_to_linear, linear_to_db, seconds_to_samples};
pub use oscillator::SineOscillator;
pub use preset::{Preset, PresetError, PresetTable};
pub use session::{DEFAULT_TONE_GAIN, GraphSettings, Session, ToneUnit, build};
