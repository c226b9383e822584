//! Audio engine abstraction.
//!
//! An [`AudioEngine`] is a handle to one live audio context: a clock, an
//! output destination, and a graph of nodes that can be created, wired,
//! started, stopped and automated. Engines are single-use. Once closed,
//! every operation fails with [`EngineError::Closed`], and a fresh engine is
//! obtained from an [`EngineProvider`].
//!
//! # Implementations
//!
//! - [`GraphEngine`] - control handle paired with a [`Renderer`](crate::graph::Renderer)
//!   that some other party drives (an audio callback, a test loop)
//! - [`OfflineEngine`] - handle and renderer in one value; time advances only
//!   when [`OfflineEngine::render`] is called
//!
//! The real-time cpal engine lives in `resona-io`.

mod graph_engine;
mod offline;

pub use graph_engine::GraphEngine;
pub use offline::{OfflineEngine, OfflineEngineProvider};

use thiserror::Error;

use crate::automation::AutomationError;
use crate::compressor::CompressorSettings;
use crate::graph::{NodeId, Waveform};

/// Lifecycle state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Rendering; the clock advances.
    Running,
    /// Created or paused; the clock is frozen.
    Suspended,
    /// Released; no further operations are possible.
    Closed,
}

impl core::fmt::Display for EngineState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Suspended => f.write_str("suspended"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// Errors reported by an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No engine could be created or resumed.
    #[error("audio engine unavailable: {0}")]
    Unavailable(String),

    /// The engine was closed.
    #[error("audio engine is closed")]
    Closed,

    /// The node does not belong to this engine.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Automation was requested on a node without a gain parameter.
    #[error("{0} has no gain parameter")]
    NotAGainNode(NodeId),

    /// The connection is not allowed.
    #[error("invalid connection {from} -> {to}: {reason}")]
    InvalidConnection {
        /// Source node.
        from: NodeId,
        /// Destination node.
        to: NodeId,
        /// Why it was refused.
        reason: &'static str,
    },

    /// Automation request rejected by the parameter timeline.
    #[error("invalid ramp: {0}")]
    InvalidRamp(#[from] AutomationError),

    /// Operation not valid in the node's current state.
    #[error("invalid state for {node}: {reason}")]
    InvalidState {
        /// Node the operation targeted.
        node: NodeId,
        /// What was wrong.
        reason: &'static str,
    },

    /// Failure in the rendering backend.
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Handle to a live audio context.
///
/// Times are engine seconds as reported by [`current_time`](Self::current_time).
pub trait AudioEngine {
    /// Current lifecycle state.
    fn state(&self) -> EngineState;

    /// Output sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Seconds of audio rendered so far.
    fn current_time(&self) -> f64;

    /// Start (or continue) rendering.
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Release the engine. All later calls fail with [`EngineError::Closed`].
    fn close(&mut self) -> Result<(), EngineError>;

    /// The output sink.
    fn destination(&self) -> NodeId;

    /// Create a tone generator. It is silent until [`start`](Self::start).
    fn create_oscillator(&mut self, waveform: Waveform, frequency: f32)
    -> Result<NodeId, EngineError>;

    /// Create a gain stage holding `initial`.
    fn create_gain(&mut self, initial: f32) -> Result<NodeId, EngineError>;

    /// Create a dynamics compressor.
    fn create_compressor(&mut self, settings: CompressorSettings) -> Result<NodeId, EngineError>;

    /// Route `from`'s output into `to`.
    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), EngineError>;

    /// Remove every outgoing connection of `node`.
    fn disconnect(&mut self, node: NodeId) -> Result<(), EngineError>;

    /// Begin generator output. A generator can be started once.
    fn start(&mut self, node: NodeId) -> Result<(), EngineError>;

    /// End generator output permanently.
    fn stop(&mut self, node: NodeId) -> Result<(), EngineError>;

    /// Schedule a gain jump to `value` at `time`.
    fn set_value_at_time(&mut self, node: NodeId, value: f32, time: f64)
    -> Result<(), EngineError>;

    /// Schedule a linear gain ramp reaching `value` at `end_time`.
    fn linear_ramp_to_value_at_time(
        &mut self,
        node: NodeId,
        value: f32,
        end_time: f64,
    ) -> Result<(), EngineError>;

    /// Schedule an exponential gain ramp reaching `value` at `end_time`.
    ///
    /// Both the value the ramp starts from and `value` must be above zero.
    fn exponential_ramp_to_value_at_time(
        &mut self,
        node: NodeId,
        value: f32,
        end_time: f64,
    ) -> Result<(), EngineError>;

    /// Remove gain events at or after `time`.
    fn cancel_scheduled_values(&mut self, node: NodeId, time: f64) -> Result<(), EngineError>;

    /// Gain value at [`current_time`](Self::current_time).
    fn gain_value(&self, node: NodeId) -> Result<f32, EngineError>;
}

/// Source of fresh engines, one per playback session.
pub trait EngineProvider {
    /// Engine type produced.
    type Engine: AudioEngine;

    /// Create a new engine. It may start Suspended.
    fn acquire(&mut self) -> Result<Self::Engine, EngineError>;
}
