//! Control → audio thread messages.
//!
//! The control handle validates every mutation before sending it, so the
//! renderer applies commands without error reporting.

use super::node::NodeId;
use crate::compressor::CompressorSettings;

/// A gain automation operation, already validated by the control handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationOp {
    /// Jump to `value` at `time`.
    SetValueAtTime {
        /// Target value.
        value: f32,
        /// Engine time in seconds.
        time: f64,
    },
    /// Linear ramp to `value` ending at `end_time`.
    LinearRamp {
        /// Target value.
        value: f32,
        /// Engine time in seconds.
        end_time: f64,
    },
    /// Exponential ramp to `value` ending at `end_time`.
    ExponentialRamp {
        /// Target value.
        value: f32,
        /// Engine time in seconds.
        end_time: f64,
    },
    /// Remove events at or after `time`.
    Cancel {
        /// Engine time in seconds.
        time: f64,
    },
}

/// Graph mutation drained by the renderer at the start of each block.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphCommand {
    /// Add a sine generator (initially not playing).
    AddOscillator {
        /// New node.
        id: NodeId,
        /// Frequency in Hz.
        frequency: f32,
    },
    /// Add a gain stage.
    AddGain {
        /// New node.
        id: NodeId,
        /// Initial gain.
        initial: f32,
    },
    /// Add a compressor.
    AddCompressor {
        /// New node.
        id: NodeId,
        /// Compressor configuration.
        settings: CompressorSettings,
    },
    /// Route `from`'s output into `to`.
    Connect {
        /// Source node.
        from: NodeId,
        /// Destination node.
        to: NodeId,
    },
    /// Remove all outgoing connections of a node.
    Disconnect {
        /// Source node.
        node: NodeId,
    },
    /// Begin generator output.
    Start {
        /// Generator node.
        node: NodeId,
    },
    /// End generator output permanently.
    Stop {
        /// Generator node.
        node: NodeId,
    },
    /// Apply an automation operation to a gain node.
    Automate {
        /// Gain node.
        node: NodeId,
        /// Operation.
        op: AutomationOp,
    },
    /// Drop every node except the destination.
    Clear,
}
