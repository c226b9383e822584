//! Graph node identity and roles.

use crate::compressor::CompressorSettings;

/// Unique identifier for a node in an engine's graph.
///
/// Node IDs are assigned sequentially and never reused within an engine
/// instance. ID 0 is always the destination (output sink).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The output sink present in every graph.
    pub const DESTINATION: NodeId = NodeId(0);

    /// Wrap a raw identifier. For engines that allocate their own ids.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Generator waveform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure sine tone.
    #[default]
    Sine,
}

impl core::fmt::Display for Waveform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Sine => f.write_str("sine"),
        }
    }
}

/// The role of a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Output sink. Exactly one per graph, never created explicitly.
    Destination,
    /// Tone generator at a fixed frequency.
    Oscillator {
        /// Waveform shape.
        waveform: Waveform,
        /// Frequency in Hz.
        frequency: f32,
    },
    /// Automatable gain stage.
    Gain,
    /// Dynamics compressor.
    Compressor(CompressorSettings),
}

impl NodeKind {
    /// Whether other nodes may connect into this one.
    pub fn accepts_input(&self) -> bool {
        !matches!(self, Self::Oscillator { .. })
    }

    /// Whether this node may connect onwards.
    pub fn produces_output(&self) -> bool {
        !matches!(self, Self::Destination)
    }
}
