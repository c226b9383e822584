//! Playback errors.

use thiserror::Error;

use crate::engine::EngineError;
use crate::graph::NodeId;

/// Errors surfaced by the graph builder and the playback controller.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No engine could be acquired or resumed. The controller stays idle.
    #[error("audio engine unavailable")]
    EngineUnavailable(#[source] EngineError),

    /// The requested preset does not exist.
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// Graph construction failed; everything built so far was released.
    #[error("failed to build tone graph")]
    GraphBuild(#[source] EngineError),

    /// A fade could not be scheduled. Logged, never fatal.
    #[error("failed to schedule gain ramp")]
    RampScheduling(#[source] EngineError),

    /// A node could not be stopped or disconnected. Logged, never fatal.
    #[error("failed to tear down {node}")]
    NodeTeardown {
        /// Node being released.
        node: NodeId,
        /// Engine failure.
        #[source]
        source: EngineError,
    },

    /// The engine could not be closed. Logged, never fatal.
    #[error("failed to close audio engine")]
    EngineRelease(#[source] EngineError),
}
