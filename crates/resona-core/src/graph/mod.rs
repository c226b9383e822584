//! Node graph shared by every engine.
//!
//! The graph is split in two halves joined by a command channel:
//!
//! - the control side (an engine handle) validates mutations, allocates
//!   [`NodeId`]s and sends [`GraphCommand`]s
//! - the render side ([`Renderer`]) owns the DSP objects and applies
//!   commands at block boundaries
//!
//! ```text
//! generator → attenuator ─┐
//! generator → attenuator ─┼→ fader → compressor → destination
//! generator → attenuator ─┘
//! ```

mod command;
mod node;
mod renderer;

pub use command::{AutomationOp, GraphCommand};
pub use node::{NodeId, NodeKind, Waveform};
pub use renderer::Renderer;
