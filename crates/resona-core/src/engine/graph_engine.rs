//! Control handle for a channel-driven [`Renderer`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Sender, unbounded};

use super::{AudioEngine, EngineError, EngineState};
use crate::automation::{AutomationError, AutomationTimeline};
use crate::compressor::CompressorSettings;
use crate::graph::{AutomationOp, GraphCommand, NodeId, NodeKind, Renderer, Waveform};

/// Control-side view of one node.
#[derive(Debug, Clone)]
struct NodeMirror {
    kind: NodeKind,
    outgoing: Vec<NodeId>,
    started: bool,
    stopped: bool,
    /// Gain automation, mirrored so values can be read without the renderer.
    gain: Option<AutomationTimeline>,
}

impl NodeMirror {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            outgoing: Vec::new(),
            started: false,
            stopped: false,
            gain: None,
        }
    }
}

/// Engine handle that validates graph mutations and forwards them to a
/// [`Renderer`] over a channel.
///
/// The renderer's frame counter is the engine clock, so `current_time` only
/// advances while somebody renders.
///
/// # Example
///
/// ```rust
/// use resona_core::{AudioEngine, EngineState, GraphEngine, Waveform};
///
/// let (mut engine, mut renderer) = GraphEngine::new(48000.0, EngineState::Running);
/// let osc = engine.create_oscillator(Waveform::Sine, 440.0).unwrap();
/// engine.connect(osc, engine.destination()).unwrap();
/// engine.start(osc).unwrap();
///
/// let mut block = [0.0f32; 256];
/// renderer.render(&mut block);
/// assert!(block.iter().any(|&s| s != 0.0));
/// ```
#[derive(Debug)]
pub struct GraphEngine {
    sample_rate: f32,
    state: EngineState,
    commands: Sender<GraphCommand>,
    frames: Arc<AtomicU64>,
    nodes: Vec<NodeMirror>,
}

impl GraphEngine {
    /// Create a handle and the renderer it controls.
    pub fn new(sample_rate: f32, initial_state: EngineState) -> (Self, Renderer) {
        let (tx, rx) = unbounded();
        let frames = Arc::new(AtomicU64::new(0));
        let renderer = Renderer::new(sample_rate, rx, Arc::clone(&frames));
        let engine = Self {
            sample_rate,
            state: initial_state,
            commands: tx,
            frames,
            nodes: vec![NodeMirror::new(NodeKind::Destination)],
        };
        (engine, renderer)
    }

    /// Number of nodes created, destination included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Role of `node`, if it exists.
    pub fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node.0 as usize).map(|n| n.kind)
    }

    /// Current outgoing connections of `node`.
    pub fn outgoing(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0 as usize)
            .map_or(&[], |n| n.outgoing.as_slice())
    }

    /// Whether a generator has been started and not stopped.
    pub fn is_playing(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.0 as usize)
            .is_some_and(|n| n.started && !n.stopped)
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.state == EngineState::Closed {
            Err(EngineError::Closed)
        } else {
            Ok(())
        }
    }

    fn send(&self, command: GraphCommand) -> Result<(), EngineError> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::Backend("renderer disconnected".into()))
    }

    fn node(&self, id: NodeId) -> Result<&NodeMirror, EngineError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(EngineError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeMirror, EngineError> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or(EngineError::UnknownNode(id))
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeMirror::new(kind));
        id
    }

    /// Whether `target` is reachable from `start` along existing edges.
    fn can_reach(&self, start: NodeId, target: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            let idx = current.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            stack.extend(self.nodes[idx].outgoing.iter().copied());
        }
        false
    }

    fn gain_timeline(&mut self, id: NodeId) -> Result<&mut AutomationTimeline, EngineError> {
        self.ensure_open()?;
        self.node_mut(id)?
            .gain
            .as_mut()
            .ok_or(EngineError::NotAGainNode(id))
    }

    fn automate(
        &mut self,
        node: NodeId,
        op: AutomationOp,
        apply: impl FnOnce(&mut AutomationTimeline) -> Result<(), AutomationError>,
    ) -> Result<(), EngineError> {
        let now = self.current_time();
        let timeline = self.gain_timeline(node)?;
        apply(timeline)?;
        timeline.prune(now);
        tracing::debug!("graph_automate: {node} {op:?}");
        self.send(GraphCommand::Automate { node, op })
    }
}

impl AudioEngine for GraphEngine {
    fn state(&self) -> EngineState {
        self.state
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn current_time(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / f64::from(self.sample_rate)
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.state = EngineState::Running;
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.state = EngineState::Closed;
        // The renderer may already be gone; nothing left to release then.
        let _ = self.commands.send(GraphCommand::Clear);
        tracing::debug!("graph_close: {} nodes released", self.nodes.len() - 1);
        Ok(())
    }

    fn destination(&self) -> NodeId {
        NodeId::DESTINATION
    }

    fn create_oscillator(
        &mut self,
        waveform: Waveform,
        frequency: f32,
    ) -> Result<NodeId, EngineError> {
        self.ensure_open()?;
        if !frequency.is_finite() || frequency < 0.0 {
            return Err(EngineError::Backend(format!(
                "oscillator frequency {frequency} out of range"
            )));
        }
        let id = self.add_node(NodeKind::Oscillator {
            waveform,
            frequency,
        });
        self.send(GraphCommand::AddOscillator { id, frequency })?;
        tracing::debug!("graph_add: {waveform} oscillator {id} at {frequency} Hz");
        Ok(id)
    }

    fn create_gain(&mut self, initial: f32) -> Result<NodeId, EngineError> {
        self.ensure_open()?;
        if !initial.is_finite() {
            return Err(AutomationError::InvalidValue(initial).into());
        }
        let id = self.add_node(NodeKind::Gain);
        self.nodes[id.0 as usize].gain = Some(AutomationTimeline::new(initial));
        self.send(GraphCommand::AddGain { id, initial })?;
        tracing::debug!("graph_add: gain node {id} = {initial}");
        Ok(id)
    }

    fn create_compressor(&mut self, settings: CompressorSettings) -> Result<NodeId, EngineError> {
        self.ensure_open()?;
        let settings = settings.clamped();
        let id = self.add_node(NodeKind::Compressor(settings));
        self.send(GraphCommand::AddCompressor { id, settings })?;
        tracing::debug!("graph_add: compressor node {id}");
        Ok(id)
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), EngineError> {
        self.ensure_open()?;
        let invalid = |reason| EngineError::InvalidConnection { from, to, reason };

        if !self.node(from)?.kind.produces_output() {
            return Err(invalid("source has no output"));
        }
        if !self.node(to)?.kind.accepts_input() {
            return Err(invalid("target has no input"));
        }
        if from == to || self.can_reach(to, from) {
            return Err(invalid("connection would create a cycle"));
        }
        if self.node(from)?.outgoing.contains(&to) {
            return Ok(());
        }

        self.send(GraphCommand::Connect { from, to })?;
        self.node_mut(from)?.outgoing.push(to);
        tracing::debug!("graph_connect: {from} → {to}");
        Ok(())
    }

    fn disconnect(&mut self, node: NodeId) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.node(node)?;
        self.send(GraphCommand::Disconnect { node })?;
        self.node_mut(node)?.outgoing.clear();
        tracing::debug!("graph_disconnect: {node}");
        Ok(())
    }

    fn start(&mut self, node: NodeId) -> Result<(), EngineError> {
        self.ensure_open()?;
        let mirror = self.node(node)?;
        if !matches!(mirror.kind, NodeKind::Oscillator { .. }) {
            return Err(EngineError::InvalidState {
                node,
                reason: "only generators can be started",
            });
        }
        if mirror.started {
            return Err(EngineError::InvalidState {
                node,
                reason: "generator already started",
            });
        }
        self.send(GraphCommand::Start { node })?;
        self.node_mut(node)?.started = true;
        tracing::debug!("graph_start: {node}");
        Ok(())
    }

    fn stop(&mut self, node: NodeId) -> Result<(), EngineError> {
        self.ensure_open()?;
        let mirror = self.node(node)?;
        if !mirror.started {
            return Err(EngineError::InvalidState {
                node,
                reason: "generator was never started",
            });
        }
        if mirror.stopped {
            return Ok(());
        }
        self.send(GraphCommand::Stop { node })?;
        self.node_mut(node)?.stopped = true;
        tracing::debug!("graph_stop: {node}");
        Ok(())
    }

    fn set_value_at_time(
        &mut self,
        node: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), EngineError> {
        self.automate(node, AutomationOp::SetValueAtTime { value, time }, |t| {
            t.set_value_at_time(value, time)
        })
    }

    fn linear_ramp_to_value_at_time(
        &mut self,
        node: NodeId,
        value: f32,
        end_time: f64,
    ) -> Result<(), EngineError> {
        self.automate(node, AutomationOp::LinearRamp { value, end_time }, |t| {
            t.linear_ramp_to_value_at_time(value, end_time)
        })
    }

    fn exponential_ramp_to_value_at_time(
        &mut self,
        node: NodeId,
        value: f32,
        end_time: f64,
    ) -> Result<(), EngineError> {
        self.automate(node, AutomationOp::ExponentialRamp { value, end_time }, |t| {
            t.exponential_ramp_to_value_at_time(value, end_time)
        })
    }

    fn cancel_scheduled_values(&mut self, node: NodeId, time: f64) -> Result<(), EngineError> {
        self.automate(node, AutomationOp::Cancel { time }, |t| {
            t.cancel_scheduled_values(time)
        })
    }

    fn gain_value(&self, node: NodeId) -> Result<f32, EngineError> {
        self.ensure_open()?;
        let timeline = self
            .node(node)?
            .gain
            .as_ref()
            .ok_or(EngineError::NotAGainNode(node))?;
        Ok(timeline.value_at(self.current_time()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> (GraphEngine, Renderer) {
        GraphEngine::new(48000.0, EngineState::Running)
    }

    #[test]
    fn ids_are_sequential_after_destination() {
        let (mut engine, _r) = running();
        let a = engine.create_gain(1.0).unwrap();
        let b = engine.create_oscillator(Waveform::Sine, 100.0).unwrap();
        assert_eq!(a.index(), 1);
        assert_eq!(b.index(), 2);
        assert_eq!(engine.node_count(), 3);
        assert_eq!(engine.node_kind(a), Some(NodeKind::Gain));
    }

    #[test]
    fn rejects_connection_into_generator() {
        let (mut engine, _r) = running();
        let gain = engine.create_gain(1.0).unwrap();
        let osc = engine.create_oscillator(Waveform::Sine, 100.0).unwrap();
        let err = engine.connect(gain, osc).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConnection { .. }));
    }

    #[test]
    fn rejects_connection_out_of_destination() {
        let (mut engine, _r) = running();
        let gain = engine.create_gain(1.0).unwrap();
        let err = engine.connect(NodeId::DESTINATION, gain).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConnection { .. }));
    }

    #[test]
    fn rejects_cycles() {
        let (mut engine, _r) = running();
        let a = engine.create_gain(1.0).unwrap();
        let b = engine.create_gain(1.0).unwrap();
        engine.connect(a, b).unwrap();
        assert!(engine.connect(b, a).is_err());
        assert!(engine.connect(a, a).is_err());
    }

    #[test]
    fn connect_is_idempotent() {
        let (mut engine, _r) = running();
        let a = engine.create_gain(1.0).unwrap();
        engine.connect(a, NodeId::DESTINATION).unwrap();
        engine.connect(a, NodeId::DESTINATION).unwrap();
        assert_eq!(engine.outgoing(a), &[NodeId::DESTINATION]);
    }

    #[test]
    fn unknown_node_reported() {
        let (mut engine, _r) = running();
        let err = engine.disconnect(NodeId(42)).unwrap_err();
        assert!(matches!(err, EngineError::UnknownNode(id) if id.index() == 42));
    }

    #[test]
    fn generator_start_stop_rules() {
        let (mut engine, _r) = running();
        let osc = engine.create_oscillator(Waveform::Sine, 100.0).unwrap();
        assert!(engine.stop(osc).is_err());
        engine.start(osc).unwrap();
        assert!(engine.is_playing(osc));
        assert!(engine.start(osc).is_err());
        engine.stop(osc).unwrap();
        engine.stop(osc).unwrap();
        assert!(!engine.is_playing(osc));

        let gain = engine.create_gain(1.0).unwrap();
        assert!(matches!(
            engine.start(gain),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn automation_requires_gain_node() {
        let (mut engine, _r) = running();
        let osc = engine.create_oscillator(Waveform::Sine, 100.0).unwrap();
        assert!(matches!(
            engine.set_value_at_time(osc, 0.0, 0.0),
            Err(EngineError::NotAGainNode(_))
        ));
    }

    #[test]
    fn exponential_ramp_from_zero_rejected() {
        let (mut engine, _r) = running();
        let gain = engine.create_gain(0.0).unwrap();
        let err = engine
            .exponential_ramp_to_value_at_time(gain, 0.001, 1.0)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRamp(_)));
    }

    #[test]
    fn gain_value_follows_rendered_time() {
        let (mut engine, mut renderer) = running();
        let gain = engine.create_gain(0.0).unwrap();
        engine.set_value_at_time(gain, 0.0, 0.0).unwrap();
        engine.linear_ramp_to_value_at_time(gain, 1.0, 1.0).unwrap();
        assert_eq!(engine.gain_value(gain).unwrap(), 0.0);

        let mut block = vec![0.0; 24000];
        renderer.render(&mut block);
        assert!((engine.current_time() - 0.5).abs() < 1e-9);
        assert!((engine.gain_value(gain).unwrap() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn closed_engine_refuses_everything() {
        let (mut engine, _r) = running();
        let gain = engine.create_gain(1.0).unwrap();
        engine.close().unwrap();
        assert_eq!(engine.state(), EngineState::Closed);
        assert!(matches!(engine.create_gain(1.0), Err(EngineError::Closed)));
        assert!(matches!(engine.disconnect(gain), Err(EngineError::Closed)));
        assert!(matches!(engine.resume(), Err(EngineError::Closed)));
        assert!(matches!(engine.close(), Err(EngineError::Closed)));
    }

    #[test]
    fn dropped_renderer_is_backend_error() {
        let (mut engine, renderer) = running();
        drop(renderer);
        assert!(matches!(engine.create_gain(1.0), Err(EngineError::Backend(_))));
    }
}
