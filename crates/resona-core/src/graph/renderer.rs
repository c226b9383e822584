//! Audio-thread side of the graph.
//!
//! [`Renderer`] owns every DSP object. It drains pending [`GraphCommand`]s at
//! the start of each block, re-sorts the graph (Kahn's algorithm) when the
//! topology changed, then evaluates nodes sample by sample:
//!
//! - a node's input is the sum of all outputs connected into it
//! - generators output only between `Start` and `Stop`
//! - gain stages multiply by their automation value at the sample's time
//! - nodes without outgoing connections are skipped
//!
//! The destination's input is copied to every output channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Receiver;

use super::command::{AutomationOp, GraphCommand};
use super::node::NodeId;
use crate::automation::AutomationTimeline;
use crate::compressor::Compressor;
use crate::oscillator::SineOscillator;

enum RenderKind {
    Destination,
    Oscillator {
        osc: SineOscillator,
        playing: bool,
    },
    Gain(AutomationTimeline),
    Compressor(Compressor),
}

struct RenderNode {
    kind: RenderKind,
    outgoing: Vec<usize>,
}

/// Render-side graph, driven by an audio callback or an offline loop.
pub struct Renderer {
    sample_rate: f32,
    commands: Receiver<GraphCommand>,
    /// Frames rendered so far, shared with the control handle as its clock.
    frames: Arc<AtomicU64>,
    nodes: Vec<Option<RenderNode>>,
    /// Processing order (node indices), destination excluded.
    order: Vec<usize>,
    /// Per-node input accumulators for the current sample.
    inputs: Vec<f32>,
    /// Scratch space for the topological sort, kept between sorts.
    active: Vec<bool>,
    in_degree: Vec<u32>,
    queue: Vec<usize>,
    topology_dirty: bool,
}

impl Renderer {
    pub(crate) fn new(
        sample_rate: f32,
        commands: Receiver<GraphCommand>,
        frames: Arc<AtomicU64>,
    ) -> Self {
        Self {
            sample_rate,
            commands,
            frames,
            nodes: vec![Some(RenderNode {
                kind: RenderKind::Destination,
                outgoing: Vec::new(),
            })],
            order: Vec::new(),
            inputs: vec![0.0],
            active: Vec::new(),
            in_degree: Vec::new(),
            queue: Vec::new(),
            topology_dirty: false,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Number of live nodes, destination included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Render interleaved output with `channels` channels.
    ///
    /// `out.len()` should be a multiple of `channels`; a trailing partial
    /// frame is zeroed.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        self.apply_pending();

        let start_frame = self.frames.load(Ordering::Acquire);
        let start_time = start_frame as f64 / f64::from(self.sample_rate);
        self.prune_automation(start_time);

        let mut frames = 0u64;
        for frame in out.chunks_mut(channels) {
            if frame.len() < channels {
                frame.fill(0.0);
                break;
            }
            let time = (start_frame + frames) as f64 / f64::from(self.sample_rate);
            let sample = self.process_sample(time);
            frame.fill(sample);
            frames += 1;
        }

        self.frames.store(start_frame + frames, Ordering::Release);
    }

    /// Render mono output.
    pub fn render(&mut self, out: &mut [f32]) {
        self.render_interleaved(out, 1);
    }

    #[inline]
    fn process_sample(&mut self, time: f64) -> f32 {
        let Self {
            nodes,
            order,
            inputs,
            ..
        } = self;

        inputs.fill(0.0);
        for &idx in order.iter() {
            let Some(node) = nodes[idx].as_mut() else {
                continue;
            };
            let input = inputs[idx];
            let output = match &mut node.kind {
                RenderKind::Destination => input,
                RenderKind::Oscillator { osc, playing } => {
                    if *playing {
                        osc.advance()
                    } else {
                        0.0
                    }
                }
                RenderKind::Gain(timeline) => input * timeline.value_at(time),
                RenderKind::Compressor(comp) => comp.process(input),
            };
            for &target in &node.outgoing {
                inputs[target] += output;
            }
        }

        inputs[NodeId::DESTINATION.0 as usize]
    }

    fn apply_pending(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
        }
        if self.topology_dirty {
            self.recompile();
            self.topology_dirty = false;
        }
    }

    fn apply(&mut self, command: GraphCommand) {
        match command {
            GraphCommand::AddOscillator { id, frequency } => self.insert(
                id,
                RenderKind::Oscillator {
                    osc: SineOscillator::new(self.sample_rate, frequency),
                    playing: false,
                },
            ),
            GraphCommand::AddGain { id, initial } => {
                self.insert(id, RenderKind::Gain(AutomationTimeline::new(initial)));
            }
            GraphCommand::AddCompressor { id, settings } => self.insert(
                id,
                RenderKind::Compressor(Compressor::new(self.sample_rate, settings)),
            ),
            GraphCommand::Connect { from, to } => {
                let to_idx = to.0 as usize;
                if let Some(node) = self.node_mut(from)
                    && !node.outgoing.contains(&to_idx)
                {
                    node.outgoing.push(to_idx);
                    self.topology_dirty = true;
                }
            }
            GraphCommand::Disconnect { node } => {
                if let Some(node) = self.node_mut(node) {
                    node.outgoing.clear();
                    self.topology_dirty = true;
                }
            }
            GraphCommand::Start { node } => self.set_playing(node, true),
            GraphCommand::Stop { node } => self.set_playing(node, false),
            GraphCommand::Automate { node, op } => {
                if let Some(RenderNode {
                    kind: RenderKind::Gain(timeline),
                    ..
                }) = self.node_mut(node)
                {
                    // Validated by the control handle before sending.
                    let _ = match op {
                        AutomationOp::SetValueAtTime { value, time } => {
                            timeline.set_value_at_time(value, time)
                        }
                        AutomationOp::LinearRamp { value, end_time } => {
                            timeline.linear_ramp_to_value_at_time(value, end_time)
                        }
                        AutomationOp::ExponentialRamp { value, end_time } => {
                            timeline.exponential_ramp_to_value_at_time(value, end_time)
                        }
                        AutomationOp::Cancel { time } => timeline.cancel_scheduled_values(time),
                    };
                }
            }
            GraphCommand::Clear => {
                self.nodes.truncate(1);
                if let Some(dest) = self.nodes[0].as_mut() {
                    dest.outgoing.clear();
                }
                self.topology_dirty = true;
            }
        }
    }

    fn insert(&mut self, id: NodeId, kind: RenderKind) {
        let idx = id.0 as usize;
        if idx >= self.nodes.len() {
            self.nodes.resize_with(idx + 1, || None);
        }
        self.nodes[idx] = Some(RenderNode {
            kind,
            outgoing: Vec::new(),
        });
        self.topology_dirty = true;
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(id.0 as usize)?.as_mut()
    }

    fn set_playing(&mut self, id: NodeId, value: bool) {
        if let Some(RenderNode {
            kind: RenderKind::Oscillator { playing, .. },
            ..
        }) = self.node_mut(id)
        {
            *playing = value;
        }
    }

    fn prune_automation(&mut self, time: f64) {
        for node in self.nodes.iter_mut().flatten() {
            if let RenderKind::Gain(timeline) = &mut node.kind {
                timeline.prune(time);
            }
        }
    }

    /// Kahn's topological sort over nodes that feed something.
    ///
    /// Runs on the audio thread; buffers only grow when nodes are added.
    fn recompile(&mut self) {
        let n = self.nodes.len();
        self.inputs.resize(n, 0.0);

        // Edges pointing at removed slots are dropped from the walk.
        for node in self.nodes.iter_mut().flatten() {
            node.outgoing.retain(|&to| to < n);
        }

        self.active.clear();
        self.active.extend(
            self.nodes
                .iter()
                .map(|node| node.as_ref().is_some_and(|node| !node.outgoing.is_empty())),
        );

        self.in_degree.clear();
        self.in_degree.resize(n, 0);
        for (idx, node) in self.nodes.iter().enumerate() {
            if let (true, Some(node)) = (self.active[idx], node) {
                for &to in &node.outgoing {
                    if self.active[to] {
                        self.in_degree[to] += 1;
                    }
                }
            }
        }

        self.queue.clear();
        self.queue
            .extend((0..n).filter(|&i| self.active[i] && self.in_degree[i] == 0));
        self.order.clear();

        while let Some(idx) = self.queue.pop() {
            self.order.push(idx);
            if let Some(node) = &self.nodes[idx] {
                for &to in &node.outgoing {
                    if self.active[to] {
                        self.in_degree[to] -= 1;
                        if self.in_degree[to] == 0 {
                            self.queue.push(to);
                        }
                    }
                }
            }
        }
    }
}

impl core::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Renderer")
            .field("sample_rate", &self.sample_rate)
            .field("nodes", &self.node_count())
            .field("frames", &self.frames_rendered())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::CompressorSettings;
    use crossbeam_channel::unbounded;

    fn renderer() -> (crossbeam_channel::Sender<GraphCommand>, Renderer) {
        let (tx, rx) = unbounded();
        let renderer = Renderer::new(48000.0, rx, Arc::new(AtomicU64::new(0)));
        (tx, renderer)
    }

    #[test]
    fn empty_graph_is_silent() {
        let (_tx, mut r) = renderer();
        let mut out = vec![1.0; 64];
        r.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(r.frames_rendered(), 64);
    }

    #[test]
    fn oscillator_through_gain_reaches_destination() {
        let (tx, mut r) = renderer();
        let osc = NodeId(1);
        let gain = NodeId(2);
        tx.send(GraphCommand::AddOscillator { id: osc, frequency: 1000.0 }).unwrap();
        tx.send(GraphCommand::AddGain { id: gain, initial: 0.5 }).unwrap();
        tx.send(GraphCommand::Connect { from: osc, to: gain }).unwrap();
        tx.send(GraphCommand::Connect { from: gain, to: NodeId::DESTINATION }).unwrap();
        tx.send(GraphCommand::Start { node: osc }).unwrap();

        let mut out = vec![0.0; 48];
        r.render(&mut out);
        let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 1e-3, "peak {peak}");
    }

    #[test]
    fn unstarted_oscillator_is_silent() {
        let (tx, mut r) = renderer();
        tx.send(GraphCommand::AddOscillator { id: NodeId(1), frequency: 440.0 }).unwrap();
        tx.send(GraphCommand::Connect { from: NodeId(1), to: NodeId::DESTINATION }).unwrap();
        let mut out = vec![0.0; 128];
        r.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn disconnect_silences_branch() {
        let (tx, mut r) = renderer();
        tx.send(GraphCommand::AddOscillator { id: NodeId(1), frequency: 440.0 }).unwrap();
        tx.send(GraphCommand::Connect { from: NodeId(1), to: NodeId::DESTINATION }).unwrap();
        tx.send(GraphCommand::Start { node: NodeId(1) }).unwrap();
        let mut out = vec![0.0; 128];
        r.render(&mut out);
        assert!(out.iter().any(|&s| s != 0.0));

        tx.send(GraphCommand::Disconnect { node: NodeId(1) }).unwrap();
        r.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn resort_reuses_buffers_across_topology_changes() {
        let (tx, mut r) = renderer();
        let osc = NodeId(1);
        let gain = NodeId(2);
        tx.send(GraphCommand::AddOscillator { id: osc, frequency: 440.0 }).unwrap();
        tx.send(GraphCommand::AddGain { id: gain, initial: 1.0 }).unwrap();
        tx.send(GraphCommand::Connect { from: osc, to: gain }).unwrap();
        tx.send(GraphCommand::Connect { from: gain, to: NodeId::DESTINATION }).unwrap();
        tx.send(GraphCommand::Start { node: osc }).unwrap();
        let mut out = vec![0.0; 128];
        r.render(&mut out);
        assert_eq!(r.order, [1, 2]);
        let capacity = (r.order.capacity(), r.in_degree.capacity(), r.queue.capacity());

        tx.send(GraphCommand::Disconnect { node: gain }).unwrap();
        r.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(r.order, [1]);

        tx.send(GraphCommand::Connect { from: gain, to: NodeId::DESTINATION }).unwrap();
        r.render(&mut out);
        assert!(out.iter().any(|&s| s != 0.0));
        assert_eq!(r.order, [1, 2]);
        assert_eq!(
            (r.order.capacity(), r.in_degree.capacity(), r.queue.capacity()),
            capacity
        );
    }

    #[test]
    fn summing_and_compression_stay_bounded() {
        let (tx, mut r) = renderer();
        let fader = NodeId(1);
        let comp = NodeId(2);
        tx.send(GraphCommand::AddGain { id: fader, initial: 1.0 }).unwrap();
        tx.send(GraphCommand::AddCompressor { id: comp, settings: CompressorSettings::default() })
            .unwrap();
        tx.send(GraphCommand::Connect { from: fader, to: comp }).unwrap();
        tx.send(GraphCommand::Connect { from: comp, to: NodeId::DESTINATION }).unwrap();
        for i in 0..30u32 {
            let id = NodeId(3 + i);
            tx.send(GraphCommand::AddOscillator { id, frequency: 20.0 + i as f32 * 2.5 }).unwrap();
            tx.send(GraphCommand::Connect { from: id, to: fader }).unwrap();
            tx.send(GraphCommand::Start { node: id }).unwrap();
        }

        let mut out = vec![0.0; 48000];
        r.render(&mut out);
        // Uncompressed sum would peak near 30.0
        assert!(out.iter().all(|s| s.is_finite()));
        let tail_peak = out[24000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail_peak < 10.0, "tail peak {tail_peak}");
    }

    #[test]
    fn stereo_frames_duplicate_mono_signal() {
        let (tx, mut r) = renderer();
        tx.send(GraphCommand::AddOscillator { id: NodeId(1), frequency: 440.0 }).unwrap();
        tx.send(GraphCommand::Connect { from: NodeId(1), to: NodeId::DESTINATION }).unwrap();
        tx.send(GraphCommand::Start { node: NodeId(1) }).unwrap();
        let mut out = vec![0.0; 256];
        r.render_interleaved(&mut out, 2);
        for frame in out.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert_eq!(r.frames_rendered(), 128);
    }

    #[test]
    fn clear_drops_all_nodes() {
        let (tx, mut r) = renderer();
        tx.send(GraphCommand::AddGain { id: NodeId(1), initial: 1.0 }).unwrap();
        tx.send(GraphCommand::AddOscillator { id: NodeId(2), frequency: 50.0 }).unwrap();
        let mut out = vec![0.0; 8];
        r.render(&mut out);
        assert_eq!(r.node_count(), 3);
        tx.send(GraphCommand::Clear).unwrap();
        r.render(&mut out);
        assert_eq!(r.node_count(), 1);
    }
}
