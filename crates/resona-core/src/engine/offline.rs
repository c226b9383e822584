//! Engine rendered on demand, for tests and file export.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{AudioEngine, EngineError, EngineProvider, EngineState, GraphEngine};
use crate::compressor::CompressorSettings;
use crate::graph::{NodeId, Renderer, Waveform};

/// An engine whose clock advances only when [`render`](Self::render) runs.
///
/// Rendering produces audio only while the engine is Running; a suspended
/// or closed engine yields silence and its clock stays put.
#[derive(Debug)]
pub struct OfflineEngine {
    handle: GraphEngine,
    renderer: Renderer,
    closed: Option<Arc<AtomicUsize>>,
}

impl OfflineEngine {
    /// Create an engine in `state` at `sample_rate`.
    pub fn new(sample_rate: f32, state: EngineState) -> Self {
        let (handle, renderer) = GraphEngine::new(sample_rate, state);
        Self {
            handle,
            renderer,
            closed: None,
        }
    }

    /// Render mono samples into `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.handle.state() == EngineState::Running {
            self.renderer.render(out);
        } else {
            out.fill(0.0);
        }
    }

    /// Render `seconds` of mono audio into a new buffer.
    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let len = crate::math::seconds_to_samples(seconds, self.handle.sample_rate());
        let mut out = vec![0.0; len];
        self.render(&mut out);
        out
    }

    /// The control handle, for graph introspection.
    pub fn handle(&self) -> &GraphEngine {
        &self.handle
    }
}

impl AudioEngine for OfflineEngine {
    fn state(&self) -> EngineState {
        self.handle.state()
    }

    fn sample_rate(&self) -> f32 {
        self.handle.sample_rate()
    }

    fn current_time(&self) -> f64 {
        self.handle.current_time()
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.handle.resume()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.handle.close()?;
        // Apply the clear now rather than on a render that may never come.
        self.renderer.render(&mut []);
        if let Some(closed) = &self.closed {
            closed.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn destination(&self) -> NodeId {
        self.handle.destination()
    }

    fn create_oscillator(
        &mut self,
        waveform: Waveform,
        frequency: f32,
    ) -> Result<NodeId, EngineError> {
        self.handle.create_oscillator(waveform, frequency)
    }

    fn create_gain(&mut self, initial: f32) -> Result<NodeId, EngineError> {
        self.handle.create_gain(initial)
    }

    fn create_compressor(&mut self, settings: CompressorSettings) -> Result<NodeId, EngineError> {
        self.handle.create_compressor(settings)
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), EngineError> {
        self.handle.connect(from, to)
    }

    fn disconnect(&mut self, node: NodeId) -> Result<(), EngineError> {
        self.handle.disconnect(node)
    }

    fn start(&mut self, node: NodeId) -> Result<(), EngineError> {
        self.handle.start(node)
    }

    fn stop(&mut self, node: NodeId) -> Result<(), EngineError> {
        self.handle.stop(node)
    }

    fn set_value_at_time(
        &mut self,
        node: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), EngineError> {
        self.handle.set_value_at_time(node, value, time)
    }

    fn linear_ramp_to_value_at_time(
        &mut self,
        node: NodeId,
        value: f32,
        end_time: f64,
    ) -> Result<(), EngineError> {
        self.handle.linear_ramp_to_value_at_time(node, value, end_time)
    }

    fn exponential_ramp_to_value_at_time(
        &mut self,
        node: NodeId,
        value: f32,
        end_time: f64,
    ) -> Result<(), EngineError> {
        self.handle
            .exponential_ramp_to_value_at_time(node, value, end_time)
    }

    fn cancel_scheduled_values(&mut self, node: NodeId, time: f64) -> Result<(), EngineError> {
        self.handle.cancel_scheduled_values(node, time)
    }

    fn gain_value(&self, node: NodeId) -> Result<f32, EngineError> {
        self.handle.gain_value(node)
    }
}

/// Provider of [`OfflineEngine`]s.
#[derive(Debug, Clone)]
pub struct OfflineEngineProvider {
    sample_rate: f32,
    initial_state: EngineState,
    acquired: usize,
    closed: Arc<AtomicUsize>,
}

impl OfflineEngineProvider {
    /// Engines start Suspended, like a freshly created real-time context.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            initial_state: EngineState::Suspended,
            acquired: 0,
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Override the state new engines start in.
    pub fn with_initial_state(mut self, state: EngineState) -> Self {
        self.initial_state = state;
        self
    }

    /// Number of engines handed out.
    pub fn acquired(&self) -> usize {
        self.acquired
    }

    /// Number of handed-out engines that have since been closed.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::Relaxed)
    }
}

impl Default for OfflineEngineProvider {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl EngineProvider for OfflineEngineProvider {
    type Engine = OfflineEngine;

    fn acquire(&mut self) -> Result<OfflineEngine, EngineError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(EngineError::Unavailable(format!(
                "invalid sample rate {}",
                self.sample_rate
            )));
        }
        self.acquired += 1;
        let mut engine = OfflineEngine::new(self.sample_rate, self.initial_state);
        engine.closed = Some(Arc::clone(&self.closed));
        Ok(engine)
    }
}
