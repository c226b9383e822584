//! Tone graph construction and teardown.
//!
//! [`build`] turns a preset into a live [`Session`]:
//!
//! ```text
//! sine(f₀) → attenuator(0.05) ─┐
//! sine(f₁) → attenuator(0.05) ─┼→ fader(0) → compressor → destination
//!   ⋮                           │
//! sine(fₙ) → attenuator(0.05) ─┘
//! ```
//!
//! Generators start immediately; the fader holds the ensemble silent until a
//! fade-in is scheduled on it.

use crate::compressor::CompressorSettings;
use crate::engine::{AudioEngine, EngineError, EngineState};
use crate::error::PlaybackError;
use crate::graph::{NodeId, Waveform};
use crate::preset::Preset;

/// Per-tone attenuation used unless configured otherwise.
pub const DEFAULT_TONE_GAIN: f32 = 0.05;

/// Fixed shape of the tone graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSettings {
    /// Generator waveform.
    pub waveform: Waveform,
    /// Gain applied to each tone before summing.
    pub tone_gain: f32,
    /// Compressor after the fader.
    pub compressor: CompressorSettings,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            tone_gain: DEFAULT_TONE_GAIN,
            compressor: CompressorSettings::default(),
        }
    }
}

/// One generator and its attenuator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneUnit {
    /// Tone frequency in Hz.
    pub frequency: f32,
    /// Generator node.
    pub generator: NodeId,
    /// Attenuator node the generator feeds.
    pub attenuator: NodeId,
}

/// The live graph of one play/stop cycle, and the engine it runs on.
#[derive(Debug)]
pub struct Session<E> {
    engine: E,
    preset_id: String,
    units: Vec<ToneUnit>,
    fader: NodeId,
    compressor: NodeId,
}

impl<E: AudioEngine> Session<E> {
    /// Preset this session plays.
    pub fn preset_id(&self) -> &str {
        &self.preset_id
    }

    /// Tone units in preset order.
    pub fn units(&self) -> &[ToneUnit] {
        &self.units
    }

    /// Number of generators.
    pub fn generator_count(&self) -> usize {
        self.units.len()
    }

    /// Master fader gain node.
    pub fn fader(&self) -> NodeId {
        self.fader
    }

    /// Compressor node.
    pub fn compressor(&self) -> NodeId {
        self.compressor
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Stop and disconnect every node, then close the engine.
    ///
    /// Each step is attempted regardless of earlier failures. The failures
    /// are returned in the order they happened.
    pub fn teardown(mut self) -> Vec<PlaybackError> {
        let mut failures = Vec::new();
        let mut attempt = |node: NodeId, result: Result<(), EngineError>| {
            if let Err(source) = result {
                failures.push(PlaybackError::NodeTeardown { node, source });
            }
        };

        for unit in &self.units {
            attempt(unit.generator, self.engine.stop(unit.generator));
            attempt(unit.generator, self.engine.disconnect(unit.generator));
            attempt(unit.attenuator, self.engine.disconnect(unit.attenuator));
        }
        attempt(self.fader, self.engine.disconnect(self.fader));
        attempt(self.compressor, self.engine.disconnect(self.compressor));

        if let Err(err) = self.engine.close() {
            failures.push(PlaybackError::EngineRelease(err));
        }
        failures
    }
}

/// Build the tone graph for `preset` on `engine`.
///
/// The engine must be Running. On failure every node created so far is
/// released and the engine is closed before the error is returned.
pub fn build<E: AudioEngine>(
    mut engine: E,
    preset: &Preset,
    settings: &GraphSettings,
) -> Result<Session<E>, PlaybackError> {
    let mut created = Vec::new();
    match assemble(&mut engine, preset.frequencies(), settings, &mut created) {
        Ok((fader, compressor, units)) => {
            tracing::debug!(
                "session_build: '{}' with {} tones",
                preset.id(),
                units.len()
            );
            Ok(Session {
                engine,
                preset_id: preset.id().to_owned(),
                units,
                fader,
                compressor,
            })
        }
        Err(err) => {
            abandon(&mut engine, &created);
            Err(PlaybackError::GraphBuild(err))
        }
    }
}

fn assemble<E: AudioEngine>(
    engine: &mut E,
    frequencies: &[f32],
    settings: &GraphSettings,
    created: &mut Vec<NodeId>,
) -> Result<(NodeId, NodeId, Vec<ToneUnit>), EngineError> {
    let state = engine.state();
    if state != EngineState::Running {
        return Err(EngineError::Unavailable(format!("engine is {state}")));
    }

    let fader = engine.create_gain(0.0)?;
    created.push(fader);
    let compressor = engine.create_compressor(settings.compressor)?;
    created.push(compressor);
    engine.connect(fader, compressor)?;
    engine.connect(compressor, engine.destination())?;

    let mut units = Vec::with_capacity(frequencies.len());
    for &frequency in frequencies {
        let generator = engine.create_oscillator(settings.waveform, frequency)?;
        created.push(generator);
        let attenuator = engine.create_gain(settings.tone_gain)?;
        created.push(attenuator);
        engine.connect(generator, attenuator)?;
        engine.connect(attenuator, fader)?;
        engine.start(generator)?;
        units.push(ToneUnit {
            frequency,
            generator,
            attenuator,
        });
    }

    Ok((fader, compressor, units))
}

/// Release a partially built graph. Failures here are logged only.
fn abandon<E: AudioEngine>(engine: &mut E, created: &[NodeId]) {
    if engine.state() == EngineState::Closed {
        return;
    }
    for &node in created {
        // Generators that were never started report an error here.
        let _ = engine.stop(node);
        if let Err(err) = engine.disconnect(node) {
            tracing::warn!("session_abandon: {node} not released: {err}");
        }
    }
    if let Err(err) = engine.close() {
        tracing::warn!("session_abandon: engine not closed: {err}");
    }
}
