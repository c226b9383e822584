//! Real-time engine on a cpal output stream.
//!
//! The render graph's [`Renderer`](resona_core::Renderer) is moved into the
//! output callback; the control thread keeps the [`GraphEngine`] handle.
//! Engines are created Suspended (stream built but paused) and begin
//! rendering on `resume`. Closing drops the stream, which releases the
//! device and the renderer with it.

use cpal::Stream;
use cpal::traits::{DeviceTrait, StreamTrait};
use resona_core::{
    AudioEngine, CompressorSettings, EngineError, EngineProvider, EngineState, GraphEngine,
    NodeId, Waveform,
};

use crate::stream::{StreamConfig, device_name, find_output_device};
use crate::Error;

/// An [`AudioEngine`] rendering into the system's audio output.
pub struct CpalEngine {
    handle: GraphEngine,
    stream: Option<Stream>,
    device: String,
    channels: u16,
}

impl CpalEngine {
    /// Open the configured output device and build a paused stream.
    pub fn open(config: &StreamConfig) -> crate::Result<Self> {
        let host = cpal::default_host();
        let device = find_output_device(&host, config.output_device.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown".into());
        let channels = device
            .default_output_config()
            .map(|c| c.channels())
            .unwrap_or(2);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let (handle, mut renderer) =
            GraphEngine::new(config.sample_rate as f32, EngineState::Suspended);
        let frame_channels = usize::from(channels);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    renderer.render_interleaved(data, frame_channels);
                },
                |err| tracing::error!("output stream error: {err}"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        // Some hosts start streams on creation.
        if let Err(err) = stream.pause() {
            tracing::debug!("stream pause unsupported: {err}");
        }

        tracing::info!(
            device = name.as_str(),
            channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream opened"
        );

        Ok(Self {
            handle,
            stream: Some(stream),
            device: name,
            channels,
        })
    }

    /// Output device name.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Output channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl core::fmt::Debug for CpalEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CpalEngine")
            .field("device", &self.device)
            .field("channels", &self.channels)
            .field("state", &self.handle.state())
            .finish_non_exhaustive()
    }
}

impl AudioEngine for CpalEngine {
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
        let stream = self.stream.as_ref().ok_or(EngineError::Closed)?;
        stream
            .play()
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;
        self.handle.resume()?;
        tracing::info!(device = self.device.as_str(), "output stream started");
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.handle.close()?;
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                tracing::debug!("stream pause on close failed: {err}");
            }
            drop(stream);
        }
        tracing::info!(device = self.device.as_str(), "output stream closed");
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

/// Opens a [`CpalEngine`] per session with a fixed stream configuration.
#[derive(Debug, Clone, Default)]
pub struct CpalEngineProvider {
    config: StreamConfig,
}

impl CpalEngineProvider {
    /// Provider for `config`.
    pub fn new(config: StreamConfig) -> Self {
        tracing::info!(
            host = cpal::default_host().id().name(),
            "cpal provider initialized"
        );
        Self { config }
    }

    /// The stream configuration used for new engines.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl EngineProvider for CpalEngineProvider {
    type Engine = CpalEngine;

    fn acquire(&mut self) -> Result<CpalEngine, EngineError> {
        CpalEngine::open(&self.config).map_err(EngineError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_keeps_config() {
        let config = StreamConfig {
            sample_rate: 44100,
            buffer_size: 512,
            output_device: Some("speakers".into()),
        };
        let provider = CpalEngineProvider::new(config.clone());
        assert_eq!(provider.config(), &config);
    }

    #[test]
    fn test_missing_device_is_unavailable() {
        let mut provider = CpalEngineProvider::new(StreamConfig {
            output_device: Some("no-such-device-resona-test".into()),
            ..StreamConfig::default()
        });
        assert!(matches!(
            provider.acquire(),
            Err(EngineError::Unavailable(_))
        ));
    }

    #[test]
    fn test_engine_lifecycle_when_device_present() {
        // Only runs meaningfully on machines with an output device.
        let Ok(mut engine) = CpalEngine::open(&StreamConfig::default()) else {
            return;
        };
        assert_eq!(engine.state(), EngineState::Suspended);
        let gain = engine.create_gain(0.0).unwrap();
        engine.connect(gain, engine.destination()).unwrap();
        engine.close().unwrap();
        assert_eq!(engine.state(), EngineState::Closed);
        assert!(matches!(engine.resume(), Err(EngineError::Closed)));
    }
}
