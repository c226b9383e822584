//! Audio output for resona.
//!
//! This crate provides:
//!
//! - **Real-time playback**: [`CpalEngine`] runs a resona render graph inside a
//!   cpal output callback; [`CpalEngineProvider`] opens one per session
//! - **Device listing**: [`list_devices`] and [`default_output_device`]
//! - **WAV file I/O**: [`write_wav`] and [`read_wav`] for offline renders
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use resona_core::{PlaybackController, PlaybackSettings};
//! use resona_io::{CpalEngineProvider, StreamConfig};
//!
//! let provider = CpalEngineProvider::new(StreamConfig::default());
//! let mut player = PlaybackController::new(provider, presets, PlaybackSettings::default());
//! player.start("khufu")?;
//! ```

mod cpal_engine;
mod stream;
mod wav;

pub use cpal_engine::{CpalEngine, CpalEngineProvider};
pub use stream::{AudioDevice, StreamConfig, default_output_device, list_devices};
pub use wav::{WavSpec, read_wav, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for resona_core::EngineError {
    fn from(err: Error) -> Self {
        resona_core::EngineError::Unavailable(err.to_string())
    }
}
