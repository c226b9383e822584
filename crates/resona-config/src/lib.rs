//! Presets and configuration for resona.
//!
//! # Features
//!
//! - **Factory presets**: the Khufu, Khafre and Menkaure chamber resonances
//! - **Preset files**: load and save frequency presets as TOML
//! - **Catalog**: factory, user and config presets merged by id
//! - **Room modes**: compute preset frequencies from chamber dimensions
//! - **App config**: `resona.toml` with audio, fade and compressor settings
//! - **Paths**: platform-specific preset and config directories
//!
//! # Example
//!
//! ```rust,no_run
//! use resona_config::{AppConfig, PresetCatalog, paths};
//!
//! let config = AppConfig::load_or_default(paths::default_config_path()).unwrap();
//! let catalog = PresetCatalog::load(&config);
//! let settings = config.playback_settings().unwrap();
//!
//! for preset in catalog.table().iter() {
//!     println!("{}: {} tones", preset.id(), preset.frequencies().len());
//! }
//! # let _ = settings;
//! ```

mod catalog;
mod config;
mod error;
mod preset_file;

/// Platform-specific paths for presets and configuration.
pub mod paths;

/// Factory presets bundled with the library.
pub mod factory_presets;

/// Rectangular room-mode calculator.
pub mod resonance;

pub use catalog::{PresetCatalog, PresetOrigin, save_preset_in, save_user_preset};
pub use config::{AppConfig, AudioConfig, CompressorConfig, PlaybackConfig};
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_description, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{
    default_config_path, ensure_user_config_dir, ensure_user_presets_dir, find_preset,
    list_user_presets, preset_name_from_path, user_config_dir, user_presets_dir,
};
pub use preset_file::PresetFile;
pub use resonance::{Chamber, ModeSearch, NAMED_CHAMBERS, chamber_preset, room_modes};
