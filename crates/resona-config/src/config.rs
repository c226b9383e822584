//! Application configuration file (`resona.toml`).
//!
//! Every section and field is optional; missing values take the defaults
//! shown below.
//!
//! ```toml
//! [audio]
//! sample_rate = 48000
//! buffer_size = 256
//! output_device = "USB Audio"
//!
//! [playback]
//! default_preset = "khufu"
//! fade_in_secs = 2.0
//! fade_out_secs = 2.0
//! fade_floor = 0.001
//! tone_gain = 0.05
//!
//! [compressor]
//! threshold_db = -24.0
//! knee_db = 30.0
//! ratio = 12.0
//! attack_secs = 0.003
//! release_secs = 0.25
//!
//! [[presets]]
//! id = "queens_chamber"
//! frequencies = [27.68, 29.85, 32.76]
//! ```

use resona_core::{CompressorSettings, DEFAULT_TONE_GAIN, GraphSettings, PlaybackSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::preset_file::PresetFile;

/// Output stream settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Buffer size in frames.
    pub buffer_size: u32,
    /// Output device name, index or name fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            output_device: None,
        }
    }
}

/// Fade timings, levels and the preset selected on launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Preset selected at startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_preset: Option<String>,
    /// Fade-in length in seconds.
    pub fade_in_secs: f64,
    /// Fade-out length in seconds.
    pub fade_out_secs: f64,
    /// Level the exponential fade-out ends at.
    pub fade_floor: f32,
    /// Per-tone gain before summing.
    pub tone_gain: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_preset: None,
            fade_in_secs: 2.0,
            fade_out_secs: 2.0,
            fade_floor: 0.001,
            tone_gain: DEFAULT_TONE_GAIN,
        }
    }
}

/// Compressor section; mirrors [`CompressorSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Threshold in dB.
    pub threshold_db: f32,
    /// Knee width in dB.
    pub knee_db: f32,
    /// Compression ratio.
    pub ratio: f32,
    /// Attack in seconds.
    pub attack_secs: f32,
    /// Release in seconds.
    pub release_secs: f32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        CompressorSettings::default().into()
    }
}

impl From<CompressorSettings> for CompressorConfig {
    fn from(s: CompressorSettings) -> Self {
        Self {
            threshold_db: s.threshold_db,
            knee_db: s.knee_db,
            ratio: s.ratio,
            attack_secs: s.attack_secs,
            release_secs: s.release_secs,
        }
    }
}

impl From<CompressorConfig> for CompressorSettings {
    fn from(c: CompressorConfig) -> Self {
        CompressorSettings {
            threshold_db: c.threshold_db,
            knee_db: c.knee_db,
            ratio: c.ratio,
            attack_secs: c.attack_secs,
            release_secs: c.release_secs,
        }
        .clamped()
    }
}

/// Contents of `resona.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Output stream settings.
    pub audio: AudioConfig,
    /// Playback settings.
    pub playback: PlaybackConfig,
    /// Compressor settings.
    pub compressor: CompressorConfig,
    /// Extra presets defined inline.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<PresetFile>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validated playback settings for the controller.
    pub fn playback_settings(&self) -> Result<PlaybackSettings, ConfigError> {
        let p = &self.playback;
        let fade_in = duration("playback.fade_in_secs", p.fade_in_secs)?;
        let fade_out = duration("playback.fade_out_secs", p.fade_out_secs)?;
        if !(p.fade_floor.is_finite() && p.fade_floor > 0.0 && p.fade_floor < 1.0) {
            return Err(invalid("playback.fade_floor", "must be between 0 and 1 exclusive"));
        }
        if !(p.tone_gain.is_finite() && p.tone_gain > 0.0 && p.tone_gain <= 1.0) {
            return Err(invalid("playback.tone_gain", "must be in (0, 1]"));
        }

        Ok(PlaybackSettings {
            fade_in,
            fade_out,
            fade_floor: p.fade_floor,
            graph: GraphSettings {
                tone_gain: p.tone_gain,
                compressor: self.compressor.into(),
                ..GraphSettings::default()
            },
        })
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn duration(field: &str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| invalid(field, "must be finite and non-negative"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_is_default() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.playback_settings().unwrap(), PlaybackSettings::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [audio]
            output_device = "USB"

            [playback]
            default_preset = "menkaure"
            fade_out_secs = 4.5
            "#,
        )
        .unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.output_device.as_deref(), Some("USB"));
        assert_eq!(config.playback.default_preset.as_deref(), Some("menkaure"));

        let settings = config.playback_settings().unwrap();
        assert_eq!(settings.fade_out, Duration::from_millis(4500));
        assert_eq!(settings.fade_in, Duration::from_secs(2));
    }

    #[test]
    fn test_inline_presets() {
        let config = AppConfig::from_toml(
            r#"
            [[presets]]
            id = "duo"
            frequencies = [55.0, 82.5]
            "#,
        )
        .unwrap();
        assert_eq!(config.presets.len(), 1);
        assert_eq!(config.presets[0].id, "duo");
    }

    #[test]
    fn test_negative_fade_rejected() {
        let mut config = AppConfig::default();
        config.playback.fade_in_secs = -1.0;
        assert!(matches!(
            config.playback_settings(),
            Err(ConfigError::InvalidSetting { ref field, .. }) if field == "playback.fade_in_secs"
        ));
    }

    #[test]
    fn test_floor_must_be_positive() {
        let mut config = AppConfig::default();
        config.playback.fade_floor = 0.0;
        assert!(config.playback_settings().is_err());
    }

    #[test]
    fn test_compressor_clamped() {
        let config = AppConfig::from_toml("[compressor]\nratio = 50.0").unwrap();
        let settings = config.playback_settings().unwrap();
        assert_eq!(settings.graph.compressor.ratio, 20.0);
        assert_eq!(settings.graph.compressor.knee_db, 30.0);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("resona.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resona.toml");
        std::fs::write(&path, "[audio\nsample_rate = ").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_serialize_skips_empty() {
        let text = AppConfig::default().to_toml().unwrap();
        assert!(text.contains("[audio]"));
        assert!(!text.contains("presets"));
        assert!(!text.contains("output_device"));
    }
}
