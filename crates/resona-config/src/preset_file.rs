//! Preset file format and operations.

use resona_core::Preset;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// On-disk form of a frequency preset.
///
/// # TOML Format
///
/// ```toml
/// id = "queens_chamber"
/// description = "Computed from 18.87 x 17.19 x 20.34 ft"
/// frequencies = [29.85, 32.76, 27.68]
/// ```
///
/// Frequencies are validated when converted with [`PresetFile::into_preset`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetFile {
    /// Preset identifier.
    pub id: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tone frequencies in Hz, in playback order.
    #[serde(default)]
    pub frequencies: Vec<f64>,
}

impl PresetFile {
    /// Create a preset file.
    pub fn new(id: impl Into<String>, frequencies: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            description: None,
            frequencies,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), id = self.id.as_str(), "preset saved");
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate into a playable [`Preset`].
    pub fn into_preset(self) -> Result<Preset, ConfigError> {
        let frequencies = self.frequencies.iter().map(|&f| f as f32).collect();
        Ok(Preset::new(self.id, frequencies)?)
    }
}

impl From<&Preset> for PresetFile {
    fn from(preset: &Preset) -> Self {
        Self::new(
            preset.id(),
            preset.frequencies().iter().map(|&f| f64::from(f)).collect(),
        )
    }
}
