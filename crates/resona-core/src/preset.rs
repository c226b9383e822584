//! Frequency presets.
//!
//! A [`Preset`] names an ordered list of tone frequencies. Presets are
//! immutable once built; construction rejects empty lists and any frequency
//! that is not a finite positive number.

use thiserror::Error;

/// Invalid preset data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PresetError {
    /// The preset has no frequencies.
    #[error("preset '{0}' has no frequencies")]
    Empty(String),

    /// A frequency is zero, negative or not finite.
    #[error("preset '{id}' frequency #{index} is invalid: {value}")]
    InvalidFrequency {
        /// Preset identifier.
        id: String,
        /// Position in the list.
        index: usize,
        /// Offending value.
        value: f32,
    },

    /// Another preset already uses this identifier.
    #[error("duplicate preset id '{0}'")]
    DuplicateId(String),
}

/// A named, ordered set of tone frequencies in Hz.
///
/// # Example
///
/// ```rust
/// use resona_core::Preset;
///
/// let preset = Preset::new("triad", vec![110.0, 138.59, 164.81]).unwrap();
/// assert_eq!(preset.id(), "triad");
/// assert_eq!(preset.frequencies().len(), 3);
///
/// assert!(Preset::new("silence", vec![]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    id: String,
    frequencies: Vec<f32>,
}

impl Preset {
    /// Build a preset, validating every frequency.
    pub fn new(id: impl Into<String>, frequencies: Vec<f32>) -> Result<Self, PresetError> {
        let id = id.into();
        if frequencies.is_empty() {
            return Err(PresetError::Empty(id));
        }
        if let Some((index, &value)) = frequencies
            .iter()
            .enumerate()
            .find(|&(_, f)| !(f.is_finite() && *f > 0.0))
        {
            return Err(PresetError::InvalidFrequency { id, index, value });
        }
        Ok(Self { id, frequencies })
    }

    /// Identifier, e.g. `"khufu"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Frequencies in Hz, in playback order.
    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }
}

/// Presets keyed by id, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PresetTable {
    presets: Vec<Preset>,
}

impl PresetTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting duplicate ids.
    pub fn from_presets(presets: impl IntoIterator<Item = Preset>) -> Result<Self, PresetError> {
        let mut table = Self::new();
        for preset in presets {
            table.insert(preset)?;
        }
        Ok(table)
    }

    /// Append a preset. Fails if the id is taken.
    pub fn insert(&mut self, preset: Preset) -> Result<(), PresetError> {
        if self.contains(preset.id()) {
            return Err(PresetError::DuplicateId(preset.id));
        }
        self.presets.push(preset);
        Ok(())
    }

    /// Insert or replace the preset with the same id, keeping its position.
    pub fn upsert(&mut self, preset: Preset) {
        match self
            .presets
            .iter_mut()
            .find(|p| p.id.eq_ignore_ascii_case(&preset.id))
        {
            Some(slot) => *slot = preset,
            None => self.presets.push(preset),
        }
    }

    /// Look up a preset by id, ignoring ASCII case.
    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id.eq_ignore_ascii_case(id))
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(Preset::id)
    }

    /// Presets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Number of presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
