//! Room-mode frequencies of rectangular chambers.
//!
//! For a chamber of length `L`, width `W` and height `H`, the axial,
//! tangential and oblique modes are
//!
//! ```text
//! f = v/2 * sqrt((nx/L)^2 + (ny/W)^2 + (nz/H)^2)
//! ```
//!
//! for mode indices `0..=max_mode` on each axis, excluding `(0, 0, 0)`.
//! Results are rounded to 0.01 Hz, deduplicated and sorted ascending, so a
//! computed table can be used directly as a [`Preset`] or written to a
//! preset file.

use resona_core::Preset;

use crate::error::ConfigError;

/// Speed of sound in air, feet per second.
pub const SPEED_OF_SOUND_FT_S: f64 = 1126.0;

/// Interior dimensions of a rectangular chamber, in feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chamber {
    /// Length.
    pub length: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Measured chambers, by preset id.
pub static NAMED_CHAMBERS: &[(&str, Chamber)] = &[
    (
        "khufu",
        Chamber {
            length: 34.36,
            width: 17.19,
            height: 19.20,
        },
    ),
    (
        "khafre",
        Chamber {
            length: 46.5,
            width: 16.5,
            height: 22.5,
        },
    ),
    (
        "menkaure",
        Chamber {
            length: 21.88,
            width: 8.67,
            height: 11.5,
        },
    ),
];

impl Chamber {
    /// Chamber with the given dimensions.
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Look up a measured chamber (case-insensitive).
    pub fn named(name: &str) -> Result<Self, ConfigError> {
        NAMED_CHAMBERS
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(name))
            .map(|&(_, chamber)| chamber)
            .ok_or_else(|| ConfigError::InvalidChamber(format!("unknown chamber '{name}'")))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidChamber(format!(
                    "{axis} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Limits for the mode search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSearch {
    /// Highest mode index on each axis.
    pub max_mode: u32,
    /// Highest frequency kept, in Hz (inclusive).
    pub max_freq: f64,
    /// Speed of sound in the chamber's length unit per second.
    pub speed_of_sound: f64,
}

impl Default for ModeSearch {
    fn default() -> Self {
        Self {
            max_mode: 5,
            max_freq: 100.0,
            speed_of_sound: SPEED_OF_SOUND_FT_S,
        }
    }
}

/// Compute the sorted, deduplicated room modes of `chamber`.
///
/// # Example
///
/// ```rust
/// use resona_config::resonance::{Chamber, ModeSearch, room_modes};
///
/// let modes = room_modes(&Chamber::new(34.36, 17.19, 19.2), &ModeSearch::default()).unwrap();
/// assert_eq!(modes[0], 16.39);
/// assert!(modes.windows(2).all(|w| w[0] < w[1]));
/// ```
pub fn room_modes(chamber: &Chamber, search: &ModeSearch) -> Result<Vec<f64>, ConfigError> {
    chamber.validate()?;
    if !(search.max_freq.is_finite() && search.max_freq > 0.0) {
        return Err(ConfigError::InvalidChamber(format!(
            "max frequency must be positive, got {}",
            search.max_freq
        )));
    }
    if !(search.speed_of_sound.is_finite() && search.speed_of_sound > 0.0) {
        return Err(ConfigError::InvalidChamber(format!(
            "speed of sound must be positive, got {}",
            search.speed_of_sound
        )));
    }

    let half_v = search.speed_of_sound / 2.0;
    // Rounded to hundredths and held as integers for exact dedup.
    let mut centi_hz: Vec<u64> = Vec::new();
    for nx in 0..=search.max_mode {
        for ny in 0..=search.max_mode {
            for nz in 0..=search.max_mode {
                if nx == 0 && ny == 0 && nz == 0 {
                    continue;
                }
                let x = f64::from(nx) / chamber.length;
                let y = f64::from(ny) / chamber.width;
                let z = f64::from(nz) / chamber.height;
                let f = half_v * libm::sqrt(x * x + y * y + z * z);
                if f <= search.max_freq {
                    centi_hz.push(libm::round(f * 100.0) as u64);
                }
            }
        }
    }
    centi_hz.sort_unstable();
    centi_hz.dedup();

    let modes: Vec<f64> = centi_hz
        .into_iter()
        .map(|c| c as f64 / 100.0)
        .filter(|&f| f > 0.0 && f <= search.max_freq)
        .collect();

    tracing::debug!(
        modes = modes.len(),
        length = chamber.length,
        width = chamber.width,
        height = chamber.height,
        "room modes computed"
    );
    Ok(modes)
}

/// Compute room modes and wrap them as a preset named `id`.
pub fn chamber_preset(
    id: impl Into<String>,
    chamber: &Chamber,
    search: &ModeSearch,
) -> Result<Preset, ConfigError> {
    let modes = room_modes(chamber, search)?;
    Ok(Preset::new(id, modes.iter().map(|&f| f as f32).collect())?)
}
