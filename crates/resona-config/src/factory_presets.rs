//! Factory presets bundled with resona.
//!
//! Each preset holds the low-frequency resonances of one of the Giza burial
//! chambers, in ascending order. They are compiled in and always available.

use resona_core::{Preset, PresetTable};

/// Factory preset identifiers, in menu order.
pub static FACTORY_PRESET_NAMES: &[&str] = &["khufu", "khafre", "menkaure"];

struct FactoryPreset {
    id: &'static str,
    description: &'static str,
    frequencies: &'static [f32],
}

static FACTORY_PRESETS: &[FactoryPreset] = &[
    FactoryPreset {
        id: "khufu",
        description: "King's Chamber, Great Pyramid of Khufu",
        frequencies: KHUFU,
    },
    FactoryPreset {
        id: "khafre",
        description: "Burial chamber, Pyramid of Khafre",
        frequencies: KHAFRE,
    },
    FactoryPreset {
        id: "menkaure",
        description: "Burial chamber, Pyramid of Menkaure",
        frequencies: MENKAURE,
    },
];

const KHUFU: &[f32] = &[
    16.39, 29.32, 32.79, 33.6, 36.66, 43.99, 46.37, 46.94, 49.18, 54.86, 57.26, 58.65, 59.11,
    60.9, 65.57, 65.98, 67.19, 67.59, 69.16, 71.83, 73.31, 73.68, 74.76, 76.54, 78.96, 81.96,
    83.26, 87.05, 87.97, 88.28,
];

const KHAFRE: &[f32] = &[
    12.11, 24.22, 25.02, 27.8, 34.12, 34.82, 36.21, 36.32, 41.84, 42.31, 44.01, 44.11, 48.43,
    48.75, 49.84, 50.04, 51.49, 54.51, 55.6, 55.76, 59.24, 60.54, 60.57, 61.77, 61.84, 64.31,
    65.23, 65.51, 68.24, 69.31, 69.49, 69.64, 70.63, 72.41, 72.69, 73.69, 73.86, 75.07, 76.04,
    76.61, 77.31, 77.55, 78.54, 78.88, 81.26, 82.46, 83.34, 83.39, 83.68, 84.63, 85.49, 85.64,
    85.94, 87.34, 88.02, 89.33, 90.1, 91.22, 92.09, 94.59, 95.63, 96.44, 97.5,
];

const MENKAURE: &[f32] = &[
    25.74, 48.96, 51.47, 55.31, 64.96, 69.87, 71.04, 77.21, 81.34, 82.88, 85.32, 91.42, 96.26,
    97.91,
];

fn lookup(name: &str) -> Option<&'static FactoryPreset> {
    FACTORY_PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(name))
}

fn to_preset(entry: &FactoryPreset) -> Option<Preset> {
    Preset::new(entry.id, entry.frequencies.to_vec()).ok()
}

/// All factory presets as a table, in menu order.
///
/// # Example
///
/// ```rust
/// use resona_config::factory_presets;
///
/// let table = factory_presets();
/// assert_eq!(table.ids().collect::<Vec<_>>(), ["khufu", "khafre", "menkaure"]);
/// ```
pub fn factory_presets() -> PresetTable {
    let mut table = PresetTable::new();
    for preset in FACTORY_PRESETS.iter().filter_map(to_preset) {
        table.upsert(preset);
    }
    table
}

/// Get a factory preset by name. The match is case-insensitive.
///
/// ```rust
/// use resona_config::get_factory_preset;
///
/// let khufu = get_factory_preset("Khufu").unwrap();
/// assert_eq!(khufu.frequencies().len(), 30);
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    lookup(name).and_then(to_preset)
}

/// Short description of a factory preset.
pub fn factory_preset_description(name: &str) -> Option<&'static str> {
    lookup(name).map(|p| p.description)
}

/// Check if a preset name is a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    lookup(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_factory_presets_valid() {
        let table = factory_presets();
        assert_eq!(table.len(), FACTORY_PRESET_NAMES.len());
        for name in FACTORY_PRESET_NAMES {
            assert!(table.contains(name), "missing factory preset {name}");
        }
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(KHUFU.len(), 30);
        assert_eq!(KHAFRE.len(), 63);
        assert_eq!(MENKAURE.len(), 14);
    }

    #[test]
    fn test_tables_ascending() {
        for entry in FACTORY_PRESETS {
            assert!(
                entry.frequencies.windows(2).all(|w| w[0] < w[1]),
                "{} not ascending",
                entry.id
            );
        }
    }

    #[test]
    fn test_khufu_bounds() {
        let khufu = get_factory_preset("khufu").unwrap();
        assert_eq!(khufu.frequencies().first(), Some(&16.39));
        assert_eq!(khufu.frequencies().last(), Some(&88.28));
    }

    #[test]
    fn test_lookup_case_insensitive() {
        assert!(is_factory_preset("MENKAURE"));
        assert!(!is_factory_preset("sneferu"));
        assert!(get_factory_preset("bent").is_none());
        assert_eq!(
            factory_preset_description("khafre"),
            Some("Burial chamber, Pyramid of Khafre")
        );
    }
}
