//! Preset catalog: factory, user-directory and config-file presets merged
//! into one table.
//!
//! Later sources override earlier ones by id: factory presets first, then
//! `*.toml` files in the user presets directory, then `[[presets]]` entries
//! in `resona.toml`. Files that fail to load are logged and skipped.

use resona_core::{Preset, PresetTable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::factory_presets::{factory_preset_description, factory_presets};
use crate::paths;
use crate::preset_file::PresetFile;

/// Where a catalog entry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetOrigin {
    /// Compiled in.
    Factory,
    /// Loaded from a preset file.
    File(PathBuf),
    /// Defined inline in the application config.
    Config,
}

impl std::fmt::Display for PresetOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Factory => f.write_str("factory"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Config => f.write_str("config"),
        }
    }
}

#[derive(Debug, Clone)]
struct EntryInfo {
    origin: PresetOrigin,
    description: Option<String>,
}

/// All presets available to the player.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    table: PresetTable,
    info: HashMap<String, EntryInfo>,
    skipped: usize,
}

impl PresetCatalog {
    /// Factory presets only.
    pub fn factory() -> Self {
        let table = factory_presets();
        let info = table
            .ids()
            .map(|id| {
                let entry = EntryInfo {
                    origin: PresetOrigin::Factory,
                    description: factory_preset_description(id).map(str::to_owned),
                };
                (id.to_ascii_lowercase(), entry)
            })
            .collect();
        Self {
            table,
            info,
            skipped: 0,
        }
    }

    /// Factory presets, user presets from the platform directory, and
    /// presets inlined in `config`.
    pub fn load(config: &AppConfig) -> Self {
        Self::load_from(&paths::user_presets_dir(), config)
    }

    /// As [`PresetCatalog::load`], reading user presets from `dir`.
    pub fn load_from(dir: &Path, config: &AppConfig) -> Self {
        let mut catalog = Self::factory();

        for path in paths::list_presets_in_dir(dir) {
            match PresetFile::load(&path) {
                Ok(file) => catalog.add_file(file, PresetOrigin::File(path)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "skipping preset file: {err}");
                    catalog.skipped += 1;
                }
            }
        }

        for file in &config.presets {
            catalog.add_file(file.clone(), PresetOrigin::Config);
        }

        tracing::info!(
            presets = catalog.table.len(),
            skipped = catalog.skipped,
            "preset catalog loaded"
        );
        catalog
    }

    fn add_file(&mut self, file: PresetFile, origin: PresetOrigin) {
        let description = file.description.clone();
        match file.into_preset() {
            Ok(preset) => self.add(preset, description, origin),
            Err(err) => {
                tracing::warn!(%origin, "skipping invalid preset: {err}");
                self.skipped += 1;
            }
        }
    }

    /// Insert or replace a preset.
    pub fn add(&mut self, preset: Preset, description: Option<String>, origin: PresetOrigin) {
        if self.table.contains(preset.id()) {
            tracing::debug!(id = preset.id(), %origin, "preset overridden");
        }
        self.info.insert(
            preset.id().to_ascii_lowercase(),
            EntryInfo {
                origin,
                description,
            },
        );
        self.table.upsert(preset);
    }

    /// Presets in menu order.
    pub fn table(&self) -> &PresetTable {
        &self.table
    }

    /// Take the preset table for a controller.
    pub fn into_table(self) -> PresetTable {
        self.table
    }

    /// Look up a preset.
    pub fn get(&self, id: &str) -> Result<&Preset, ConfigError> {
        self.table
            .get(id)
            .ok_or_else(|| ConfigError::PresetNotFound(id.to_owned()))
    }

    /// Origin of a preset.
    pub fn origin(&self, id: &str) -> Option<&PresetOrigin> {
        self.info.get(&id.to_ascii_lowercase()).map(|e| &e.origin)
    }

    /// Description of a preset, if it has one.
    pub fn description(&self, id: &str) -> Option<&str> {
        self.info
            .get(&id.to_ascii_lowercase())
            .and_then(|e| e.description.as_deref())
    }

    /// Number of preset sources that failed to load.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Save `file` as `<id>.toml` in the user presets directory.
pub fn save_user_preset(file: &PresetFile) -> Result<PathBuf, ConfigError> {
    let dir = paths::ensure_user_presets_dir()?;
    save_preset_in(&dir, file)
}

/// Save `file` as `<id>.toml` in `dir`, validating it first.
pub fn save_preset_in(dir: &Path, file: &PresetFile) -> Result<PathBuf, ConfigError> {
    file.clone().into_preset()?;
    let path = dir.join(format!("{}.toml", file.id));
    file.save(&path)?;
    tracing::info!(id = file.id.as_str(), path = %path.display(), "user preset saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_factory_catalog() {
        let catalog = PresetCatalog::factory();
        assert_eq!(catalog.table().len(), 3);
        assert_eq!(catalog.origin("khafre"), Some(&PresetOrigin::Factory));
        assert!(catalog.description("khufu").unwrap().contains("King's Chamber"));
        assert!(matches!(
            catalog.get("sneferu"),
            Err(ConfigError::PresetNotFound(_))
        ));
    }

    #[test]
    fn test_user_files_add_and_override() {
        let dir = TempDir::new().unwrap();
        PresetFile::new("duo", vec![55.0, 82.5])
            .save(dir.path().join("duo.toml"))
            .unwrap();
        PresetFile::new("khufu", vec![16.39])
            .save(dir.path().join("khufu.toml"))
            .unwrap();

        let catalog = PresetCatalog::load_from(dir.path(), &AppConfig::default());
        assert_eq!(catalog.table().len(), 4);
        assert_eq!(catalog.get("khufu").unwrap().frequencies(), &[16.39]);
        assert!(matches!(catalog.origin("duo"), Some(PresetOrigin::File(_))));
        // Overrides keep the original menu position.
        assert_eq!(catalog.table().ids().next(), Some("khufu"));
    }

    #[test]
    fn test_bad_files_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.toml"), "id = ").unwrap();
        std::fs::write(dir.path().join("empty.toml"), "id = \"empty\"").unwrap();

        let catalog = PresetCatalog::load_from(dir.path(), &AppConfig::default());
        assert_eq!(catalog.skipped(), 2);
        assert_eq!(catalog.table().len(), 3);
    }

    #[test]
    fn test_config_presets_win() {
        let dir = TempDir::new().unwrap();
        PresetFile::new("duo", vec![55.0, 82.5])
            .save(dir.path().join("duo.toml"))
            .unwrap();
        let mut config = AppConfig::default();
        config.presets.push(PresetFile::new("duo", vec![60.0]).with_description("inline"));

        let catalog = PresetCatalog::load_from(dir.path(), &config);
        assert_eq!(catalog.get("duo").unwrap().frequencies(), &[60.0]);
        assert_eq!(catalog.origin("duo"), Some(&PresetOrigin::Config));
        assert_eq!(catalog.description("duo"), Some("inline"));
    }

    #[test]
    fn test_ids_match_ignoring_case() {
        let mut config = AppConfig::default();
        config
            .presets
            .push(PresetFile::new("KHUFU", vec![16.39, 32.78]).with_description("upper"));

        let dir = TempDir::new().unwrap();
        let catalog = PresetCatalog::load_from(dir.path(), &config);
        assert_eq!(catalog.table().len(), 3);
        assert_eq!(catalog.get("Khufu").unwrap().frequencies(), &[16.39, 32.78]);
        assert_eq!(catalog.origin("khufu"), Some(&PresetOrigin::Config));
        assert_eq!(catalog.description("khufu"), Some("upper"));
        assert_eq!(catalog.origin("KHAFRE"), Some(&PresetOrigin::Factory));
    }

    #[test]
    fn test_save_preset_in_validates() {
        let dir = TempDir::new().unwrap();
        let bad = PresetFile::new("bad", vec![]);
        assert!(matches!(
            save_preset_in(dir.path(), &bad),
            Err(ConfigError::InvalidPreset(_))
        ));

        let good = PresetFile::new("queens", vec![27.68, 29.85]);
        let path = save_preset_in(dir.path(), &good).unwrap();
        assert_eq!(path, dir.path().join("queens.toml"));
        assert_eq!(PresetFile::load(&path).unwrap(), good);
    }
}
