//! Shared helpers for loading configuration and presets.

use anyhow::Context;
use resona_config::{AppConfig, PresetCatalog, default_config_path};
use resona_io::StreamConfig;
use std::path::Path;

/// Load the app config from `path`, or from the default location if absent.
///
/// An explicit path must exist; the default location may be missing.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AppConfig::load_or_default(default_config_path())?),
    }
}

/// Load the catalog and check that `preset`, if given, is in it.
pub fn load_catalog(config: &AppConfig, preset: Option<&str>) -> anyhow::Result<PresetCatalog> {
    let catalog = PresetCatalog::load(config);
    if let Some(id) = preset {
        catalog.get(id)?;
    }
    Ok(catalog)
}

/// Stream settings from the config, with an optional device override.
pub fn stream_config(config: &AppConfig, output: Option<String>) -> StreamConfig {
    StreamConfig {
        sample_rate: config.audio.sample_rate,
        buffer_size: config.audio.buffer_size,
        output_device: output.or_else(|| config.audio.output_device.clone()),
    }
}

/// Format frequencies as rows of fixed-width columns.
pub fn format_frequencies(frequencies: impl IntoIterator<Item = f64>, per_row: usize) -> String {
    let cells: Vec<String> = frequencies
        .into_iter()
        .map(|f| format!("{f:>7.2}"))
        .collect();
    cells
        .chunks(per_row.max(1))
        .map(|row| format!("  {}", row.join(" ")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_override() {
        let mut config = AppConfig::default();
        config.audio.output_device = Some("speakers".into());
        assert_eq!(
            stream_config(&config, None).output_device.as_deref(),
            Some("speakers")
        );
        assert_eq!(
            stream_config(&config, Some("2".into())).output_device.as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_format_frequencies_rows() {
        let text = format_frequencies([16.39, 29.32, 32.79], 2);
        assert_eq!(text, "    16.39   29.32\n    32.79");
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        assert!(load_config(Some(Path::new("/nonexistent/resona.toml"))).is_err());
    }
}
