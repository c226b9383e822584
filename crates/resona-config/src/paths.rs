//! Platform-specific paths for presets and configuration.
//!
//! # Directory Structure
//!
//! - **User presets**: `~/.config/resona/presets/` (Linux), `~/Library/Application Support/resona/presets/` (macOS), `%APPDATA%\resona\presets\` (Windows)
//! - **User config**: `~/.config/resona/resona.toml` and siblings
//!
//! # Example
//!
//! ```rust,no_run
//! use resona_config::paths;
//!
//! let presets_dir = paths::user_presets_dir();
//! println!("User presets: {:?}", presets_dir);
//!
//! if let Some(path) = paths::find_preset("queens_chamber") {
//!     println!("Found preset at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "resona";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// Application config file name.
pub const CONFIG_FILE_NAME: &str = "resona.toml";

/// Returns the user-specific presets directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Returns the user-specific configuration directory.
///
/// # Platform Paths
///
/// - Linux: `~/.config/resona/`
/// - macOS: `~/Library/Application Support/resona/`
/// - Windows: `%APPDATA%\resona\`
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the application config file in the user config directory.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Find a preset file by path or by name in the user presets directory.
///
/// The name may omit the `.toml` extension.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    find_preset_in(name, &user_presets_dir())
}

pub(crate) fn find_preset_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Ensure the user presets directory exists.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_presets_dir())
}

/// Ensure the user config directory exists.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_config_dir())
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
        tracing::debug!(path = %dir.display(), "created directory");
    }
    Ok(dir)
}

/// List all preset files in the user presets directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

/// List `.toml` files in `dir`, sorted by path.
pub fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Get the preset name from a file path.
///
/// ```rust
/// use resona_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/queens_chamber.toml"));
/// assert_eq!(name, Some("queens_chamber".to_string()));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
