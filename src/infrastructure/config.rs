//! Settings file management.
//!
//! Loads `serman.toml` from the directory containing the serman executable.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, Result, Settings};

/// Settings file name, looked up next to the executable.
pub const SETTINGS_FILE: &str = "serman.toml";

/// Directory containing the running executable.
///
/// # Errors
/// Returns error if the executable path cannot be determined.
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| AppError::io("Failed to get executable path", e))?;

    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| AppError::Config {
            message: format!("Executable has no parent directory: {}", exe.display()),
        })
}

/// Load settings for this installation, falling back to defaults.
///
/// # Errors
/// Returns error if the settings file exists but cannot be read or parsed.
pub fn load_settings() -> Result<Settings> {
    let base_dir = install_dir()?;
    load_settings_from_dir(&base_dir)
}

/// Load settings from `base_dir/serman.toml` if present.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_settings_from_dir(base_dir: &Path) -> Result<Settings> {
    let path = base_dir.join(SETTINGS_FILE);

    let settings = if path.exists() {
        let settings = load_settings_from_file(&path)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        settings
    } else {
        Settings::default()
    };

    Ok(settings.anchored_at(base_dir))
}

/// Load settings from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_settings_from_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::io(format!("Failed to read settings file: {}", path.display()), e)
    })?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse settings file {}: {e}", path.display()),
    })
}
