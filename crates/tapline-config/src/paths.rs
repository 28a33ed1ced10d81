//! Where settings live on disk.
//!
//! - Linux: `~/.config/tapline/settings.toml`
//! - macOS: `~/Library/Application Support/tapline/settings.toml`
//! - Windows: `%APPDATA%\tapline\settings.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "tapline";

/// Settings file name inside the config directory.
const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the settings file.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}
