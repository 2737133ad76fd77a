//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/mercado-e2e/`
//! - macOS: `~/Library/Application Support/mercado-e2e/`
//! - Windows: `%APPDATA%\mercado-e2e\`

use std::path::PathBuf;

/// Application name used for directories
const APP_NAME: &str = "mercado-e2e";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "MERCADO_E2E_CONFIG";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `MERCADO_E2E_CONFIG` wins over the platform location when set.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    config_dir().map(|dir| dir.join("config.toml"))
}
