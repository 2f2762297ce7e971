//! Configuration file management.
//!
//! Handles loading the optional TOML configuration file and writing the
//! default one on request.

use std::fs;
use std::path::Path;

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
pub const DEFAULT_CONFIG: &str = r#"# cursorlog configuration
# Auto-generated - edit as needed

[state]
# State file holding the read cursors (default: ./.cursorlog.json).
# The --state flag takes precedence.
# path = "/var/lib/cursorlog/state.json"

[tail]
# Prefix every printed line with the file it came from
with_filename = false
"#;

/// Load configuration from the default location, or defaults if absent.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = AppConfig::config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })
}

/// Write the default configuration file to `path` unless one already exists.
///
/// Returns whether a file was created.
///
/// # Errors
/// Returns error if the directory or file cannot be created.
pub fn ensure_config_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %path.display(), "Created default configuration");

    Ok(true)
}

/// Render a configuration as TOML.
///
/// # Errors
/// Returns error if the configuration cannot be serialized.
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize config: {e}"),
    })
}
