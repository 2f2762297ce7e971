//! Application configuration models.
//!
//! Holds the settings read from `config.toml` and the default locations
//! derived from them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// State file used when neither the command line nor the config names one.
pub const DEFAULT_STATE_FILE: &str = ".cursorlog.json";

/// Configuration for the cursor state file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    /// Location of the state file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Configuration for the tail command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TailConfig {
    /// Prefix each printed line with the file it came from.
    #[serde(default)]
    pub with_filename: bool,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// State file configuration.
    #[serde(default)]
    pub state: StateConfig,

    /// Tail command configuration.
    #[serde(default)]
    pub tail: TailConfig,
}

impl AppConfig {
    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cursorlog")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Resolve the state file, preferring an explicit override.
    #[must_use]
    pub fn state_path(&self, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.state.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.state.path.is_none());
        assert!(!config.tail.with_filename);
        assert_eq!(config.state_path(None), PathBuf::from(DEFAULT_STATE_FILE));
    }

    #[test]
    fn test_state_path_precedence() {
        let config = AppConfig {
            state: StateConfig {
                path: Some(PathBuf::from("/etc/cursorlog.json")),
            },
            ..Default::default()
        };
        assert_eq!(
            config.state_path(None),
            PathBuf::from("/etc/cursorlog.json")
        );
        assert_eq!(
            config.state_path(Some(Path::new("/tmp/override.json"))),
            PathBuf::from("/tmp/override.json")
        );
    }

    #[test]
    fn test_config_file_lives_in_data_dir() {
        assert!(AppConfig::config_file_path().starts_with(AppConfig::default_data_dir()));
    }
}
