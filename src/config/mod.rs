//! Configuration management for Gridle
//!
//! Tool settings come from an optional TOML file under the user config
//! directory. Session state (detected monitors, titles, layers) is never
//! persisted; only knobs like the activation pause live here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("File IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// User-tunable settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Milliseconds to wait after activating each window, giving the OS
    /// time to process the focus change before the next window is moved
    pub activation_pause_ms: u64,

    /// Monitor index used when a command does not select one explicitly
    pub default_monitor: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            activation_pause_ms: 50,
            default_monitor: 0,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from an explicit path, or from the default location if one
    /// exists, or fall back to compiled-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default settings location: `<config dir>/gridle/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gridle").join("config.toml"))
    }

    pub fn activation_pause(&self) -> Duration {
        Duration::from_millis(self.activation_pause_ms)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        // The pause is inserted once per window; anything past a second
        // makes large batches unusable.
        if self.activation_pause_ms > 1000 {
            return Err(SettingsError::ValidationError {
                message: format!(
                    "activation_pause_ms must be at most 1000, got {}",
                    self.activation_pause_ms
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_settings(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.activation_pause_ms, 50);
        assert_eq!(settings.default_monitor, 0);
        assert_eq!(settings.activation_pause(), Duration::from_millis(50));
    }

    #[test]
    fn load_parses_partial_files() {
        let file = write_settings("activation_pause_ms = 100\n");
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.activation_pause_ms, 100);
        assert_eq!(settings.default_monitor, 0);
    }

    #[test]
    fn load_rejects_excessive_pause() {
        let file = write_settings("activation_pause_ms = 5000\n");
        assert!(matches!(
            Settings::load(file.path()),
            Err(SettingsError::ValidationError { .. })
        ));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let file = write_settings("activation_pause_ms = \"soon\"\n");
        assert!(matches!(
            Settings::load(file.path()),
            Err(SettingsError::TomlError(_))
        ));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = Settings::load_or_default(Some(Path::new("/nonexistent/gridle.toml")));
        assert!(matches!(result, Err(SettingsError::IoError(_))));
    }
}
