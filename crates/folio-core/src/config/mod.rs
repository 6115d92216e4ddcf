//! Configuration management for Folio.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file only needs
//! to name the values it changes.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Folio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendition sizes and encoding
    pub renditions: RenditionConfig,

    /// Upload and decode limits
    pub limits: LimitsConfig,

    /// Where the CLI writes finished renditions
    pub storage: StorageConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.folio.folio/config.toml
    /// - Linux: ~/.config/folio/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\folio\config\config.toml
    ///
    /// Falls back to ~/.folio/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "folio", "folio")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".folio").join("config.toml")
            })
    }

    /// Get the resolved rendition output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.storage.output_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SizeKey;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.renditions.width_for(SizeKey::Thumb), 400);
        assert_eq!(config.renditions.width_for(SizeKey::Medium), 1200);
        assert_eq!(config.renditions.width_for(SizeKey::Full), 2400);
        assert_eq!(config.renditions.quality, 82);
        assert_eq!(config.limits.max_file_size_mb, 50);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[renditions]"));
        assert!(toml.contains("[limits]"));
        assert!(toml.contains("filter = \"lanczos3\""));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[renditions]\nquality = 70\nfilter = \"triangle\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.renditions.quality, 70);
        assert_eq!(config.renditions.filter, ResizeFilter::Triangle);
        assert_eq!(config.renditions.thumb_width, 400);
        assert_eq!(config.limits.max_file_size_mb, 50);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[renditions]\nquality = 0").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_output_dir_expands_tilde() {
        let mut config = Config::default();
        config.storage.output_dir = PathBuf::from("/srv/gallery");
        assert_eq!(config.output_dir(), PathBuf::from("/srv/gallery"));

        config.storage.output_dir = PathBuf::from("~/renditions");
        assert!(config.output_dir().ends_with("renditions"));
    }
}
