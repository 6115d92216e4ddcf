//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.renditions;
        if r.thumb_width == 0 || r.medium_width == 0 || r.full_width == 0 {
            return Err(ConfigError::ValidationError(
                "renditions widths must be > 0".into(),
            ));
        }
        if !(r.thumb_width <= r.medium_width && r.medium_width <= r.full_width) {
            return Err(ConfigError::ValidationError(
                "renditions widths must satisfy thumb_width <= medium_width <= full_width".into(),
            ));
        }
        if r.quality == 0 || r.quality > 100 {
            return Err(ConfigError::ValidationError(
                "renditions.quality must be between 1 and 100".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "limits.allowed_extensions must not be empty".into(),
            ));
        }
        Ok(())
    }
}
