//! Sub-configuration structs with their defaults.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::SizeKey;

/// Rendition sizes and encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenditionConfig {
    /// Target width of the thumb rendition
    pub thumb_width: u32,

    /// Target width of the medium rendition
    pub medium_width: u32,

    /// Target width of the full rendition
    pub full_width: u32,

    /// Lossy WebP quality, 1-100
    pub quality: u8,

    /// Resampling filter used when downscaling
    pub filter: ResizeFilter,
}

impl Default for RenditionConfig {
    fn default() -> Self {
        Self {
            thumb_width: SizeKey::Thumb.default_width(),
            medium_width: SizeKey::Medium.default_width(),
            full_width: SizeKey::Full.default_width(),
            quality: 82,
            filter: ResizeFilter::Lanczos3,
        }
    }
}

impl RenditionConfig {
    /// Configured target width for a size.
    pub fn width_for(&self, size: SizeKey) -> u32 {
        match size {
            SizeKey::Thumb => self.thumb_width,
            SizeKey::Medium => self.medium_width,
            SizeKey::Full => self.full_width,
        }
    }
}

/// Resampling filters exposed in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Limits that protect the pipeline from problematic uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded dimension (width or height)
    pub max_image_dimension: u32,

    /// Declared extensions accepted for upload
    pub allowed_extensions: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 20000,
            allowed_extensions: ["jpg", "jpeg", "png", "webp", "heic", "heif"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// Local rendition storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory the storage keys are resolved against
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("~/folio/renditions"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
