//! Error types for the Folio ingestion pipeline.
//!
//! Errors are organized by stage so a failed upload reports which step broke
//! and for which input. Missing or corrupt capture metadata is deliberately
//! absent from this taxonomy: it degrades to an empty record instead.

use thiserror::Error;

use crate::types::SizeKey;

/// Top-level error type for Folio operations.
#[derive(Error, Debug)]
pub enum FolioError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
///
/// `name` is the declared upload name, or `<buffer>` when the caller did not
/// supply one.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input buffer was empty
    #[error("Empty input: {name}")]
    EmptyInput { name: String },

    /// Upload exceeds the size ceiling
    #[error("File too large: {name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Declared extension is not on the allow list
    #[error("Unsupported file type for {name}: .{extension}")]
    DisallowedType { name: String, extension: String },

    /// Image decoding failed
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// No decoder is available for the detected container
    #[error("Unsupported format for {name}: {format}")]
    UnsupportedFormat { name: String, format: String },

    /// Decoded dimensions exceed the configured limit
    #[error("Image too large: {name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Re-encoding one rendition failed
    #[error("Encoding the {size} rendition failed for {name}: {message}")]
    Encode {
        name: String,
        size: SizeKey,
        message: String,
    },

    /// A blocking worker panicked or was torn down before finishing
    #[error("Worker for {stage} stage failed for {name}: {message}")]
    Task {
        name: String,
        stage: String,
        message: String,
    },
}

/// Convenience type alias for Folio results.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_names_the_size() {
        let err = PipelineError::Encode {
            name: "beach.jpg".to_string(),
            size: SizeKey::Full,
            message: "out of memory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Encoding the full rendition failed for beach.jpg: out of memory"
        );
    }

    #[test]
    fn test_pipeline_error_wraps_into_folio_error() {
        let err: FolioError = PipelineError::EmptyInput {
            name: "<buffer>".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Pipeline error: Empty input"));
    }
}
