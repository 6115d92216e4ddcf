//! Upload policy checks, run by the caller before the pipeline.

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::RawImageInput;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Validates uploads against the configured limits.
pub struct UploadValidator {
    limits: LimitsConfig,
}

impl UploadValidator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before any decoding.
    ///
    /// Checks:
    /// - The buffer is not empty
    /// - The buffer is within the size ceiling
    /// - The declared extension is on the allow list
    ///
    /// Inputs without a declared name skip the extension check; the format
    /// detector decides what they are.
    pub fn validate(&self, input: &RawImageInput) -> Result<(), PipelineError> {
        let name = input.display_name();

        if input.is_empty() {
            return Err(PipelineError::EmptyInput {
                name: name.to_string(),
            });
        }

        let size = input.len() as u64;
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(BYTES_PER_MB);
        if size > max_bytes {
            return Err(PipelineError::FileTooLarge {
                name: name.to_string(),
                size_mb: size / BYTES_PER_MB,
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if input.name().is_some() {
            let extension = input.extension().unwrap_or_default();
            if !self.is_allowed(&extension) {
                return Err(PipelineError::DisallowedType {
                    name: name.to_string(),
                    extension,
                });
            }
        }

        Ok(())
    }

    fn is_allowed(&self, extension: &str) -> bool {
        !extension.is_empty()
            && self
                .limits
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UploadValidator {
        UploadValidator::new(LimitsConfig::default())
    }

    #[test]
    fn test_accepts_allowed_extensions_in_any_case() {
        for name in ["a.jpg", "b.JPEG", "c.png", "d.webp", "IMG_0001.HEIC", "e.heif"] {
            let input = RawImageInput::new(vec![1u8; 16]).with_name(name);
            assert!(validator().validate(&input).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_rejects_other_extensions() {
        let input = RawImageInput::new(vec![1u8; 16]).with_name("scan.tiff");
        let err = validator().validate(&input).unwrap_err();
        assert!(matches!(err, PipelineError::DisallowedType { extension, .. } if extension == "tiff"));
    }

    #[test]
    fn test_rejects_missing_extension_on_named_upload() {
        let input = RawImageInput::new(vec![1u8; 16]).with_name("README");
        assert!(matches!(
            validator().validate(&input),
            Err(PipelineError::DisallowedType { .. })
        ));
    }

    #[test]
    fn test_unnamed_buffer_skips_extension_check() {
        let input = RawImageInput::new(vec![1u8; 16]);
        assert!(validator().validate(&input).is_ok());
    }

    #[test]
    fn test_rejects_empty_buffer() {
        let input = RawImageInput::new(Vec::<u8>::new()).with_name("a.jpg");
        assert!(matches!(
            validator().validate(&input),
            Err(PipelineError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_size_ceiling() {
        let validator = UploadValidator::new(LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        });

        let at_limit = RawImageInput::new(vec![0u8; BYTES_PER_MB as usize]).with_name("a.jpg");
        assert!(validator.validate(&at_limit).is_ok());

        let over = RawImageInput::new(vec![0u8; 2 * BYTES_PER_MB as usize + 1]).with_name("a.jpg");
        let err = validator.validate(&over).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FileTooLarge {
                size_mb: 2,
                max_mb: 1,
                ..
            }
        ));
    }
}
