//! Decoding and orientation correction.
//!
//! Both container families end up as the same [`NormalizedSource`], so the
//! rendition stage never needs to know where the pixels came from.

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder as _, ImageReader};
use std::io::Cursor;
use std::sync::Arc;

use super::codec::{CodecError, DecodedPixels, HeicDecoder};
use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::DetectedFormat;

/// Decoded pixels in display orientation.
///
/// Owned by exactly one pipeline run and dropped once its renditions exist.
pub struct NormalizedSource {
    image: DynamicImage,
    width: u32,
    height: u32,
}

impl NormalizedSource {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Width after orientation correction.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height after orientation correction.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl From<DynamicImage> for NormalizedSource {
    fn from(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        Self {
            image,
            width,
            height,
        }
    }
}

/// Turns raw upload bytes into a [`NormalizedSource`].
#[derive(Clone)]
pub struct Normalizer {
    heic: Arc<dyn HeicDecoder>,
    max_dimension: u32,
}

impl Normalizer {
    /// Create a normalizer with the given HEIC decoder and limits.
    pub fn new(heic: Arc<dyn HeicDecoder>, limits: &LimitsConfig) -> Self {
        Self {
            heic,
            max_dimension: limits.max_image_dimension,
        }
    }

    /// Decode and orient in one call.
    pub fn normalize(
        &self,
        bytes: &[u8],
        format: DetectedFormat,
        name: &str,
    ) -> PipelineResult<NormalizedSource> {
        let decoded = self.decode(bytes, format, name)?;
        Ok(self.orient(decoded, name))
    }

    /// Decode through the path selected by `format`.
    pub fn decode(
        &self,
        bytes: &[u8],
        format: DetectedFormat,
        name: &str,
    ) -> PipelineResult<DecodedPixels> {
        let decoded = match format {
            DetectedFormat::Standard => Self::decode_standard(bytes, name)?,
            DetectedFormat::HeicFamily => self.heic.decode(bytes).map_err(|e| match e {
                CodecError::Unsupported(_) => PipelineError::UnsupportedFormat {
                    name: name.to_string(),
                    format: "heic".to_string(),
                },
                CodecError::Failed(message) => PipelineError::Decode {
                    name: name.to_string(),
                    message,
                },
            })?,
        };

        let (width, height) = (decoded.image.width(), decoded.image.height());
        if width == 0 || height == 0 {
            return Err(PipelineError::Decode {
                name: name.to_string(),
                message: format!("decoded image has no pixels ({}x{})", width, height),
            });
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(PipelineError::ImageTooLarge {
                name: name.to_string(),
                width,
                height,
                max_dim: self.max_dimension,
            });
        }
        Ok(decoded)
    }

    /// Apply the pending orientation so pixels are stored as displayed.
    pub fn orient(&self, decoded: DecodedPixels, name: &str) -> NormalizedSource {
        let DecodedPixels {
            mut image,
            orientation,
        } = decoded;
        if orientation != Orientation::NoTransforms {
            tracing::trace!("Applying {:?} to {}", orientation, name);
            image.apply_orientation(orientation);
        }
        NormalizedSource::from(image)
    }

    /// Decode with the general-purpose codec, keeping the EXIF orientation.
    fn decode_standard(bytes: &[u8], name: &str) -> PipelineResult<DecodedPixels> {
        let decode_error = |message: String| PipelineError::Decode {
            name: name.to_string(),
            message,
        };

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| decode_error(format!("Cannot detect image format: {}", e)))?;
        if reader.format().is_none() {
            return Err(PipelineError::UnsupportedFormat {
                name: name.to_string(),
                format: "unknown".to_string(),
            });
        }

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| decode_error(e.to_string()))?;
        let orientation = decoder.orientation().unwrap_or_else(|e| {
            tracing::debug!("Ignoring unreadable orientation in {}: {}", name, e);
            Orientation::NoTransforms
        });
        let image = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(e.to_string()))?;

        Ok(DecodedPixels { image, orientation })
    }
}
