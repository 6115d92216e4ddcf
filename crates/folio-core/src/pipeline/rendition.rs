//! Rendition derivation: width-capped resize plus lossy re-encode.

use image::imageops::FilterType;
use std::borrow::Cow;
use std::sync::Arc;

use super::codec::RenditionEncoder;
use super::normalize::NormalizedSource;
use crate::config::RenditionConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{Rendition, SizeKey};

/// Produces the thumb/medium/full renditions from a normalized source.
#[derive(Clone)]
pub struct RenditionDeriver {
    config: RenditionConfig,
    encoder: Arc<dyn RenditionEncoder>,
}

impl RenditionDeriver {
    /// Create a deriver with the given sizes and encoder.
    pub fn new(config: RenditionConfig, encoder: Arc<dyn RenditionEncoder>) -> Self {
        Self { config, encoder }
    }

    /// Derive one rendition.
    ///
    /// The width is capped at the source width, so sources narrower than the
    /// target are re-encoded at their own size rather than upscaled.
    pub fn derive(
        &self,
        source: &NormalizedSource,
        size: SizeKey,
        name: &str,
    ) -> PipelineResult<Rendition> {
        let target = self.config.width_for(size);
        let (width, height) = fit_width(source.width(), source.height(), target);

        let resized = if width == source.width() && height == source.height() {
            Cow::Borrowed(source.image())
        } else {
            let filter: FilterType = self.config.filter.into();
            Cow::Owned(source.image().resize_exact(width, height, filter))
        };

        let bytes = self
            .encoder
            .encode(&resized, self.config.quality)
            .map_err(|e| PipelineError::Encode {
                name: name.to_string(),
                size,
                message: e.to_string(),
            })?;

        tracing::trace!(
            "Derived {} rendition of {}: {}x{} ({} bytes)",
            size,
            name,
            width,
            height,
            bytes.len()
        );

        Ok(Rendition {
            size,
            byte_length: bytes.len(),
            bytes,
            width,
            height,
        })
    }

    /// MIME type of every rendition this deriver produces.
    pub fn content_type(&self) -> &'static str {
        self.encoder.content_type()
    }
}

/// Output dimensions for a width-capped, aspect-preserving resize.
///
/// Never exceeds the source width; height is rounded and at least 1.
pub fn fit_width(source_width: u32, source_height: u32, target_width: u32) -> (u32, u32) {
    let width = target_width.min(source_width).max(1);
    if width == source_width {
        return (source_width, source_height);
    }
    let scaled = (f64::from(source_height) * f64::from(width) / f64::from(source_width)).round();
    (width, (scaled as u32).max(1))
}
