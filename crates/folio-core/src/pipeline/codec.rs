//! Codec handles used by the pipeline.
//!
//! The HEIC decoder and the rendition encoder are plain values handed to the
//! pipeline at construction time. Neither keeps per-image state, so one
//! [`Codecs`] can serve any number of concurrent runs.

use image::metadata::Orientation;
use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a codec handle.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The codec is not available in this build
    #[error("{0}")]
    Unsupported(String),

    /// The codec rejected the input
    #[error("{0}")]
    Failed(String),
}

/// Pixels straight out of a decoder, before orientation correction.
pub struct DecodedPixels {
    pub image: DynamicImage,
    /// Orientation the decoder left for the caller to apply
    pub orientation: Orientation,
}

/// Decodes HEIC/HEIF containers to raw pixels.
pub trait HeicDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPixels, CodecError>;
}

/// Encodes a resized rendition.
pub trait RenditionEncoder: Send + Sync {
    /// Encode `image` at `quality` (1-100).
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError>;

    /// MIME type of the encoded output.
    fn content_type(&self) -> &'static str;
}

/// The codec handles a pipeline is built with.
#[derive(Clone)]
pub struct Codecs {
    pub heic: Arc<dyn HeicDecoder>,
    pub encoder: Arc<dyn RenditionEncoder>,
}

impl Default for Codecs {
    fn default() -> Self {
        Self {
            heic: default_heic_decoder(),
            encoder: Arc::new(WebpEncoder),
        }
    }
}

#[cfg(feature = "heif")]
fn default_heic_decoder() -> Arc<dyn HeicDecoder> {
    Arc::new(LibheifDecoder)
}

#[cfg(not(feature = "heif"))]
fn default_heic_decoder() -> Arc<dyn HeicDecoder> {
    Arc::new(UnavailableHeicDecoder)
}

/// Lossy WebP encoder backed by libwebp.
pub struct WebpEncoder;

impl RenditionEncoder for WebpEncoder {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let (width, height) = (image.width(), image.height());
        let quality = f32::from(quality);

        let encoded = match image {
            DynamicImage::ImageRgb8(rgb) => {
                webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, quality)
            }
            DynamicImage::ImageRgba8(rgba) => {
                webp::Encoder::from_rgba(rgba.as_raw(), width, height)
                    .encode_simple(false, quality)
            }
            other if other.color().has_alpha() => {
                let rgba = other.to_rgba8();
                let result = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
                    .encode_simple(false, quality);
                result
            }
            other => {
                let rgb = other.to_rgb8();
                let result =
                    webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, quality);
                result
            }
        };

        encoded
            .map(|memory| memory.to_vec())
            .map_err(|e| CodecError::Failed(format!("WebP encoding failed: {:?}", e)))
    }

    fn content_type(&self) -> &'static str {
        "image/webp"
    }
}

/// Stand-in used when the crate is built without the `heif` feature.
pub struct UnavailableHeicDecoder;

impl HeicDecoder for UnavailableHeicDecoder {
    fn decode(&self, _bytes: &[u8]) -> Result<DecodedPixels, CodecError> {
        Err(CodecError::Unsupported(
            "HEIC support requires the 'heif' feature".to_string(),
        ))
    }
}

/// HEIC decoder backed by the system libheif.
///
/// libheif applies the container's rotation and mirror properties while
/// decoding, so the pixels come back in display orientation.
#[cfg(feature = "heif")]
pub struct LibheifDecoder;

#[cfg(feature = "heif")]
impl HeicDecoder for LibheifDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPixels, CodecError> {
        use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

        let failed = |e: libheif_rs::HeifError| CodecError::Failed(e.to_string());

        let lib = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes).map_err(failed)?;
        let handle = ctx.primary_image_handle().map_err(failed)?;
        let decoded = lib
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
            .map_err(failed)?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| CodecError::Failed("decoder returned no interleaved plane".into()))?;

        let (width, height) = (plane.width, plane.height);
        let row_len = width as usize * 4;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in plane.data.chunks(plane.stride).take(height as usize) {
            pixels.extend_from_slice(&row[..row_len]);
        }

        let image = image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| CodecError::Failed("pixel buffer does not match dimensions".into()))?;

        Ok(DecodedPixels {
            image: DynamicImage::ImageRgba8(image),
            orientation: Orientation::NoTransforms,
        })
    }
}
