//! Core data types for the Folio ingestion pipeline.
//!
//! Everything here is created and consumed within a single pipeline run. The
//! only value that outlives a run is the [`ProcessedImageSet`], which is handed
//! to the caller in full.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// An uploaded image buffer plus the name it was declared with.
///
/// The bytes are reference counted so concurrent pipeline branches can read
/// them without copying. The pipeline never persists the buffer.
#[derive(Debug, Clone)]
pub struct RawImageInput {
    bytes: Arc<[u8]>,
    name: Option<String>,
}

impl RawImageInput {
    /// Wrap a byte buffer with no declared name.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            name: None,
        }
    }

    /// Attach the declared file name (e.g. the multipart upload's filename).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used in logs and errors.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<buffer>")
    }

    /// Lower-cased extension of the declared name, if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .as_deref()
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Container family of an input, decided from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedFormat {
    /// Anything the general-purpose codec handles (JPEG, PNG, WebP, ...)
    Standard,
    /// HEIC/HEIF containers that need the dedicated decoder
    HeicFamily,
}

/// The three fixed rendition sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeKey {
    Thumb,
    Medium,
    Full,
}

impl SizeKey {
    /// All sizes, smallest first.
    pub const ALL: [SizeKey; 3] = [SizeKey::Thumb, SizeKey::Medium, SizeKey::Full];

    /// Default target width in pixels.
    pub fn default_width(self) -> u32 {
        match self {
            SizeKey::Thumb => 400,
            SizeKey::Medium => 1200,
            SizeKey::Full => 2400,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeKey::Thumb => "thumb",
            SizeKey::Medium => "medium",
            SizeKey::Full => "full",
        }
    }
}

impl fmt::Display for SizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress tags reported while an image moves through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingStep {
    Decoding,
    Normalizing,
    Resizing(SizeKey),
}

impl ProcessingStep {
    /// Wire name, e.g. `resizing:medium`.
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingStep::Decoding => "decoding",
            ProcessingStep::Normalizing => "normalizing",
            ProcessingStep::Resizing(SizeKey::Thumb) => "resizing:thumb",
            ProcessingStep::Resizing(SizeKey::Medium) => "resizing:medium",
            ProcessingStep::Resizing(SizeKey::Full) => "resizing:full",
        }
    }
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProcessingStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Capture metadata embedded in the image file.
///
/// Every field is independently optional; absence is the normal case for
/// screenshots and exported PNGs. Serialized with explicit nulls because this
/// is the shape stored alongside the photo record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    /// Camera manufacturer
    pub camera_make: Option<String>,

    /// Camera model
    pub camera_model: Option<String>,

    /// Lens model
    pub lens_model: Option<String>,

    /// ISO sensitivity
    pub iso: Option<u32>,

    /// Aperture as an f-number (2.8 for f/2.8)
    pub aperture: Option<f64>,

    /// Exposure time, e.g. "1/250s" or "2s"
    pub shutter_speed: Option<String>,

    /// Focal length in mm
    pub focal_length: Option<f64>,

    /// When the photo was captured (ISO 8601)
    pub captured_at: Option<String>,

    /// "sRGB", "Adobe RGB", "Uncalibrated" or an ICC profile description
    pub color_space: Option<String>,
}

impl CaptureMetadata {
    /// True when no field was recovered.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize for storage in the photo record.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One resized, re-encoded derivative of the source image.
#[derive(Clone)]
pub struct Rendition {
    pub size: SizeKey,
    /// Encoded WebP bytes
    pub bytes: Vec<u8>,
    /// Actual output width in pixels
    pub width: u32,
    /// Actual output height in pixels
    pub height: u32,
    /// Length of `bytes`
    pub byte_length: usize,
}

impl fmt::Debug for Rendition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendition")
            .field("size", &self.size)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("byte_length", &self.byte_length)
            .finish()
    }
}

/// The complete output of one pipeline run.
///
/// Ownership passes to the caller, which uploads the renditions and records
/// them; the pipeline keeps no reference.
#[derive(Debug, Clone)]
pub struct ProcessedImageSet {
    pub thumb: Rendition,
    pub medium: Rendition,
    pub full: Rendition,
    /// Width after orientation correction, before resizing
    pub original_width: u32,
    /// Height after orientation correction, before resizing
    pub original_height: u32,
    pub metadata: CaptureMetadata,
}

impl ProcessedImageSet {
    pub fn rendition(&self, size: SizeKey) -> &Rendition {
        match size {
            SizeKey::Thumb => &self.thumb,
            SizeKey::Medium => &self.medium,
            SizeKey::Full => &self.full,
        }
    }

    /// Renditions in `SizeKey::ALL` order.
    pub fn renditions(&self) -> [&Rendition; 3] {
        [&self.thumb, &self.medium, &self.full]
    }

    /// Byte-free view of the set, suitable for logging or JSON responses.
    pub fn summary(&self) -> ProcessedSummary {
        ProcessedSummary {
            original_width: self.original_width,
            original_height: self.original_height,
            renditions: self
                .renditions()
                .into_iter()
                .map(|r| RenditionSummary {
                    size: r.size,
                    width: r.width,
                    height: r.height,
                    byte_length: r.byte_length,
                })
                .collect(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Serializable description of a [`ProcessedImageSet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSummary {
    pub original_width: u32,
    pub original_height: u32,
    pub renditions: Vec<RenditionSummary>,
    pub metadata: CaptureMetadata,
}

/// Dimensions and size of one rendition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenditionSummary {
    pub size: SizeKey,
    pub width: u32,
    pub height: u32,
    pub byte_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendition(size: SizeKey, width: u32) -> Rendition {
        Rendition {
            size,
            bytes: vec![0; 16],
            width,
            height: width / 2,
            byte_length: 16,
        }
    }

    #[test]
    fn test_raw_input_extension_is_lowercased() {
        let input = RawImageInput::new(vec![1u8, 2, 3]).with_name("IMG_0042.HEIC");
        assert_eq!(input.extension().as_deref(), Some("heic"));
        assert_eq!(input.display_name(), "IMG_0042.HEIC");
    }

    #[test]
    fn test_raw_input_without_name() {
        let input = RawImageInput::new(Vec::<u8>::new());
        assert!(input.is_empty());
        assert!(input.extension().is_none());
        assert_eq!(input.display_name(), "<buffer>");
    }

    #[test]
    fn test_processing_step_wire_names() {
        assert_eq!(ProcessingStep::Decoding.to_string(), "decoding");
        assert_eq!(
            ProcessingStep::Resizing(SizeKey::Medium).to_string(),
            "resizing:medium"
        );
        let json = serde_json::to_string(&ProcessingStep::Resizing(SizeKey::Full)).unwrap();
        assert_eq!(json, "\"resizing:full\"");
    }

    #[test]
    fn test_empty_metadata_serializes_explicit_nulls() {
        let json = CaptureMetadata::default().to_json().unwrap();
        assert!(json.contains("\"cameraMake\":null"));
        assert!(json.contains("\"shutterSpeed\":null"));
        assert!(json.contains("\"colorSpace\":null"));
    }

    #[test]
    fn test_metadata_is_empty() {
        let mut metadata = CaptureMetadata::default();
        assert!(metadata.is_empty());
        metadata.iso = Some(400);
        assert!(!metadata.is_empty());
    }

    #[test]
    fn test_summary_keeps_size_order_and_drops_bytes() {
        let set = ProcessedImageSet {
            thumb: rendition(SizeKey::Thumb, 400),
            medium: rendition(SizeKey::Medium, 1200),
            full: rendition(SizeKey::Full, 2400),
            original_width: 4000,
            original_height: 2000,
            metadata: CaptureMetadata::default(),
        };
        let summary = set.summary();
        let widths: Vec<u32> = summary.renditions.iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![400, 1200, 2400]);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"originalWidth\":4000"));
        assert!(json.contains("\"size\":\"medium\""));
        assert!(!json.contains("bytes\""));
        assert_eq!(set.rendition(SizeKey::Full).width, 2400);
    }
}
