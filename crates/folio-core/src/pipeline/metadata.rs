//! Capture metadata extraction from raw upload bytes.
//!
//! Works on the undecoded buffer so it can run alongside normalization.
//! Nothing here can fail the pipeline: unreadable metadata yields an empty
//! [`CaptureMetadata`].

use chrono::{FixedOffset, NaiveDateTime};
use exif::{Exif, In, Reader, Tag, Value};
use img_parts::{Bytes, ImageICC};
use std::io::Cursor;

use super::icc;
use crate::types::CaptureMetadata;

/// Extracts capture metadata from image buffers.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract capture metadata from an image buffer.
    ///
    /// The color space falls back to the embedded ICC profile's description
    /// even when the EXIF block is missing.
    pub fn extract(bytes: &[u8]) -> CaptureMetadata {
        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => Some(exif),
            Err(e) => {
                tracing::debug!("No readable EXIF block: {}", e);
                None
            }
        };

        let color_space = exif
            .as_ref()
            .and_then(Self::get_color_space)
            .or_else(|| Self::get_profile_description(bytes));

        let Some(exif) = exif else {
            return CaptureMetadata {
                color_space,
                ..CaptureMetadata::default()
            };
        };

        CaptureMetadata {
            camera_make: Self::get_string(&exif, Tag::Make),
            camera_model: Self::get_string(&exif, Tag::Model),
            lens_model: Self::get_string(&exif, Tag::LensModel),
            iso: exif
                .get_field(Tag::PhotographicSensitivity, In::PRIMARY)
                .and_then(|f| f.value.get_uint(0)),
            aperture: Self::get_f64(&exif, Tag::FNumber),
            shutter_speed: format_shutter_speed(Self::get_f64(&exif, Tag::ExposureTime)),
            focal_length: Self::get_f64(&exif, Tag::FocalLength),
            captured_at: Self::get_captured_at(&exif),
            color_space,
        }
    }

    /// Get an ASCII field, trimmed of padding.
    fn get_string(exif: &Exif, tag: Tag) -> Option<String> {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| ascii_value(&f.value))
    }

    /// Get a numeric field as f64, rejecting zero denominators.
    fn get_f64(exif: &Exif, tag: Tag) -> Option<f64> {
        let field = exif.get_field(tag, In::PRIMARY)?;
        let value = match &field.value {
            Value::Rational(v) => v.first().map(|r| r.to_f64()),
            Value::SRational(v) => v.first().map(|r| r.to_f64()),
            Value::Float(v) => v.first().map(|&x| x as f64),
            Value::Double(v) => v.first().copied(),
            other => other.get_uint(0).map(f64::from),
        };
        value.filter(|v| v.is_finite())
    }

    /// Capture time, preferring DateTimeOriginal over DateTimeDigitized.
    fn get_captured_at(exif: &Exif) -> Option<String> {
        let candidates = [
            (Tag::DateTimeOriginal, Tag::OffsetTimeOriginal),
            (Tag::DateTimeDigitized, Tag::OffsetTimeDigitized),
        ];
        let (datetime, offset) = candidates.iter().find_map(|&(time_tag, offset_tag)| {
            Self::get_string(exif, time_tag).map(|t| (t, Self::get_string(exif, offset_tag)))
        })?;
        format_timestamp(&datetime, offset.as_deref())
    }

    fn get_color_space(exif: &Exif) -> Option<String> {
        let field = exif.get_field(Tag::ColorSpace, In::PRIMARY)?;
        match &field.value {
            Value::Ascii(_) => ascii_value(&field.value),
            value => value
                .get_uint(0)
                .and_then(color_space_label)
                .map(str::to_string),
        }
    }

    fn get_profile_description(bytes: &[u8]) -> Option<String> {
        extract_icc_profile(bytes).and_then(|profile| icc::profile_description(&profile))
    }
}

/// Format an exposure time in seconds the way photographers write it.
///
/// `0.004` becomes `"1/250s"`, `2.0` becomes `"2s"`. Missing, zero,
/// negative and non-finite exposures yield `None`.
pub fn format_shutter_speed(exposure: Option<f64>) -> Option<String> {
    let t = exposure.filter(|t| t.is_finite() && *t > 0.0)?;
    if t >= 1.0 {
        Some(format!("{}s", t))
    } else {
        Some(format!("1/{}s", (1.0 / t).round()))
    }
}

/// Human label for an EXIF ColorSpace code.
pub fn color_space_label(code: u32) -> Option<&'static str> {
    match code {
        1 => Some("sRGB"),
        2 => Some("Adobe RGB"),
        0xFFFF => Some("Uncalibrated"),
        _ => None,
    }
}

/// Convert an EXIF `YYYY:MM:DD HH:MM:SS` timestamp to ISO 8601.
///
/// When an offset tag is present the result carries it, otherwise the time
/// is left without a zone.
fn format_timestamp(datetime: &str, offset: Option<&str>) -> Option<String> {
    let naive = NaiveDateTime::parse_from_str(datetime.trim(), "%Y:%m:%d %H:%M:%S").ok()?;
    let zoned = offset
        .and_then(|o| o.trim().parse::<FixedOffset>().ok())
        .and_then(|tz| naive.and_local_timezone(tz).single());
    match zoned {
        Some(dt) => Some(dt.to_rfc3339()),
        None => Some(naive.format("%Y-%m-%dT%H:%M:%S").to_string()),
    }
}

fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts.iter().find_map(|part| {
            let text = String::from_utf8_lossy(part);
            let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }),
        _ => None,
    }
}

/// Pull the raw ICC profile out of a JPEG, PNG or WebP container.
fn extract_icc_profile(bytes: &[u8]) -> Option<Bytes> {
    let data = Bytes::copy_from_slice(bytes);

    if let Ok(jpeg) = img_parts::jpeg::Jpeg::from_bytes(data.clone()) {
        return jpeg.icc_profile();
    }
    if let Ok(png) = img_parts::png::Png::from_bytes(data.clone()) {
        return png.icc_profile();
    }
    if let Ok(webp) = img_parts::webp::WebP::from_bytes(data) {
        return webp.icc_profile();
    }
    None
}
