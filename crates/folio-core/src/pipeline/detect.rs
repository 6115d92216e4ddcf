//! Container detection from the leading bytes of an upload.

use crate::types::DetectedFormat;

/// Bytes needed to read an ISO-BMFF `ftyp` box type and major brand.
pub const SIGNATURE_WINDOW: usize = 12;

/// Major brands that mark an HEVC-coded HEIF container.
const HEIC_BRANDS: [&[u8; 4]; 8] = [
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

/// Classify a buffer as HEIC/HEIF or a standard image container.
///
/// Only bytes 4..12 are inspected, so this is constant time. Buffers too
/// short to carry a signature fall back to `Standard`: the general decoder
/// then fails loudly instead of the input being silently misrouted.
pub fn detect_format(bytes: &[u8]) -> DetectedFormat {
    let Some(window) = bytes.get(4..SIGNATURE_WINDOW) else {
        return DetectedFormat::Standard;
    };
    let (box_type, brand) = window.split_at(4);
    if box_type == b"ftyp" && HEIC_BRANDS.iter().any(|b| brand == b.as_slice()) {
        DetectedFormat::HeicFamily
    } else {
        DetectedFormat::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ftyp(brand: &[u8; 4]) -> Vec<u8> {
        let mut header = vec![0x00, 0x00, 0x00, 0x18];
        header.extend_from_slice(b"ftyp");
        header.extend_from_slice(brand);
        header.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        header
    }

    #[test]
    fn test_heic_brands() {
        for brand in [b"heic", b"heix", b"mif1"] {
            assert_eq!(detect_format(&ftyp(brand)), DetectedFormat::HeicFamily);
        }
    }

    #[test]
    fn test_exactly_twelve_bytes_is_enough() {
        let header = &ftyp(b"heic")[..SIGNATURE_WINDOW];
        assert_eq!(detect_format(header), DetectedFormat::HeicFamily);
    }

    #[test]
    fn test_short_buffers_are_standard() {
        let header = ftyp(b"heic");
        for len in 0..SIGNATURE_WINDOW {
            assert_eq!(detect_format(&header[..len]), DetectedFormat::Standard);
        }
    }

    #[test]
    fn test_other_ftyp_brands_are_standard() {
        assert_eq!(detect_format(&ftyp(b"avif")), DetectedFormat::Standard);
        assert_eq!(detect_format(&ftyp(b"isom")), DetectedFormat::Standard);
    }

    #[test]
    fn test_jpeg_and_png_are_standard() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(detect_format(&jpeg), DetectedFormat::Standard);
        assert_eq!(detect_format(&png), DetectedFormat::Standard);
    }

    #[test]
    fn test_brand_without_ftyp_is_standard() {
        let mut header = ftyp(b"heic");
        header[4..8].copy_from_slice(b"moov");
        assert_eq!(detect_format(&header), DetectedFormat::Standard);
    }
}
