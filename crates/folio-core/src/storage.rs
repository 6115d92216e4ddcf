//! Object storage keys for finished renditions.

use crate::types::SizeKey;

/// Top-level prefix every rendition key lives under.
pub const GALLERY_PREFIX: &str = "gallery";

/// Content type to send with each rendition upload.
pub const RENDITION_CONTENT_TYPE: &str = "image/webp";

/// Build the storage key for one rendition of an upload.
///
/// The final extension of `base_name` is dropped, each run of characters
/// outside `[A-Za-z0-9_-]` becomes a single `_`, and the result is
/// lower-cased.
///
/// ```
/// use folio_core::{generate_rendition_path, SizeKey};
///
/// assert_eq!(
///     generate_rendition_path("charlie", "My Photo!!.HEIC", SizeKey::Thumb),
///     "gallery/charlie/my_photo_-thumb.webp"
/// );
/// ```
pub fn generate_rendition_path(category_slug: &str, base_name: &str, size: SizeKey) -> String {
    format!(
        "{}/{}/{}-{}.webp",
        GALLERY_PREFIX,
        category_slug,
        sanitize_stem(base_name),
        size
    )
}

fn sanitize_stem(base_name: &str) -> String {
    let stem = match base_name.rfind('.') {
        Some(dot) if dot + 1 < base_name.len() => &base_name[..dot],
        _ => base_name,
    };

    let mut out = String::with_capacity(stem.len());
    let mut in_run = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c.to_ascii_lowercase());
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs_and_lowercases() {
        assert_eq!(
            generate_rendition_path("charlie", "My Photo!!.HEIC", SizeKey::Thumb),
            "gallery/charlie/my_photo_-thumb.webp"
        );
    }

    #[test]
    fn test_every_size_key() {
        assert_eq!(
            generate_rendition_path("travel", "IMG_0042.jpg", SizeKey::Medium),
            "gallery/travel/img_0042-medium.webp"
        );
        assert_eq!(
            generate_rendition_path("travel", "IMG_0042.jpg", SizeKey::Full),
            "gallery/travel/img_0042-full.webp"
        );
    }

    #[test]
    fn test_only_the_last_extension_is_dropped() {
        assert_eq!(
            generate_rendition_path("misc", "archive.tar.gz", SizeKey::Thumb),
            "gallery/misc/archive_tar-thumb.webp"
        );
    }

    #[test]
    fn test_keeps_dashes_and_underscores() {
        assert_eq!(
            generate_rendition_path("misc", "sun-set_01.png", SizeKey::Thumb),
            "gallery/misc/sun-set_01-thumb.webp"
        );
    }

    #[test]
    fn test_non_ascii_is_replaced() {
        assert_eq!(
            generate_rendition_path("misc", "Café Müller.webp", SizeKey::Thumb),
            "gallery/misc/caf_m_ller-thumb.webp"
        );
    }

    #[test]
    fn test_trailing_dot_is_not_an_extension() {
        assert_eq!(
            generate_rendition_path("misc", "photo.", SizeKey::Thumb),
            "gallery/misc/photo_-thumb.webp"
        );
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(
            generate_rendition_path("misc", "Scan 7", SizeKey::Full),
            "gallery/misc/scan_7-full.webp"
        );
    }
}
