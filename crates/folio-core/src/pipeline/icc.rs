//! Minimal ICC profile reader: just enough to recover the profile description.

const HEADER_LEN: usize = 128;
const TAG_ENTRY_LEN: usize = 12;

/// Read the `desc` tag of an ICC profile.
///
/// Handles both the v2 `desc` text type and the v4 `mluc` type (first
/// record only). Any structural problem yields `None`.
pub fn profile_description(profile: &[u8]) -> Option<String> {
    let declared = read_u32(profile, HEADER_LEN)? as usize;
    let room = profile.len().saturating_sub(HEADER_LEN + 4) / TAG_ENTRY_LEN;

    (0..declared.min(room)).find_map(|i| {
        let entry = HEADER_LEN + 4 + i * TAG_ENTRY_LEN;
        if profile.get(entry..entry + 4)? != b"desc" {
            return None;
        }
        let offset = read_u32(profile, entry + 4)? as usize;
        let size = read_u32(profile, entry + 8)? as usize;
        let tag = profile.get(offset..offset.checked_add(size)?)?;
        parse_description_tag(tag)
    })
}

fn parse_description_tag(tag: &[u8]) -> Option<String> {
    match tag.get(0..4)? {
        b"desc" => {
            let len = read_u32(tag, 8)? as usize;
            let text = tag.get(12..12usize.checked_add(len)?)?;
            clean(&String::from_utf8_lossy(text))
        }
        b"mluc" => {
            if read_u32(tag, 8)? == 0 {
                return None;
            }
            let len = read_u32(tag, 20)? as usize;
            let offset = read_u32(tag, 24)? as usize;
            let raw = tag.get(offset..offset.checked_add(len)?)?;
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            clean(&String::from_utf16_lossy(&units))
        }
        _ => None,
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn clean(text: &str) -> Option<String> {
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a profile holding a single tag at offset 144.
    pub(crate) fn profile_with_tag(tag: &[u8]) -> Vec<u8> {
        let mut profile = vec![0u8; HEADER_LEN];
        profile.extend_from_slice(&1u32.to_be_bytes());
        profile.extend_from_slice(b"desc");
        profile.extend_from_slice(&144u32.to_be_bytes());
        profile.extend_from_slice(&(tag.len() as u32).to_be_bytes());
        profile.extend_from_slice(tag);
        let total = profile.len() as u32;
        profile[0..4].copy_from_slice(&total.to_be_bytes());
        profile
    }

    pub(crate) fn v2_desc(text: &str) -> Vec<u8> {
        let mut tag = b"desc".to_vec();
        tag.extend_from_slice(&[0; 4]);
        tag.extend_from_slice(&((text.len() + 1) as u32).to_be_bytes());
        tag.extend_from_slice(text.as_bytes());
        tag.push(0);
        tag
    }

    fn v4_mluc(text: &str) -> Vec<u8> {
        let utf16: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        let mut tag = b"mluc".to_vec();
        tag.extend_from_slice(&[0; 4]);
        tag.extend_from_slice(&1u32.to_be_bytes());
        tag.extend_from_slice(&12u32.to_be_bytes());
        tag.extend_from_slice(b"enUS");
        tag.extend_from_slice(&(utf16.len() as u32).to_be_bytes());
        tag.extend_from_slice(&28u32.to_be_bytes());
        tag.extend_from_slice(&utf16);
        tag
    }

    #[test]
    fn test_v2_description() {
        let profile = profile_with_tag(&v2_desc("Display P3"));
        assert_eq!(profile_description(&profile).as_deref(), Some("Display P3"));
    }

    #[test]
    fn test_v4_multilocalized_description() {
        let profile = profile_with_tag(&v4_mluc("sRGB IEC61966-2.1"));
        assert_eq!(
            profile_description(&profile).as_deref(),
            Some("sRGB IEC61966-2.1")
        );
    }

    #[test]
    fn test_truncated_profile() {
        let profile = profile_with_tag(&v2_desc("Display P3"));
        assert!(profile_description(&profile[..150]).is_none());
        assert!(profile_description(&[]).is_none());
    }

    #[test]
    fn test_absurd_tag_count_is_bounded() {
        let mut profile = vec![0u8; HEADER_LEN];
        profile.extend_from_slice(&u32::MAX.to_be_bytes());
        assert!(profile_description(&profile).is_none());
    }

    #[test]
    fn test_blank_description_is_none() {
        let profile = profile_with_tag(&v2_desc("   "));
        assert!(profile_description(&profile).is_none());
    }
}
