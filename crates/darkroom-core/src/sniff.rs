//! Magic-byte content-type detection.
//!
//! Identifies a file's true format from its leading bytes instead of
//! trusting a declared MIME type or a file extension. Only the first
//! [`SNIFF_LEN`] bytes are ever inspected, so the cost is fixed no matter
//! how large the file is.

/// Number of leading bytes a signature may cover.
pub const SNIFF_LEN: usize = 4;

/// A magic-byte signature. `head` matches when
/// `(head[i] & mask[i]) == pattern[i]` for every position the mask covers.
struct Signature {
    mime: &'static str,
    pattern: &'static [u8],
    mask: &'static [u8],
}

// Patterns follow https://mimesniff.spec.whatwg.org/#matching-an-image-type-pattern
const SIGNATURES: &[Signature] = &[
    Signature {
        mime: "image/jpeg",
        pattern: &[0xFF, 0xD8, 0xFF],
        mask: &[0xFF, 0xFF, 0xFF],
    },
    Signature {
        mime: "image/png",
        pattern: &[0x89, 0x50, 0x4E, 0x47],
        mask: &[0xFF, 0xFF, 0xFF, 0xFF],
    },
    Signature {
        mime: "image/gif",
        pattern: &[0x47, 0x49, 0x46, 0x38],
        mask: &[0xFF, 0xFF, 0xFF, 0xFF],
    },
];

impl Signature {
    fn matches(&self, head: &[u8]) -> bool {
        if head.len() < self.mask.len() {
            return false;
        }
        self.mask
            .iter()
            .zip(self.pattern)
            .zip(head)
            .all(|((mask, pattern), byte)| byte & mask == *pattern)
    }
}

/// Returns the content type detected from `head`, falling back to the
/// caller-supplied type when no registered signature matches. First match
/// wins. Never fails: short or empty input degrades to the fallback.
pub fn sniff(head: &[u8], fallback: &str) -> String {
    let head = &head[..head.len().min(SNIFF_LEN)];
    for signature in SIGNATURES {
        if signature.matches(head) {
            return signature.mime.to_string();
        }
    }
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jpeg_regardless_of_fourth_byte() {
        for fourth in [0x00, 0xE0, 0xE1, 0xFF] {
            let head = [0xFF, 0xD8, 0xFF, fourth];
            assert_eq!(sniff(&head, "application/octet-stream"), "image/jpeg");
        }
    }

    #[test]
    fn detects_png() {
        let head = [0x89, 0x50, 0x4E, 0x47];
        assert_eq!(sniff(&head, "application/octet-stream"), "image/png");
    }

    #[test]
    fn detects_gif() {
        assert_eq!(sniff(b"GIF89a", "application/octet-stream"), "image/gif");
        assert_eq!(sniff(b"GIF87a", "application/octet-stream"), "image/gif");
    }

    #[test]
    fn unknown_signature_returns_fallback_unchanged() {
        let head = [0x00, 0x01, 0x02, 0x03];
        assert_eq!(sniff(&head, "image/webp"), "image/webp");
    }

    #[test]
    fn short_head_returns_fallback() {
        assert_eq!(sniff(&[0xFF, 0xD8], "image/tiff"), "image/tiff");
        assert_eq!(sniff(&[], "text/plain"), "text/plain");
    }

    #[test]
    fn only_first_four_bytes_are_considered() {
        // PNG signature followed by junk still reads as PNG.
        let mut data = vec![0x89, 0x50, 0x4E, 0x47];
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(sniff(&data, "application/octet-stream"), "image/png");
    }
}
