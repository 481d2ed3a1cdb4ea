//! Shared text checks and fingerprints.

use sha2::{Digest, Sha256};

/// Share of U+FFFD replacement characters above which text is treated as
/// lossily decoded binary data.
const MAX_REPLACEMENT_RATIO: f64 = 0.1;

/// Reason `text` cannot be analyzed, or `None` if it is usable.
pub(crate) fn malformed_reason(text: &str) -> Option<&'static str> {
    if text.contains('\0') {
        return Some("contains NUL bytes");
    }

    let mut total = 0_usize;
    let mut replaced = 0_usize;
    for c in text.chars() {
        total += 1;
        if c == char::REPLACEMENT_CHARACTER {
            replaced += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = if total == 0 {
        0.0
    } else {
        replaced as f64 / total as f64
    };
    if ratio > MAX_REPLACEMENT_RATIO {
        return Some("looks like binary data");
    }

    None
}

/// Hex SHA-256 of `content`.
#[must_use]
pub fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_usable() {
        assert_eq!(malformed_reason("Alvarez PLC reported earnings."), None);
        assert_eq!(malformed_reason(""), None);
    }

    #[test]
    fn nul_bytes_are_malformed() {
        assert_eq!(malformed_reason("abc\0def"), Some("contains NUL bytes"));
    }

    #[test]
    fn mostly_replacement_chars_are_malformed() {
        let text = "\u{FFFD}\u{FFFD}\u{FFFD}abc";
        assert_eq!(malformed_reason(text), Some("looks like binary data"));
    }

    #[test]
    fn occasional_replacement_char_is_tolerated() {
        let text = format!("{}\u{FFFD}", "a".repeat(50));
        assert_eq!(malformed_reason(&text), None);
    }

    #[test]
    fn content_hash_is_stable_hex() {
        let a = content_hash("hello");
        assert_eq!(a, content_hash("hello"));
        assert_eq!(a.len(), 64);
        assert_eq!(
            a,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_ne!(a, content_hash("hello!"));
    }
}
