//! Name production and whitespace classification.
//!
//! This core deliberately narrows the XML spec's `NameStartChar`/`NameChar`
//! productions to ASCII, per spec §9: "the core assumes an ASCII-compatible
//! single-byte stream ... Non-ASCII bytes in names are rejected."

/// A function to check whether the byte is XML whitespace (space, tab,
/// carriage return or line feed).
#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Whether `b` may start a Name: an ASCII letter, `_`, or `:`.
#[inline]
pub(crate) fn is_name_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':'
}

/// Whether `b` may continue a Name: letter, digit, `_`, `-`, `.`, or `:`.
#[inline]
pub(crate) fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn name_start_char_rejects_digits() {
        assert!(!is_name_start_char(b'0'));
        assert!(is_name_start_char(b'a'));
        assert!(is_name_start_char(b'_'));
        assert!(is_name_start_char(b':'));
    }

    #[test]
    fn name_char_accepts_digits_and_punctuation() {
        assert!(is_name_char(b'0'));
        assert!(is_name_char(b'-'));
        assert!(is_name_char(b'.'));
        assert!(!is_name_char(b' '));
    }

    #[test]
    fn whitespace_matches_xml_whitespace_set() {
        for b in [b' ', b'\t', b'\r', b'\n'] {
            assert_eq!(is_whitespace(b), true);
        }
        assert_eq!(is_whitespace(b'a'), false);
    }
}
