//! Embedded-header search over a buffered body.
//!
//! Concatenated and polyglot files carry a second container somewhere past
//! the outer header.  The search is deliberately shallow: it looks for the
//! first `CWS` anywhere in the buffer, and only if there is none, for the
//! first `FWS`.  A compressed signature therefore wins even when an
//! uncompressed one appears earlier.

use crate::header::{Signature, MAGIC_COMPRESSED, MAGIC_UNCOMPRESSED};

/// Position in a buffer where a recognised signature begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryCandidate {
    pub offset:    usize,
    pub signature: Signature,
}

/// Locate the next container to re-enter, if any.
pub fn find_embedded_header(buf: &[u8]) -> Option<RecoveryCandidate> {
    if let Some(offset) = find(buf, MAGIC_COMPRESSED) {
        return Some(RecoveryCandidate { offset, signature: Signature::Compressed });
    }
    find(buf, MAGIC_UNCOMPRESSED)
        .map(|offset| RecoveryCandidate { offset, signature: Signature::Uncompressed })
}

/// First occurrence of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_signature_takes_priority() {
        let buf = b"..FWS....CWS..";
        assert_eq!(
            find_embedded_header(buf),
            Some(RecoveryCandidate { offset: 9, signature: Signature::Compressed })
        );
    }

    #[test]
    fn falls_back_to_uncompressed() {
        assert_eq!(
            find_embedded_header(b"garbageFWS\x08"),
            Some(RecoveryCandidate { offset: 7, signature: Signature::Uncompressed })
        );
    }

    #[test]
    fn nothing_embedded() {
        assert_eq!(find_embedded_header(b""), None);
        assert_eq!(find_embedded_header(b"CW"), None);
        assert_eq!(find_embedded_header(b"no headers here, FW S, C W S"), None);
    }

    #[test]
    fn find_first_occurrence() {
        assert_eq!(find(b"abcabc", b"bc"), Some(1));
        assert_eq!(find(b"abc", b"abcd"), None);
        assert_eq!(find(b"abc", b""), Some(0));
    }
}
