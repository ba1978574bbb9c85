//! Exclude-by-content filter and the escape decoder for text patterns.

use crate::recovery::scanner::find;

/// True iff `pattern` is non-empty and occurs anywhere in `body`.
pub fn should_exclude(body: &[u8], pattern: &[u8]) -> bool {
    !pattern.is_empty() && find(body, pattern).is_some()
}

/// Decode a pattern given on the command line into raw bytes.
///
/// | Input | Output |
/// |-------|--------|
/// | `\xHH` | byte `0xHH` |
/// | `\\` | `\` |
/// | `\c` | `c` |
/// | anything else | itself |
///
/// `\x` followed by two characters that are not both hex digits yields
/// `0x00` and consumes both.  `\x` with fewer than two characters left
/// decodes as `x`.  A trailing lone `\` is kept.
pub fn decode_pattern(text: &str) -> Vec<u8> {
    let src = text.as_bytes();
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0usize;

    while i < src.len() {
        if src[i] != b'\\' || i + 1 == src.len() {
            out.push(src[i]);
            i += 1;
            continue;
        }
        match src[i + 1] {
            b'x' if i + 4 <= src.len() => {
                out.push(parse_hex_pair(src[i + 2], src[i + 3]).unwrap_or(0));
                i += 4;
            }
            c => {
                out.push(c);
                i += 2;
            }
        }
    }
    out
}

fn parse_hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let digit = |c: u8| (c as char).to_digit(16).map(|d| d as u8);
    Some(digit(hi)? << 4 | digit(lo)?)
}
