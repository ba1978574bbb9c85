use std::io;
use thiserror::Error;

/// Per-file failure raised while classifying, decoding or recovering a
/// container.  None of these are fatal to a batch run.
#[derive(Error, Debug)]
pub enum UnpackError {
    #[error("Truncated input: fewer than 8 header bytes available")]
    TruncatedInput,
    #[error("Invalid header: unrecognised signature {}", display_magic(.found))]
    InvalidHeader { found: [u8; 3] },
    #[error("Decompression error: {0}")]
    Decompression(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Recovery depth exceeded: more than {limit} embedded headers")]
    RecoveryDepthExceeded { limit: usize },
    /// Only raised when a body size cap is configured.  The body is never
    /// silently truncated.
    #[error("Decoded body exceeds the configured limit of {limit} bytes")]
    BodyTooLarge { limit: usize },
}

fn display_magic(m: &[u8; 3]) -> String {
    if m.iter().all(|b| b.is_ascii_graphic()) {
        String::from_utf8_lossy(m).into_owned()
    } else {
        format!("0x{}", hex::encode(m))
    }
}

impl UnpackError {
    /// Map a short read to `TruncatedInput`; anything else stays an I/O error.
    pub(crate) fn from_header_read(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            UnpackError::TruncatedInput
        } else {
            UnpackError::Io(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_header_message_shows_ascii_or_hex() {
        let e = UnpackError::InvalidHeader { found: *b"ABC" };
        assert_eq!(e.to_string(), "Invalid header: unrecognised signature ABC");
        let e = UnpackError::InvalidHeader { found: [0x00, 0xff, 0x10] };
        assert_eq!(e.to_string(), "Invalid header: unrecognised signature 0x00ff10");
    }

    #[test]
    fn short_read_maps_to_truncated() {
        let e = UnpackError::from_header_read(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(e, UnpackError::TruncatedInput));
        let e = UnpackError::from_header_read(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(e, UnpackError::Io(_)));
    }
}
