//! Unpack pipeline with polyglot recovery.
//!
//! A file is classified once; its version byte is captured then and carried
//! unchanged to the result.  For an `FWS` body the scanner looks for an
//! embedded container and, when it finds one, re-enters classification at
//! that offset.  This repeats until a terminal body is reached:
//!
//! ```text
//! Classify ──CWS──▶ Inflate ──────────────▶ Done
//!     │
//!     └─FWS──▶ Scan ──none──────────────────▶ Done (body taken literally)
//!               │
//!               └─found at i──▶ Classify(i) ─┘ (depth + 1)
//! ```
//!
//! Inflated `CWS` output is never scanned.  Every hop is counted against
//! [`UnpackOptions::max_recovery_depth`].

pub mod scanner;

use std::io::Read;

use tracing::debug;

use crate::codec::get_codec;
use crate::error::UnpackError;
use crate::header::{ContainerHeader, Signature, HEADER_SIZE};
pub use scanner::{find_embedded_header, RecoveryCandidate};

pub const DEFAULT_MAX_RECOVERY_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Maximum number of embedded headers followed before giving up.
    pub max_recovery_depth: usize,
    /// Optional cap on the decoded body size.  `None` means unbounded.
    pub max_body_size:      Option<usize>,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            max_recovery_depth: DEFAULT_MAX_RECOVERY_DEPTH,
            max_body_size:      None,
        }
    }
}

/// A fully decoded container, independent of the source it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContainer {
    /// Version byte of the outermost header.
    pub version: u8,
    pub body:    Vec<u8>,
    /// Signature of the container that produced `body`.
    pub source_signature: Signature,
    /// File offsets of each embedded header that was followed, in order.
    pub recovered_from: Vec<usize>,
}

impl DecodedContainer {
    pub fn recovery_depth(&self) -> usize {
        self.recovered_from.len()
    }
}

/// Decode one container from `reader` with default options.
pub fn unpack<R: Read>(reader: R) -> Result<DecodedContainer, UnpackError> {
    unpack_with(reader, &UnpackOptions::default())
}

pub fn unpack_bytes(data: &[u8], opts: &UnpackOptions) -> Result<DecodedContainer, UnpackError> {
    unpack_with(data, opts)
}

pub fn unpack_with<R: Read>(mut reader: R, opts: &UnpackOptions) -> Result<DecodedContainer, UnpackError> {
    let outer = ContainerHeader::read(&mut reader)?;
    let version = outer.version;

    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;

    let mut signature      = outer.signature;
    let mut start          = 0usize;
    let mut recovered_from = Vec::new();

    loop {
        if signature == Signature::Uncompressed {
            if let Some(candidate) = find_embedded_header(&payload[start..]) {
                if recovered_from.len() >= opts.max_recovery_depth {
                    return Err(UnpackError::RecoveryDepthExceeded {
                        limit: opts.max_recovery_depth,
                    });
                }
                let at = start + candidate.offset;
                let inner = ContainerHeader::read(&payload[at..])?;
                debug!(
                    offset = at + HEADER_SIZE,
                    signature = inner.signature.name(),
                    depth = recovered_from.len() + 1,
                    "following embedded header"
                );
                recovered_from.push(at + HEADER_SIZE);
                signature = inner.signature;
                start     = at + HEADER_SIZE;
                continue;
            }
        }

        let body = get_codec(signature).decode(&payload[start..], opts.max_body_size)?;
        return Ok(DecodedContainer {
            version,
            body,
            source_signature: signature,
            recovered_from,
        });
    }
}
