//! Body codecs for the two legacy container schemes.
//!
//! `FWS` bodies are stored verbatim; `CWS` bodies are a single zlib stream
//! (RFC 1950 framing around DEFLATE).  Nothing else is supported.
//!
//! The compressed payload is buffered in full before inflating.  Inflate
//! runs to end-of-stream or the first error and is never bounded by the
//! declared length in the header.  An optional `limit` turns an oversized
//! body into [`UnpackError::BodyTooLarge`] instead of truncating it.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::UnpackError;
use crate::header::Signature;

pub trait Codec: Send + Sync {
    fn signature(&self) -> Signature;
    fn encode(&self, body: &[u8]) -> Result<Vec<u8>, UnpackError>;
    fn decode(&self, payload: &[u8], limit: Option<usize>) -> Result<Vec<u8>, UnpackError>;
}

pub struct StoredCodec;
impl Codec for StoredCodec {
    fn signature(&self) -> Signature { Signature::Uncompressed }
    fn encode(&self, body: &[u8]) -> Result<Vec<u8>, UnpackError> { Ok(body.to_vec()) }
    fn decode(&self, payload: &[u8], limit: Option<usize>) -> Result<Vec<u8>, UnpackError> {
        check_limit(payload.len(), limit)?;
        Ok(payload.to_vec())
    }
}

pub struct ZlibCodec;
impl Codec for ZlibCodec {
    fn signature(&self) -> Signature { Signature::Compressed }
    fn encode(&self, body: &[u8]) -> Result<Vec<u8>, UnpackError> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(body)?;
        Ok(enc.finish()?)
    }
    fn decode(&self, payload: &[u8], limit: Option<usize>) -> Result<Vec<u8>, UnpackError> {
        let mut out = Vec::new();
        let decoder = ZlibDecoder::new(payload);
        // The source is an in-memory slice, so any error here is a
        // framing/inflate failure rather than an I/O one.
        let res = match limit {
            Some(n) => decoder.take((n as u64).saturating_add(1)).read_to_end(&mut out),
            None    => { let mut d = decoder; d.read_to_end(&mut out) }
        };
        res.map_err(|e| UnpackError::Decompression(e.to_string()))?;
        check_limit(out.len(), limit)?;
        Ok(out)
    }
}

fn check_limit(len: usize, limit: Option<usize>) -> Result<(), UnpackError> {
    match limit {
        Some(limit) if len > limit => Err(UnpackError::BodyTooLarge { limit }),
        _ => Ok(()),
    }
}

pub fn get_codec(signature: Signature) -> Box<dyn Codec> {
    match signature {
        Signature::Uncompressed => Box::new(StoredCodec),
        Signature::Compressed   => Box::new(ZlibCodec),
    }
}

/// Read the rest of `reader` (the bytes after a classified header) and
/// decode it according to `signature`.
pub fn decode_body<R: Read>(
    signature: Signature,
    mut reader: R,
    limit: Option<usize>,
) -> Result<Vec<u8>, UnpackError> {
    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    get_codec(signature).decode(&payload, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_is_passthrough() {
        let body = b"\x00\x01plain body";
        assert_eq!(decode_body(Signature::Uncompressed, &body[..], None).unwrap(), body);
    }

    #[test]
    fn zlib_inflates_whole_stream() {
        let body: Vec<u8> = (0u8..=255).cycle().take(50_000).collect();
        let packed = ZlibCodec.encode(&body).unwrap();
        assert!(packed.len() < body.len());
        assert_eq!(decode_body(Signature::Compressed, &packed[..], None).unwrap(), body);
    }

    #[test]
    fn zlib_rejects_garbage() {
        let err = ZlibCodec.decode(b"this is not zlib data", None).unwrap_err();
        assert!(matches!(err, UnpackError::Decompression(_)), "{:?}", err);
    }

    #[test]
    fn limit_errors_instead_of_truncating() {
        let body = vec![7u8; 1000];
        let packed = ZlibCodec.encode(&body).unwrap();
        assert!(matches!(
            ZlibCodec.decode(&packed, Some(999)),
            Err(UnpackError::BodyTooLarge { limit: 999 })
        ));
        assert_eq!(ZlibCodec.decode(&packed, Some(1000)).unwrap(), body);
        assert!(matches!(
            StoredCodec.decode(&body, Some(10)),
            Err(UnpackError::BodyTooLarge { limit: 10 })
        ));
    }

    #[test]
    fn codec_lookup_matches_signature() {
        for sig in [Signature::Uncompressed, Signature::Compressed] {
            assert_eq!(get_codec(sig).signature(), sig);
        }
    }
}
