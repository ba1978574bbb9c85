//! SWF container header: 3-byte signature, version byte, 32-bit LE length.
//!
//! ```text
//! [0..3)  signature   "FWS" (uncompressed) | "CWS" (zlib)
//! [3]     version
//! [4..8)  declared length, u32 LE, includes these 8 bytes
//! [8..)   body
//! ```
//!
//! The declared length is a hint only.  It is never used to bound a read;
//! for `CWS` it is discarded outright.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::UnpackError;

pub const MAGIC_UNCOMPRESSED: &[u8; 3] = b"FWS";
pub const MAGIC_COMPRESSED:   &[u8; 3] = b"CWS";
pub const HEADER_SIZE:        usize    = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Uncompressed,
    Compressed,
}

impl Signature {
    pub fn from_magic(magic: &[u8; 3]) -> Option<Self> {
        match magic {
            m if m == MAGIC_UNCOMPRESSED => Some(Signature::Uncompressed),
            m if m == MAGIC_COMPRESSED   => Some(Signature::Compressed),
            _                            => None,
        }
    }

    pub fn magic(self) -> &'static [u8; 3] {
        match self {
            Signature::Uncompressed => MAGIC_UNCOMPRESSED,
            Signature::Compressed   => MAGIC_COMPRESSED,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Signature::Uncompressed => "FWS",
            Signature::Compressed   => "CWS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub signature: Signature,
    pub version: u8,
    /// Present for `FWS` only.
    pub declared_length: Option<u32>,
}

impl ContainerHeader {
    /// Header of the canonical uncompressed form for a body of `body_len` bytes.
    pub fn canonical(version: u8, body_len: usize) -> Self {
        Self {
            signature: Signature::Uncompressed,
            version,
            declared_length: Some((body_len as u32).wrapping_add(HEADER_SIZE as u32)),
        }
    }

    /// Consume exactly 8 bytes from `reader` and classify them.
    ///
    /// Forward-only: on success the reader is positioned at the first body
    /// byte; on failure an unspecified number of bytes has been consumed.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, UnpackError> {
        let mut magic = [0u8; 3];
        reader.read_exact(&mut magic).map_err(UnpackError::from_header_read)?;
        let signature = Signature::from_magic(&magic)
            .ok_or(UnpackError::InvalidHeader { found: magic })?;
        let version = reader.read_u8().map_err(UnpackError::from_header_read)?;
        let length  = reader.read_u32::<LittleEndian>().map_err(UnpackError::from_header_read)?;
        let declared_length = match signature {
            Signature::Uncompressed => Some(length),
            Signature::Compressed   => None,
        };
        Ok(Self { signature, version, declared_length })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.signature.magic())?;
        writer.write_u8(self.version)?;
        writer.write_u32::<LittleEndian>(self.declared_length.unwrap_or(0))?;
        Ok(())
    }
}

/// Free-function form of [`ContainerHeader::read`].
pub fn classify<R: Read>(reader: R) -> Result<ContainerHeader, UnpackError> {
    ContainerHeader::read(reader)
}
