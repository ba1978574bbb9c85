//! Canonical uncompressed container output.
//!
//! Output is always `FWS`, whatever the input scheme.  The length field is
//! computed from the body actually written, never copied from the input.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::header::{ContainerHeader, HEADER_SIZE};
use crate::recovery::DecodedContainer;

/// Permission bits for created outputs (read-only for everyone).
pub const OUTPUT_MODE: u32 = 0o444;

pub fn repack(version: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
    // Writing into a Vec cannot fail.
    let _ = write_container(&mut out, version, body);
    out
}

pub fn write_container<W: Write>(mut writer: W, version: u8, body: &[u8]) -> io::Result<()> {
    ContainerHeader::canonical(version, body.len()).write(&mut writer)?;
    writer.write_all(body)
}

impl DecodedContainer {
    pub fn repack(&self) -> Vec<u8> {
        repack(self.version, &self.body)
    }
}

/// Create `path` and write the canonical container with a single
/// `write_all`.  The handle is closed on return, success or not.  A
/// partially written file is left in place on error.
pub fn write_output(path: &Path, container: &DecodedContainer) -> io::Result<()> {
    let bytes = container.repack();
    let mut file = create_output(path)?;
    file.write_all(&bytes)?;
    file.flush()
}

fn create_output(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(OUTPUT_MODE);
    }
    opts.open(path)
}
