pub mod error;
pub mod header;
pub mod codec;
pub mod recovery;
pub mod repack;
pub mod filter;
pub mod batch;

pub use error::UnpackError;
pub use header::{ContainerHeader, Signature, classify};
pub use codec::{Codec, get_codec, decode_body};
pub use recovery::{DecodedContainer, UnpackOptions, unpack, unpack_with, unpack_bytes};
pub use repack::repack;
pub use filter::{should_exclude, decode_pattern};
