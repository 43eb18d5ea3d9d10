//! Codec Module
//!
//! Turns records into byte sequences and back.
//!
//! ## Record Frame
//! Every encoded record is wrapped in a small self-describing frame so that a
//! byte slice read back from a data file can be validated without any
//! external metadata:
//! ```text
//! ┌──────────┬──────────────────┬──────────┬──────────┬─────────────┐
//! │Magic (4) │ Fingerprint (4)  │ Len (4)  │ CRC (4)  │   Payload   │
//! └──────────┴──────────────────┴──────────┴──────────┴─────────────┘
//! ```
//! - Magic: `LSR1`, the trailing `1` is the frame format version
//! - Fingerprint: CRC32 of the table name, rejects records of another table
//! - Len / CRC: length and CRC32 of the payload
//!
//! All integers are little endian.

mod bincode_codec;
mod frame;

pub use bincode_codec::BincodeCodec;
pub use frame::{fingerprint, FrameHeader, FRAME_HEADER_SIZE, FRAME_MAGIC};

pub(crate) use bincode_codec::bincode_options;
pub(crate) use frame::{open_frame, seal_frame};

use crate::error::Result;
use crate::record::Record;

/// Encodes records to bytes and decodes them back
///
/// Implementations must be stateless between calls: the same codec value is
/// shared by every reader and writer of a table.
pub trait Codec: Clone + Send + Sync + 'static {
    /// Encode a record into a self-describing byte sequence
    fn encode<R: Record>(&self, record: &R) -> Result<Vec<u8>>;

    /// Decode a record of type `R` from bytes produced by [`Codec::encode`]
    ///
    /// Fails with `Decoding` if the bytes are truncated, malformed, or were
    /// written for a different table.
    fn decode<R: Record>(&self, bytes: &[u8]) -> Result<R>;
}
