//! Bincode codec
//!
//! Compact binary encoding via bincode, wrapped in a record frame.

use bincode::Options;

use crate::error::{Result, StoreError};
use crate::record::Record;

use super::{open_frame, seal_frame, Codec};

/// Bincode options used for everything LiteStore writes
///
/// Varint integers, little endian, and trailing bytes are an error so a
/// payload that decodes "successfully" but leaves garbage behind is rejected.
pub(crate) fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_varint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Default codec: bincode payload inside a record frame
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl BincodeCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for BincodeCodec {
    fn encode<R: Record>(&self, record: &R) -> Result<Vec<u8>> {
        let payload = bincode_options()
            .serialize(record)
            .map_err(|e| StoreError::Encoding(format!("{} record: {}", R::TABLE, e)))?;

        seal_frame(R::TABLE, &payload)
    }

    fn decode<R: Record>(&self, bytes: &[u8]) -> Result<R> {
        let payload = open_frame(R::TABLE, bytes)?;

        bincode_options()
            .deserialize(payload)
            .map_err(|e| StoreError::Decoding(format!("{} record: {}", R::TABLE, e)))
    }
}
