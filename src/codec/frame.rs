//! Record frame
//!
//! Header layout shared by the codec (which writes frames) and the inspector
//! (which validates frames without knowing the record type).

use crate::error::{Result, StoreError};

/// Magic bytes identifying a LiteStore record frame; the last byte is the
/// frame format version
pub const FRAME_MAGIC: &[u8; 4] = b"LSR1";

/// Header size: Magic (4) + Fingerprint (4) + Len (4) + CRC (4) = 16 bytes
pub const FRAME_HEADER_SIZE: usize = 16;

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub fingerprint: u32,
    pub payload_len: u32,
    pub payload_crc: u32,
}

impl FrameHeader {
    /// Parse and validate the header at the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return Err(StoreError::Decoding(format!(
                "Truncated frame: expected at least {} bytes, got {}",
                FRAME_HEADER_SIZE,
                bytes.len()
            )));
        }

        if &bytes[0..4] != FRAME_MAGIC {
            return Err(StoreError::Decoding(format!(
                "Invalid frame magic: expected LSR1, got {:?}",
                &bytes[0..4]
            )));
        }

        Ok(Self {
            fingerprint: read_u32(&bytes[4..8]),
            payload_len: read_u32(&bytes[8..12]),
            payload_crc: read_u32(&bytes[12..16]),
        })
    }

    /// Parse the header and check it against the whole frame: the length
    /// must match and the payload checksum must hold
    ///
    /// Does not check the fingerprint, so frames of any table pass.
    pub fn verify(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse(bytes)?;

        if bytes.len() != header.frame_len() {
            return Err(StoreError::Decoding(format!(
                "Frame length mismatch: header says {} bytes, got {}",
                header.frame_len(),
                bytes.len()
            )));
        }

        let crc = crc32fast::hash(&bytes[FRAME_HEADER_SIZE..]);
        if crc != header.payload_crc {
            return Err(StoreError::Decoding(format!(
                "Payload checksum mismatch: expected {:#010x}, got {:#010x}",
                header.payload_crc, crc
            )));
        }

        Ok(header)
    }

    /// Total frame size (header + payload)
    pub fn frame_len(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload_len as usize
    }
}

/// Fingerprint of a table name, stored in every frame
pub fn fingerprint(table: &str) -> u32 {
    crc32fast::hash(table.as_bytes())
}

/// Wrap an encoded payload in a frame for `table`
pub(crate) fn seal_frame(table: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| {
        StoreError::Encoding(format!(
            "Record too large: {} bytes (max {})",
            payload.len(),
            u32::MAX
        ))
    })?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.extend_from_slice(FRAME_MAGIC);
    frame.extend_from_slice(&fingerprint(table).to_le_bytes());
    frame.extend_from_slice(&payload_len.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Validate a frame written for `table` and return its payload
pub(crate) fn open_frame<'a>(table: &str, bytes: &'a [u8]) -> Result<&'a [u8]> {
    let header = FrameHeader::parse(bytes)?;

    if header.fingerprint != fingerprint(table) {
        return Err(StoreError::Decoding(format!(
            "Frame belongs to another table (fingerprint {:#010x}, expected {:#010x} for '{}')",
            header.fingerprint,
            fingerprint(table),
            table
        )));
    }

    FrameHeader::verify(bytes)?;
    Ok(&bytes[FRAME_HEADER_SIZE..])
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}
