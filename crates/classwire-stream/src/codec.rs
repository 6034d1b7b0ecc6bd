use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, StreamError};

/// Batch header: magic (2) + length (4) = 6 bytes.
pub const HEADER_SIZE: usize = 6;

/// Magic bytes: "CW" (0x43 0x57).
pub const MAGIC: [u8; 2] = [0x43, 0x57];

/// Default maximum batch payload: 16 MiB.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 16 * 1024 * 1024;

/// Frame one encoded batch.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬──────────────────────────┐
/// │ Magic (2B)   │ Length    │ Payload                  │
/// │ 0x43 0x57    │ (4B LE)   │ (encoder output)         │
/// │ "CW"         │           │                          │
/// └──────────────┴───────────┴──────────────────────────┘
/// ```
pub fn encode_batch(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(StreamError::BatchTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Take one framed batch payload off the front of `src`.
///
/// Returns `Ok(None)` while the buffer holds less than a whole batch.
pub fn decode_batch(src: &mut BytesMut, max_batch_size: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }
    if src[..2] != MAGIC {
        return Err(StreamError::InvalidMagic);
    }

    let len = u32::from_le_bytes([src[2], src[3], src[4], src[5]]) as usize;
    if len > max_batch_size {
        return Err(StreamError::BatchTooLarge {
            size: len,
            max: max_batch_size,
        });
    }
    if src.len() < HEADER_SIZE + len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(len).freeze()))
}

/// Configuration for batch framing.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Maximum batch payload in bytes. Default: 16 MiB.
    pub max_batch_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}
