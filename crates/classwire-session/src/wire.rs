//! Entity framing on the wire.
//!
//! ```text
//! ┌───────────┬──────────────┬─────────────┬─────────────────────────┬──────┐
//! │ signature │ class name   │ version tag │ field index + value ... │ 0    │
//! │ (1B)      │ (string)     │ (i64 varint)│ (1-2B BE + codec bytes) │(1-2B)│
//! │           │ new only     │ new only    │                         │      │
//! └───────────┴──────────────┴─────────────┴─────────────────────────┴──────┘
//! ```
//!
//! Signature bit 7 set announces a new class at the index in bits 0-6; clear
//! refers to a class announced earlier in the session.

use bytes::{BufMut, BytesMut};
use classwire_codec::{Reader, Result};

/// Signature bit marking a class announcement.
pub const NEW_CLASS_FLAG: u8 = 0x80;

/// Signature bits holding the class index.
pub const CLASS_INDEX_MASK: u8 = 0x7F;

/// Class references per session side.
pub const CLASS_CACHE_CAPACITY: usize = 128;

/// Field index that ends an entity.
pub const FIELD_TERMINATOR: u16 = 0;

/// Decoded signature byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// The class was announced earlier at this index.
    Cached(u8),
    /// A class descriptor follows and takes this index.
    New(u8),
}

impl Signature {
    pub fn from_byte(byte: u8) -> Self {
        let index = byte & CLASS_INDEX_MASK;
        if byte & NEW_CLASS_FLAG != 0 {
            Self::New(index)
        } else {
            Self::Cached(index)
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Cached(index) => index & CLASS_INDEX_MASK,
            Self::New(index) => (index & CLASS_INDEX_MASK) | NEW_CLASS_FLAG,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Cached(index) | Self::New(index) => index,
        }
    }
}

/// Write a field index as `width` big-endian bytes.
pub fn write_field_index(out: &mut BytesMut, index: u16, width: usize) {
    if width == 1 {
        out.put_u8(index as u8);
    } else {
        out.put_u16(index);
    }
}

/// Read a field index of `width` big-endian bytes.
pub fn read_field_index(reader: &mut Reader<'_>, width: usize) -> Result<u16> {
    if width == 1 {
        Ok(u16::from(reader.u8()?))
    } else {
        reader.u16_be()
    }
}
