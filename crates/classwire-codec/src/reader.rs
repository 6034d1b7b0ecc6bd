use crate::error::{CodecError, Result};

/// Read cursor over an immutable input buffer.
///
/// A reader is owned by exactly one decode call; every read checks the
/// remaining length and fails with [`CodecError::UnexpectedEof`] instead of
/// panicking on a truncated buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns true once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Read one byte.
    #[inline]
    pub fn u8(&mut self) -> Result<u8> {
        let byte = *self.buf.get(self.pos).ok_or(CodecError::UnexpectedEof {
            needed: 1,
            remaining: 0,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read a big-endian `u16`.
    pub fn u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    /// Read a big-endian `u32`.
    pub fn u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    /// Read a big-endian `u64`.
    pub fn u64_be(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    /// Accumulate the next `len` bytes (at most 8) as a big-endian integer.
    pub fn uint_be(&mut self, len: usize) -> Result<u64> {
        debug_assert!(len <= 8);
        Ok(self
            .bytes(len)?
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_the_cursor() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = Reader::new(&data);

        assert_eq!(reader.u8().unwrap(), 0x01);
        assert_eq!(reader.u16_be().unwrap(), 0x0203);
        assert_eq!(reader.u32_be().unwrap(), 0x0405_0607);
        assert!(reader.is_empty());
        assert_eq!(reader.position(), 7);
    }

    #[test]
    fn uint_be_accumulates_partial_width() {
        let data = [0xAB, 0xCD, 0xEF];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.uint_be(3).unwrap(), 0x00AB_CDEF);
    }

    #[test]
    fn underrun_reports_needed_and_remaining() {
        let data = [0x01, 0x02];
        let mut reader = Reader::new(&data);
        let err = reader.u32_be().unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedEof {
                needed: 4,
                remaining: 2
            }
        ));
        // failed reads do not move the cursor
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn empty_buffer_u8_fails() {
        let mut reader = Reader::new(&[]);
        assert!(matches!(
            reader.u8(),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }
}
