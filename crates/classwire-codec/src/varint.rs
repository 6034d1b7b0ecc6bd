//! Variable-length bit-packed codecs for signed 32-bit and 64-bit integers.
//!
//! The first byte carries a tier selector in its top bits (2 bits for `i32`,
//! 3 bits for `i64`) and the high-order payload bits in the rest. Each tier
//! adds one big-endian continuation byte. In-band tiers hold two's complement
//! values and are sign-extended on decode.
//!
//! ```text
//! i32  00pppppp                              6 bits
//!      01pppppp b1                           14 bits
//!      10pppppp b1 b2                        22 bits
//!      11pppppp b1 b2 b3      (pppppp != 0)  30 bits
//!      11000000 b1 b2 b3 b4                  literal 32 bits
//!
//! i64  000ppppp ..                           5 bits + 8 per byte, up to 110 (53 bits)
//!      111ppppp b1..b7        (ppppp != 0)   61 bits
//!      11100000 b1..b8                       literal 64 bits
//! ```
//!
//! The last selector is shared by two forms: a zero payload in the first
//! byte marks the literal form, so the in-band form is only used when the
//! high payload bits are nonzero.

use bytes::{BufMut, BytesMut};

use crate::error::Result;
use crate::reader::Reader;

/// Longest encoding of an `i32`.
pub const MAX_I32_LEN: usize = 5;

/// Longest encoding of an `i64`.
pub const MAX_I64_LEN: usize = 9;

const I32_SELECTOR_SHIFT: u32 = 6;
const I32_PAYLOAD_MASK: u8 = 0x3F;
const I32_LITERAL_MARKER: u8 = 0xC0;

const I64_SELECTOR_SHIFT: u32 = 5;
const I64_PAYLOAD_MASK: u8 = 0x1F;
const I64_LITERAL_MARKER: u8 = 0xE0;

/// Number of bits needed to hold `value` in two's complement, sign included.
fn signed_bits_i32(value: i32) -> u32 {
    33 - (value ^ (value >> 31)).leading_zeros()
}

fn signed_bits_i64(value: i64) -> u32 {
    65 - (value ^ (value >> 63)).leading_zeros()
}

fn sign_extend(raw: u64, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((raw << shift) as i64) >> shift
}

/// Number of bytes [`write_i32`] emits for `value`.
pub fn encoded_len_i32(value: i32) -> usize {
    let bits = signed_bits_i32(value);
    if bits <= 22 {
        return 1 + (bits.saturating_sub(6) as usize).div_ceil(8);
    }
    let high = ((value as u32) >> 24) as u8 & I32_PAYLOAD_MASK;
    if bits <= 30 && high != 0 {
        4
    } else {
        MAX_I32_LEN
    }
}

/// Number of bytes [`write_i64`] emits for `value`.
pub fn encoded_len_i64(value: i64) -> usize {
    let bits = signed_bits_i64(value);
    if bits <= 53 {
        return 1 + (bits.saturating_sub(5) as usize).div_ceil(8);
    }
    let high = ((value as u64) >> 56) as u8 & I64_PAYLOAD_MASK;
    if bits <= 61 && high != 0 {
        8
    } else {
        MAX_I64_LEN
    }
}

fn put_in_band(out: &mut BytesMut, raw: u64, extra: usize, selector_shift: u32, mask: u8) {
    let first = ((extra as u8) << selector_shift) | ((raw >> (8 * extra)) as u8 & mask);
    out.put_u8(first);
    for i in (0..extra).rev() {
        out.put_u8((raw >> (8 * i)) as u8);
    }
}

/// Append the variable-length encoding of an `i32`.
pub fn write_i32(out: &mut BytesMut, value: i32) {
    let len = encoded_len_i32(value);
    if len == MAX_I32_LEN {
        out.reserve(MAX_I32_LEN);
        out.put_u8(I32_LITERAL_MARKER);
        out.put_u32(value as u32);
        return;
    }
    put_in_band(
        out,
        u64::from(value as u32),
        len - 1,
        I32_SELECTOR_SHIFT,
        I32_PAYLOAD_MASK,
    );
}

/// Append the variable-length encoding of an `i64`.
pub fn write_i64(out: &mut BytesMut, value: i64) {
    let len = encoded_len_i64(value);
    if len == MAX_I64_LEN {
        out.reserve(MAX_I64_LEN);
        out.put_u8(I64_LITERAL_MARKER);
        out.put_u64(value as u64);
        return;
    }
    put_in_band(
        out,
        value as u64,
        len - 1,
        I64_SELECTOR_SHIFT,
        I64_PAYLOAD_MASK,
    );
}

/// Read a variable-length `i32`.
pub fn read_i32(reader: &mut Reader<'_>) -> Result<i32> {
    let first = reader.u8()?;
    let extra = usize::from(first >> I32_SELECTOR_SHIFT);
    let payload = first & I32_PAYLOAD_MASK;
    if extra == 3 && payload == 0 {
        return Ok(reader.u32_be()? as i32);
    }
    let raw = (u64::from(payload) << (8 * extra)) | reader.uint_be(extra)?;
    Ok(sign_extend(raw, 6 + 8 * extra as u32) as i32)
}

/// Read a variable-length `i64`.
pub fn read_i64(reader: &mut Reader<'_>) -> Result<i64> {
    let first = reader.u8()?;
    let extra = usize::from(first >> I64_SELECTOR_SHIFT);
    let payload = first & I64_PAYLOAD_MASK;
    if extra == 7 && payload == 0 {
        return Ok(reader.u64_be()? as i64);
    }
    let raw = (u64::from(payload) << (8 * extra)) | reader.uint_be(extra)?;
    Ok(sign_extend(raw, 5 + 8 * extra as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    fn enc32(value: i32) -> Vec<u8> {
        let mut buf = BytesMut::new();
        write_i32(&mut buf, value);
        buf.to_vec()
    }

    fn enc64(value: i64) -> Vec<u8> {
        let mut buf = BytesMut::new();
        write_i64(&mut buf, value);
        buf.to_vec()
    }

    fn dec32(bytes: &[u8]) -> i32 {
        let mut reader = Reader::new(bytes);
        let value = read_i32(&mut reader).unwrap();
        assert!(reader.is_empty(), "trailing bytes after {value}");
        value
    }

    fn dec64(bytes: &[u8]) -> i64 {
        let mut reader = Reader::new(bytes);
        let value = read_i64(&mut reader).unwrap();
        assert!(reader.is_empty(), "trailing bytes after {value}");
        value
    }

    #[test]
    fn i32_tier_boundaries() {
        let cases: &[(i32, usize)] = &[
            (0, 1),
            (1, 1),
            (-1, 1),
            (31, 1),
            (-32, 1),
            (32, 2),
            (63, 2),
            (64, 2),
            (8191, 2),
            (-8192, 2),
            (8192, 3),
            ((1 << 21) - 1, 3),
            (-(1 << 21), 3),
            // top payload bits would be zero: literal form
            (1 << 21, 5),
            ((1 << 24) - 1, 5),
            (1 << 24, 4),
            ((1 << 29) - 1, 4),
            (-(1 << 21) - 1, 4),
            (-(1 << 29), 4),
            (1 << 29, 5),
            (-(1 << 29) - 1, 5),
            (i32::MIN, 5),
            (i32::MAX, 5),
        ];

        for &(value, len) in cases {
            let bytes = enc32(value);
            assert_eq!(bytes.len(), len, "length for {value}");
            assert_eq!(encoded_len_i32(value), len, "encoded_len for {value}");
            assert_eq!(dec32(&bytes), value);
        }
    }

    #[test]
    fn i32_exact_bytes() {
        assert_eq!(enc32(0), [0x00]);
        assert_eq!(enc32(-1), [0x3F]);
        assert_eq!(enc32(-32), [0x20]);
        assert_eq!(enc32(32), [0x40, 0x20]);
        assert_eq!(enc32(8191), [0x5F, 0xFF]);
        assert_eq!(enc32(8192), [0x80, 0x20, 0x00]);
        assert_eq!(enc32(1 << 24), [0xC1, 0x00, 0x00, 0x00]);
        assert_eq!(enc32(1 << 21), [0xC0, 0x00, 0x20, 0x00, 0x00]);
        assert_eq!(enc32(i32::MIN), [0xC0, 0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn i64_tier_boundaries() {
        let cases: &[(i64, usize)] = &[
            (0, 1),
            (-1, 1),
            (15, 1),
            (-16, 1),
            (1 << 4, 2),
            (1 << 11, 2),
            (1 << 18, 3),
            (1 << 25, 4),
            (1 << 32, 5),
            (1 << 39, 6),
            (1 << 46, 7),
            ((1 << 52) - 1, 7),
            (-(1 << 52), 7),
            (1 << 53, 9),
            (1 << 56, 8),
            ((1 << 60) - 1, 8),
            (-(1 << 60), 8),
            (1 << 60, 9),
            (i64::MIN, 9),
            (i64::MAX, 9),
        ];

        for &(value, len) in cases {
            let bytes = enc64(value);
            assert_eq!(bytes.len(), len, "length for {value}");
            assert_eq!(encoded_len_i64(value), len, "encoded_len for {value}");
            assert_eq!(dec64(&bytes), value);
        }
    }

    #[test]
    fn i64_exact_bytes() {
        assert_eq!(enc64(-1), [0x1F]);
        assert_eq!(enc64(16), [0x20, 0x10]);
        assert_eq!(enc64(1 << 56), [0xE1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(enc64(i64::MAX)[0], I64_LITERAL_MARKER);
        assert_eq!(enc64(i64::MAX)[1..], i64::MAX.to_be_bytes());
    }

    #[test]
    fn no_tier_inflation() {
        let mut values = Vec::new();
        for shift in 0..63 {
            let base = 1i64 << shift;
            values.extend([base - 1, base, base + 1, -base, -base - 1]);
        }
        values.extend([i64::MIN, i64::MAX]);

        for value in values {
            let bits = signed_bits_i64(value);
            let len = encoded_len_i64(value);
            if len > 1 && len < MAX_I64_LEN {
                assert!(bits > 5 + 8 * (len as u32 - 2), "{value} fits a smaller tier");
            }
            if len == MAX_I64_LEN {
                let high = ((value as u64) >> 56) as u8 & I64_PAYLOAD_MASK;
                assert!(bits > 53 && (bits > 61 || high == 0), "{value} inflated");
            }

            if let Ok(small) = i32::try_from(value) {
                let bits = signed_bits_i32(small);
                let len = encoded_len_i32(small);
                if len > 1 && len < MAX_I32_LEN {
                    assert!(bits > 6 + 8 * (len as u32 - 2), "{small} fits a smaller tier");
                }
                if len == MAX_I32_LEN {
                    let high = ((small as u32) >> 24) as u8 & I32_PAYLOAD_MASK;
                    assert!(bits > 22 && (bits > 30 || high == 0), "{small} inflated");
                }
                assert_eq!(dec32(&enc32(small)), small);
            }
            assert_eq!(dec64(&enc64(value)), value);
        }
    }

    #[test]
    fn truncated_continuation_fails() {
        let bytes = enc32(8192);
        let mut reader = Reader::new(&bytes[..2]);
        assert!(matches!(
            read_i32(&mut reader),
            Err(CodecError::UnexpectedEof { .. })
        ));

        let bytes = enc64(i64::MIN);
        let mut reader = Reader::new(&bytes[..5]);
        assert!(matches!(
            read_i64(&mut reader),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }
}
