//! Enum support. Enums travel as their ordinal: one byte when the enum has
//! at most 256 constants, two big-endian bytes otherwise.

use std::any::Any;

use bytes::{BufMut, BytesMut};

use crate::error::{CodecError, Result};
use crate::reader::Reader;

/// Largest constant count that still fits a one-byte ordinal.
pub const ONE_BYTE_ORDINAL_LIMIT: usize = 256;

/// Largest constant count a two-byte ordinal can address.
pub const MAX_CONSTANTS: usize = 1 << 16;

/// Type-erased view of an enum's constants.
///
/// Generated by `#[derive(WireEnum)]`; the enum codec receives it at
/// encode/decode time to pick the concrete enum.
#[derive(Debug)]
pub struct EnumDescriptor {
    pub name: &'static str,
    /// Number of constants.
    pub len: usize,
    /// Ordinal of a value, `None` when the value is not of this enum.
    pub ordinal_of: fn(&dyn Any) -> Option<usize>,
    /// Constant at `ordinal`, boxed.
    pub from_ordinal: fn(usize) -> Option<Box<dyn Any>>,
}

impl EnumDescriptor {
    /// Bytes used per ordinal.
    pub fn ordinal_width(&self) -> usize {
        if self.len <= ONE_BYTE_ORDINAL_LIMIT {
            1
        } else {
            2
        }
    }

    pub fn write_ordinal(&self, ordinal: usize, out: &mut BytesMut) -> Result<()> {
        if self.len > MAX_CONSTANTS {
            return Err(CodecError::TooManyConstants {
                name: self.name,
                len: self.len,
            });
        }
        if ordinal >= self.len {
            return Err(self.out_of_range(ordinal));
        }
        match self.ordinal_width() {
            1 => out.put_u8(ordinal as u8),
            _ => out.put_u16(ordinal as u16),
        }
        Ok(())
    }

    pub fn read_ordinal(&self, reader: &mut Reader<'_>) -> Result<usize> {
        let ordinal = match self.ordinal_width() {
            1 => usize::from(reader.u8()?),
            _ => usize::from(reader.u16_be()?),
        };
        if ordinal >= self.len {
            return Err(self.out_of_range(ordinal));
        }
        Ok(ordinal)
    }

    /// Decode an ordinal and box the matching constant.
    pub fn read_constant(&self, reader: &mut Reader<'_>) -> Result<Box<dyn Any>> {
        let ordinal = self.read_ordinal(reader)?;
        (self.from_ordinal)(ordinal).ok_or_else(|| self.out_of_range(ordinal))
    }

    fn out_of_range(&self, ordinal: usize) -> CodecError {
        CodecError::OrdinalOutOfRange {
            name: self.name,
            ordinal,
            len: self.len,
        }
    }
}

/// A fieldless enum whose constants can be addressed by ordinal.
///
/// Usually derived with `#[derive(WireEnum)]`; ordinals follow declaration
/// order starting at 0.
pub trait WireEnum: Sized + 'static {
    fn enum_descriptor() -> &'static EnumDescriptor;

    fn ordinal(&self) -> usize;

    fn from_ordinal(ordinal: usize) -> Option<Self>;
}

/// Erased ordinal lookup for use in an [`EnumDescriptor`].
pub fn erased_ordinal<E: WireEnum>(value: &dyn Any) -> Option<usize> {
    value.downcast_ref::<E>().map(WireEnum::ordinal)
}

/// Erased constant lookup for use in an [`EnumDescriptor`].
pub fn erased_constant<E: WireEnum>(ordinal: usize) -> Option<Box<dyn Any>> {
    E::from_ordinal(ordinal).map(|value| Box::new(value) as Box<dyn Any>)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in for an enum with an arbitrary number of constants.
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Constant<const N: usize>(usize);

    impl<const N: usize> WireEnum for Constant<N> {
        fn enum_descriptor() -> &'static EnumDescriptor {
            // a static cannot depend on `N`
            Box::leak(Box::new(EnumDescriptor {
                name: "Constant",
                len: N,
                ordinal_of: erased_ordinal::<Self>,
                from_ordinal: erased_constant::<Self>,
            }))
        }

        fn ordinal(&self) -> usize {
            self.0
        }

        fn from_ordinal(ordinal: usize) -> Option<Self> {
            (ordinal < N).then_some(Self(ordinal))
        }
    }

    fn roundtrip<const N: usize>(ordinal: usize) -> Vec<u8> {
        let descriptor = Constant::<N>::enum_descriptor();
        let mut buf = BytesMut::new();
        descriptor.write_ordinal(ordinal, &mut buf).unwrap();
        let mut reader = Reader::new(&buf);
        let value = descriptor.read_constant(&mut reader).unwrap();
        assert_eq!(value.downcast_ref::<Constant<N>>(), Some(&Constant(ordinal)));
        assert!(reader.is_empty());
        buf.to_vec()
    }

    #[test]
    fn ordinal_width_switches_above_256_constants() {
        assert_eq!(roundtrip::<3>(2), [2]);
        assert_eq!(roundtrip::<255>(254), [254]);
        assert_eq!(roundtrip::<256>(0), [0]);
        assert_eq!(roundtrip::<256>(255), [255]);
        assert_eq!(roundtrip::<257>(0), [0, 0]);
        assert_eq!(roundtrip::<257>(255), [0, 255]);
        assert_eq!(roundtrip::<257>(256), [1, 0]);
        assert_eq!(roundtrip::<65536>(65535), [0xFF, 0xFF]);
    }

    #[test]
    fn ordinal_out_of_range_rejected_both_ways() {
        let descriptor = Constant::<4>::enum_descriptor();
        let mut buf = BytesMut::new();
        assert!(matches!(
            descriptor.write_ordinal(4, &mut buf),
            Err(CodecError::OrdinalOutOfRange { ordinal: 4, .. })
        ));

        let mut reader = Reader::new(&[9]);
        assert!(matches!(
            descriptor.read_ordinal(&mut reader),
            Err(CodecError::OrdinalOutOfRange { ordinal: 9, len: 4, .. })
        ));
    }

    #[test]
    fn erased_ordinal_rejects_foreign_values() {
        assert_eq!(erased_ordinal::<Constant<4>>(&Constant::<4>(3)), Some(3));
        assert_eq!(erased_ordinal::<Constant<4>>(&"not an enum"), None);
    }
}
