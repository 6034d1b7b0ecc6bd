use bytes::{BufMut, BytesMut};

use crate::error::{CodecError, Result};
use crate::reader::Reader;
use crate::varint;

/// Wire byte for `true`; any other byte decodes as `false`.
pub const TRUE_BYTE: u8 = 0xFF;

/// Wire byte written for `false`.
pub const FALSE_BYTE: u8 = 0x00;

/// A value type with a fixed wire encoding.
///
/// Implementations are stateless: encoding only appends to `out`, decoding
/// only advances `reader`. A type implementing `WireValue` can be registered
/// in a [`CodecRegistry`](crate::CodecRegistry) and used as an entity field.
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no wire codec",
    note = "enum fields need `#[wire(ordinal)]` and `#[derive(WireEnum)]`"
)]
pub trait WireValue: Sized + 'static {
    /// Name used in diagnostics and codec listings.
    const TYPE_NAME: &'static str;

    /// Append the encoding of `self` to `out`.
    fn encode(&self, out: &mut BytesMut) -> Result<()>;

    /// Decode a value at the reader's cursor.
    fn decode(reader: &mut Reader<'_>) -> Result<Self>;
}

impl WireValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u8(if *self { TRUE_BYTE } else { FALSE_BYTE });
        Ok(())
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(reader.u8()? == TRUE_BYTE)
    }
}

impl WireValue for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        varint::write_i32(out, *self);
        Ok(())
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        varint::read_i32(reader)
    }
}

impl WireValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        varint::write_i64(out, *self);
        Ok(())
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        varint::read_i64(reader)
    }
}

/// Write a string or array length through the 32-bit varint codec.
pub(crate) fn write_len(out: &mut BytesMut, len: usize) -> Result<()> {
    let len = i32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
    varint::write_i32(out, len);
    Ok(())
}

pub(crate) fn read_len(reader: &mut Reader<'_>) -> Result<usize> {
    let len = varint::read_i32(reader)?;
    usize::try_from(len).map_err(|_| CodecError::NegativeLength(len))
}

impl WireValue for String {
    const TYPE_NAME: &'static str = "String";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        write_len(out, self.len())?;
        out.put_slice(self.as_bytes());
        Ok(())
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let len = read_len(reader)?;
        let bytes = reader.bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

fn encode_elements<T>(
    out: &mut BytesMut,
    items: &[T],
    mut encode: impl FnMut(usize, &T, &mut BytesMut) -> Result<()>,
) -> Result<()> {
    write_len(out, items.len())?;
    for (position, item) in items.iter().enumerate() {
        encode(position, item, out)?;
    }
    Ok(())
}

fn decode_elements<T>(
    reader: &mut Reader<'_>,
    mut decode: impl FnMut(&mut Reader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = read_len(reader)?;
    // every element occupies at least one byte
    let mut items = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        items.push(decode(reader)?);
    }
    Ok(items)
}

impl WireValue for Vec<i32> {
    const TYPE_NAME: &'static str = "Vec<i32>";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        encode_elements(out, self, |_, value, out| value.encode(out))
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        decode_elements(reader, i32::decode)
    }
}

/// Boxed-integer array: elements are individually optional in memory but
/// the wire format has no per-element null marker.
impl WireValue for Vec<Option<i32>> {
    const TYPE_NAME: &'static str = "Vec<Option<i32>>";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        encode_elements(out, self, |position, value, out| match value {
            Some(value) => value.encode(out),
            None => Err(CodecError::AbsentElement(position)),
        })
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        decode_elements(reader, |reader| i32::decode(reader).map(Some))
    }
}

impl WireValue for Vec<String> {
    const TYPE_NAME: &'static str = "Vec<String>";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        encode_elements(out, self, |_, value, out| value.encode(out))
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        decode_elements(reader, String::decode)
    }
}
