use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use bytes::BytesMut;
use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{CodecError, Result};
use crate::ordinal::EnumDescriptor;
use crate::reader::Reader;
use crate::time::TimeValue;
use crate::value::WireValue;

/// Declared type of an entity field, as seen by the registry.
#[derive(Clone, Copy)]
pub enum ValueType {
    /// A concrete value type, looked up by `TypeId`.
    Plain {
        type_id: fn() -> TypeId,
        type_name: &'static str,
    },
    /// Any enum; resolves to the shared enum codec.
    Enum(fn() -> &'static EnumDescriptor),
}

impl ValueType {
    pub fn of<T: 'static>(type_name: &'static str) -> Self {
        Self::Plain {
            type_id: TypeId::of::<T>,
            type_name,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain { type_name, .. } => *type_name,
            Self::Enum(descriptor) => descriptor().name,
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain { type_name, .. } => write!(f, "Plain({type_name})"),
            Self::Enum(descriptor) => write!(f, "Enum({})", descriptor().name),
        }
    }
}

/// Type-erased codec stored in a [`CodecRegistry`].
///
/// `value_type` is the field's declared type; plain codecs ignore it, the
/// enum codec uses it to find the concrete enum.
pub trait Codec: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn encode(&self, value: &dyn Any, value_type: &ValueType, out: &mut BytesMut) -> Result<()>;

    fn decode(&self, value_type: &ValueType, reader: &mut Reader<'_>) -> Result<Box<dyn Any>>;
}

/// Adapts a [`WireValue`] implementation to the erased [`Codec`] seam.
pub struct ValueCodec<T>(PhantomData<fn() -> T>);

impl<T> ValueCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ValueCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: WireValue> Codec for ValueCodec<T> {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn encode(&self, value: &dyn Any, _value_type: &ValueType, out: &mut BytesMut) -> Result<()> {
        value
            .downcast_ref::<T>()
            .ok_or(CodecError::TypeMismatch {
                expected: T::TYPE_NAME,
            })?
            .encode(out)
    }

    fn decode(&self, _value_type: &ValueType, reader: &mut Reader<'_>) -> Result<Box<dyn Any>> {
        Ok(Box::new(T::decode(reader)?))
    }
}

/// The one codec shared by every enum type.
#[derive(Debug, Default)]
pub struct EnumCodec;

impl EnumCodec {
    fn descriptor(value_type: &ValueType) -> Result<&'static EnumDescriptor> {
        match value_type {
            ValueType::Enum(descriptor) => Ok(descriptor()),
            ValueType::Plain { .. } => Err(CodecError::TypeMismatch { expected: "enum" }),
        }
    }
}

impl Codec for EnumCodec {
    fn type_name(&self) -> &'static str {
        "enum"
    }

    fn encode(&self, value: &dyn Any, value_type: &ValueType, out: &mut BytesMut) -> Result<()> {
        let descriptor = Self::descriptor(value_type)?;
        let ordinal = (descriptor.ordinal_of)(value).ok_or(CodecError::TypeMismatch {
            expected: descriptor.name,
        })?;
        descriptor.write_ordinal(ordinal, out)
    }

    fn decode(&self, value_type: &ValueType, reader: &mut Reader<'_>) -> Result<Box<dyn Any>> {
        Self::descriptor(value_type)?.read_constant(reader)
    }
}

/// Type → codec lookup table.
///
/// Built once and handed to encoders and decoders; the table is the only
/// place new field types are added.
pub struct CodecRegistry {
    codecs: HashMap<TypeId, Box<dyn Codec>>,
    enum_codec: EnumCodec,
}

impl CodecRegistry {
    /// Registry with every built-in codec.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<bool>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<String>();
        registry.register::<Vec<i32>>();
        registry.register::<Vec<Option<i32>>>();
        registry.register::<Vec<String>>();
        registry.register::<DateTime<Utc>>();
        registry.register::<TimeDelta>();
        registry.register::<TimeValue>();
        registry
    }

    /// Registry with no plain codecs. Enums always resolve.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
            enum_codec: EnumCodec,
        }
    }

    /// Register the codec of a [`WireValue`] type, replacing any previous one.
    pub fn register<T: WireValue>(&mut self) {
        self.register_codec(TypeId::of::<T>(), Box::new(ValueCodec::<T>::new()));
    }

    /// Register an arbitrary codec for a type id.
    pub fn register_codec(&mut self, type_id: TypeId, codec: Box<dyn Codec>) {
        tracing::trace!(type_name = codec.type_name(), "registered codec");
        self.codecs.insert(type_id, codec);
    }

    /// Resolve the codec for a declared field type.
    pub fn resolve(&self, value_type: &ValueType) -> Result<&dyn Codec> {
        match value_type {
            ValueType::Enum(_) => Ok(&self.enum_codec),
            ValueType::Plain {
                type_id,
                type_name,
            } => self
                .codecs
                .get(&type_id())
                .map(|codec| codec.as_ref())
                .ok_or(CodecError::UnsupportedType(*type_name)),
        }
    }

    /// Check if a plain type has a registered codec.
    pub fn contains<T: 'static>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    /// Names of registered plain codecs, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> =
            self.codecs.values().map(|codec| codec.type_name()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordinal::{erased_constant, erased_ordinal, WireEnum};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Colour {
        Red,
        Green,
    }

    static COLOUR: EnumDescriptor = EnumDescriptor {
        name: "Colour",
        len: 2,
        ordinal_of: erased_ordinal::<Colour>,
        from_ordinal: erased_constant::<Colour>,
    };

    impl WireEnum for Colour {
        fn enum_descriptor() -> &'static EnumDescriptor {
            &COLOUR
        }

        fn ordinal(&self) -> usize {
            *self as usize
        }

        fn from_ordinal(ordinal: usize) -> Option<Self> {
            match ordinal {
                0 => Some(Self::Red),
                1 => Some(Self::Green),
                _ => None,
            }
        }
    }

    #[test]
    fn standard_registry_covers_builtin_types() {
        let registry = CodecRegistry::new();
        assert_eq!(registry.len(), 10);
        assert!(registry.contains::<String>());
        assert!(registry.contains::<Vec<Option<i32>>>());
        assert!(registry.contains::<TimeValue>());
        assert!(!registry.contains::<f64>());
    }

    #[test]
    fn plain_lookup_roundtrips_through_erased_codec() {
        let registry = CodecRegistry::new();
        let value_type = ValueType::of::<i64>("i64");
        let codec = registry.resolve(&value_type).unwrap();

        let mut buf = BytesMut::new();
        codec.encode(&(1i64 << 40), &value_type, &mut buf).unwrap();
        let decoded = codec.decode(&value_type, &mut Reader::new(&buf)).unwrap();
        assert_eq!(decoded.downcast_ref::<i64>(), Some(&(1i64 << 40)));
    }

    #[test]
    fn missing_codec_is_unsupported_type() {
        let registry = CodecRegistry::new();
        let err = registry
            .resolve(&ValueType::of::<f64>("f64"))
            .err()
            .expect("f64 has no codec");
        assert!(matches!(err, CodecError::UnsupportedType("f64")));
    }

    #[test]
    fn enum_lookup_ignores_plain_table() {
        let registry = CodecRegistry::empty();
        let value_type = ValueType::Enum(Colour::enum_descriptor);
        let codec = registry.resolve(&value_type).unwrap();
        assert_eq!(codec.type_name(), "enum");

        let mut buf = BytesMut::new();
        codec.encode(&Colour::Green, &value_type, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), [1]);
        let decoded = codec.decode(&value_type, &mut Reader::new(&buf)).unwrap();
        assert_eq!(decoded.downcast_ref::<Colour>(), Some(&Colour::Green));
    }

    #[test]
    fn codec_rejects_value_of_wrong_type() {
        let registry = CodecRegistry::new();
        let value_type = ValueType::of::<String>("String");
        let codec = registry.resolve(&value_type).unwrap();
        let err = codec
            .encode(&7i32, &value_type, &mut BytesMut::new())
            .unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { expected: "String" }));

        let enum_type = ValueType::Enum(Colour::enum_descriptor);
        let err = registry
            .resolve(&enum_type)
            .unwrap()
            .encode(&7i32, &enum_type, &mut BytesMut::new())
            .unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { expected: "Colour" }));
    }
}
