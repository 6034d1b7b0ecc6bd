use std::sync::Arc;

use classwire_codec::{varint, CodecRegistry, Entity, EntityDescriptor, EntityType, Reader, WireValue};

use crate::cache::ReferenceTable;
use crate::catalog::Catalog;
use crate::config::DecoderConfig;
use crate::error::{DecodeError, DecodeResult};
use crate::wire::{read_field_index, Signature, FIELD_TERMINATOR};

/// Rebuilds entities from buffers produced by an [`Encoder`](crate::Encoder).
///
/// Class announcements are remembered across calls, matching an encoder that
/// keeps its references between flushes.
#[derive(Debug)]
pub struct Decoder {
    registry: Arc<CodecRegistry>,
    catalog: Arc<Catalog>,
    config: DecoderConfig,
    references: ReferenceTable,
}

impl Decoder {
    pub fn new(registry: Arc<CodecRegistry>, catalog: Arc<Catalog>) -> Self {
        Self::with_config(registry, catalog, DecoderConfig::default())
    }

    pub fn with_config(
        registry: Arc<CodecRegistry>,
        catalog: Arc<Catalog>,
        config: DecoderConfig,
    ) -> Self {
        Self {
            registry,
            catalog,
            config,
            references: ReferenceTable::new(),
        }
    }

    /// Decode every entity in `bytes`, in stream order.
    ///
    /// Fails as a whole: a malformed entity anywhere in the buffer discards
    /// the entities decoded before it.
    pub fn decode(&mut self, bytes: &[u8]) -> DecodeResult<Vec<Box<dyn Entity>>> {
        let mut reader = Reader::new(bytes);
        let result = self.decode_all(&mut reader);
        if self.config.auto_reset {
            self.reset_class_references();
        }
        if let Ok(entities) = &result {
            tracing::debug!(bytes = bytes.len(), entities = entities.len(), "decoded buffer");
        }
        result
    }

    /// Decode a buffer holding only entities of type `T`.
    pub fn decode_as<T: EntityType>(&mut self, bytes: &[u8]) -> DecodeResult<Vec<T>> {
        let expected = T::entity_descriptor().name;
        self.decode(bytes)?
            .into_iter()
            .map(|entity| {
                let found = entity.descriptor().name;
                entity
                    .downcast::<T>()
                    .map(|boxed| *boxed)
                    .map_err(|_| DecodeError::UnexpectedClass { expected, found })
            })
            .collect()
    }

    /// Forget every announced class.
    pub fn reset_class_references(&mut self) {
        tracing::debug!(classes = self.references.len(), "reset decoder class references");
        self.references.clear();
    }

    pub fn set_auto_reset(&mut self, auto_reset: bool) {
        self.config.auto_reset = auto_reset;
    }

    pub fn auto_reset(&self) -> bool {
        self.config.auto_reset
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    fn decode_all(&mut self, reader: &mut Reader<'_>) -> DecodeResult<Vec<Box<dyn Entity>>> {
        let mut entities = Vec::new();
        while !reader.is_empty() {
            if entities.len() >= self.config.max_entities {
                return Err(DecodeError::TooManyEntities {
                    max: self.config.max_entities,
                });
            }
            entities.push(self.decode_entity(reader)?);
        }
        Ok(entities)
    }

    fn decode_entity(&mut self, reader: &mut Reader<'_>) -> DecodeResult<Box<dyn Entity>> {
        let descriptor = self.read_signature(reader)?;
        let class = descriptor.name;
        let mut entity = descriptor
            .instantiate()
            .ok_or(DecodeError::NotConstructible { class })?;

        let width = descriptor.field_index_width();
        loop {
            let offset = reader.position();
            let index = read_field_index(reader, width)
                .map_err(|source| DecodeError::Malformed { offset, source })?;
            if index == FIELD_TERMINATOR {
                break;
            }

            let field = descriptor
                .field(usize::from(index))
                .ok_or(DecodeError::UnknownField { class, index })?;
            if field.transient {
                return Err(DecodeError::TransientField {
                    class,
                    field: field.name,
                });
            }
            let codec = self
                .registry
                .resolve(&field.value_type)
                .map_err(|source| DecodeError::UnsupportedField {
                    class,
                    field: field.name,
                    source,
                })?;

            let field_error = |source| DecodeError::Field {
                class,
                field: field.name,
                source,
            };
            let value = codec.decode(&field.value_type, reader).map_err(field_error)?;
            (field.set)(entity.as_mut(), value).map_err(field_error)?;
            tracing::trace!(class, field = field.name, index, "decoded field");
        }
        Ok(entity)
    }

    /// Read a signature byte and, for announcements, the class header.
    fn read_signature(&mut self, reader: &mut Reader<'_>) -> DecodeResult<&'static EntityDescriptor> {
        let offset = reader.position();
        let malformed = |source| DecodeError::Malformed { offset, source };
        let byte = reader.u8().map_err(malformed)?;

        match Signature::from_byte(byte) {
            Signature::Cached(index) => self
                .references
                .get(index)
                .ok_or(DecodeError::UnknownClassReference { index, offset }),
            Signature::New(index) => {
                let name = String::decode(reader).map_err(malformed)?;
                let version = varint::read_i64(reader).map_err(malformed)?;

                let descriptor = self
                    .catalog
                    .resolve(&name)
                    .ok_or(DecodeError::UnknownClass { name })?;
                if descriptor.version != version {
                    return Err(DecodeError::VersionMismatch {
                        class: descriptor.name,
                        expected: descriptor.version,
                        found: version,
                    });
                }

                if let Some(previous) = self.references.insert(index, descriptor) {
                    if !std::ptr::eq(previous, descriptor) {
                        tracing::debug!(
                            index,
                            previous = previous.name,
                            class = descriptor.name,
                            "class reference reassigned"
                        );
                    }
                }
                tracing::debug!(index, class = descriptor.name, version, "class announced");
                Ok(descriptor)
            }
        }
    }
}
