use std::collections::HashSet;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use classwire_codec::{varint, CodecRegistry, Entity, EntityDescriptor, WireValue, MAX_FIELDS};

use crate::cache::ClassCache;
use crate::config::EncoderConfig;
use crate::error::{EncodeError, EncodeResult};
use crate::wire::{write_field_index, Signature, FIELD_TERMINATOR};

/// Accumulates entities into one output buffer.
///
/// The first occurrence of a class in a session carries its name and version
/// tag; later occurrences refer to it by a one-byte index. Entities appended
/// after [`get_encoded_and_reset`](Self::get_encoded_and_reset) keep using the
/// indices already announced unless the class references are reset, so the
/// decoding side must see every buffer of a session in order.
#[derive(Debug)]
pub struct Encoder {
    registry: Arc<CodecRegistry>,
    config: EncoderConfig,
    cache: ClassCache,
    /// Classes whose field tables passed validation.
    validated: HashSet<&'static str>,
    buf: BytesMut,
    /// Field bytes of the entity being appended.
    scratch: BytesMut,
    pending: usize,
}

impl Encoder {
    pub fn new(registry: Arc<CodecRegistry>) -> Self {
        Self::with_config(registry, EncoderConfig::default())
    }

    pub fn with_config(registry: Arc<CodecRegistry>, config: EncoderConfig) -> Self {
        Self {
            registry,
            buf: BytesMut::with_capacity(config.initial_capacity),
            config,
            cache: ClassCache::new(),
            validated: HashSet::new(),
            scratch: BytesMut::new(),
            pending: 0,
        }
    }

    /// Encode one entity at the end of the buffer.
    ///
    /// On error nothing is written and the class references are unchanged.
    pub fn append(&mut self, entity: &dyn Entity) -> EncodeResult<()> {
        let descriptor = entity.descriptor();
        self.validate(descriptor)?;

        self.scratch.clear();
        encode_fields(&self.registry, entity, descriptor, &mut self.scratch)?;

        let mark = self.buf.len();
        match self.cache.get(descriptor.name) {
            Some(index) => self.buf.put_u8(Signature::Cached(index).to_byte()),
            None => {
                let index = self.cache.next_index();
                self.buf.put_u8(Signature::New(index).to_byte());
                if let Err(source) = descriptor.name.to_owned().encode(&mut self.buf) {
                    self.buf.truncate(mark);
                    return Err(EncodeError::Announcement {
                        class: descriptor.name,
                        source,
                    });
                }
                varint::write_i64(&mut self.buf, descriptor.version);

                let (index, evicted) = self.cache.insert(descriptor.name);
                if let Some(evicted) = evicted {
                    tracing::debug!(index, evicted, class = descriptor.name, "evicted class reference");
                }
                tracing::debug!(
                    index,
                    class = descriptor.name,
                    version = descriptor.version,
                    "announced class"
                );
            }
        }
        self.buf.extend_from_slice(&self.scratch);
        self.pending += 1;
        Ok(())
    }

    /// Append every entity in order, stopping at the first failure.
    pub fn append_all<'a, I>(&mut self, entities: I) -> EncodeResult<()>
    where
        I: IntoIterator<Item = &'a dyn Entity>,
    {
        entities.into_iter().try_for_each(|entity| self.append(entity))
    }

    /// Take the encoded bytes, leaving the buffer empty.
    ///
    /// Class references survive unless auto-reset is enabled.
    pub fn get_encoded_and_reset(&mut self) -> Bytes {
        let encoded = self.buf.split().freeze();
        tracing::debug!(
            bytes = encoded.len(),
            entities = self.pending,
            "flushed encoder buffer"
        );
        self.pending = 0;
        if self.config.auto_reset {
            self.reset_class_references();
        }
        if self.buf.capacity() == 0 {
            self.buf.reserve(self.config.initial_capacity);
        }
        encoded
    }

    /// Forget every announced class; the next occurrence of each is announced
    /// again starting from index 0.
    pub fn reset_class_references(&mut self) {
        tracing::debug!(classes = self.cache.len(), "reset encoder class references");
        self.cache.clear();
    }

    pub fn set_auto_reset(&mut self, auto_reset: bool) {
        self.config.auto_reset = auto_reset;
    }

    pub fn auto_reset(&self) -> bool {
        self.config.auto_reset
    }

    /// Bytes encoded since the last flush.
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Entities appended since the last flush.
    pub fn pending_entities(&self) -> usize {
        self.pending
    }

    /// Index currently assigned to a class name, if announced.
    pub fn class_index(&self, class: &str) -> Option<u8> {
        self.cache.get(class)
    }

    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    fn validate(&mut self, descriptor: &'static EntityDescriptor) -> EncodeResult<()> {
        if self.validated.contains(descriptor.name) {
            return Ok(());
        }
        check_descriptor(&self.registry, descriptor)?;
        self.validated.insert(descriptor.name);
        Ok(())
    }
}

/// Reject field tables that could not round-trip.
fn check_descriptor(registry: &CodecRegistry, descriptor: &'static EntityDescriptor) -> EncodeResult<()> {
    let class = descriptor.name;
    if descriptor.constructor.is_none() {
        return Err(EncodeError::NotConstructible { class });
    }
    if class.is_empty() {
        return Err(EncodeError::InvalidEntity {
            class,
            reason: "empty class name".to_string(),
        });
    }
    if descriptor.fields.len() > MAX_FIELDS {
        return Err(EncodeError::InvalidEntity {
            class,
            reason: format!(
                "{} declared fields (max {MAX_FIELDS})",
                descriptor.fields.len()
            ),
        });
    }
    for (_, field) in descriptor.wire_fields() {
        registry
            .resolve(&field.value_type)
            .map_err(|source| EncodeError::UnsupportedField {
                class,
                field: field.name,
                source,
            })?;
    }
    Ok(())
}

fn encode_fields(
    registry: &CodecRegistry,
    entity: &dyn Entity,
    descriptor: &'static EntityDescriptor,
    out: &mut BytesMut,
) -> EncodeResult<()> {
    let width = descriptor.field_index_width();
    for (index, field) in descriptor.wire_fields() {
        let Some(value) = (field.get)(entity) else {
            continue;
        };
        let codec = registry
            .resolve(&field.value_type)
            .map_err(|source| EncodeError::UnsupportedField {
                class: descriptor.name,
                field: field.name,
                source,
            })?;

        write_field_index(out, index as u16, width);
        codec
            .encode(value, &field.value_type, out)
            .map_err(|source| EncodeError::Field {
                class: descriptor.name,
                field: field.name,
                source,
            })?;
        tracing::trace!(class = descriptor.name, field = field.name, index, "encoded field");
    }
    write_field_index(out, FIELD_TERMINATOR, width);
    Ok(())
}
