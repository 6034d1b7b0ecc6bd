use std::collections::HashMap;
use std::fmt;

use classwire_codec::{EntityDescriptor, EntityType};

use crate::error::{DecodeError, DecodeResult};

/// Entity classes a decoder can instantiate, by class name and alias.
#[derive(Default)]
pub struct Catalog {
    names: HashMap<&'static str, &'static EntityDescriptor>,
    classes: Vec<&'static EntityDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a derived entity type under its class name and aliases.
    pub fn register<T: EntityType>(&mut self) -> DecodeResult<()> {
        self.register_descriptor(T::entity_descriptor())
    }

    /// Register a field table directly.
    ///
    /// Registering the same descriptor twice is a no-op. A name or alias
    /// already claimed by another descriptor is rejected and nothing is
    /// registered.
    pub fn register_descriptor(&mut self, descriptor: &'static EntityDescriptor) -> DecodeResult<()> {
        if self.classes.iter().any(|known| std::ptr::eq(*known, descriptor)) {
            return Ok(());
        }

        let names = std::iter::once(descriptor.name).chain(descriptor.aliases.iter().copied());
        for name in names.clone() {
            if let Some(existing) = self.names.get(name) {
                return Err(DecodeError::DuplicateClass {
                    name,
                    existing: existing.name,
                });
            }
        }

        for name in names {
            self.names.insert(name, descriptor);
        }
        self.classes.push(descriptor);
        tracing::trace!(
            class = descriptor.name,
            aliases = descriptor.aliases.len(),
            "registered entity class"
        );
        Ok(())
    }

    /// Class registered under `name`, either as class name or alias.
    pub fn resolve(&self, name: &str) -> Option<&'static EntityDescriptor> {
        self.names.get(name).copied()
    }

    /// Registered classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &'static EntityDescriptor> + '_ {
        self.classes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.classes.iter().map(|class| class.name))
            .finish()
    }
}
