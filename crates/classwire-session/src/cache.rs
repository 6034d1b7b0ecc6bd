use std::collections::HashMap;

use classwire_codec::EntityDescriptor;

use crate::wire::CLASS_CACHE_CAPACITY;

/// Encoder-side class references: a fixed ring of slots with FIFO eviction.
///
/// Slot `i` holds the class currently announced at index `i`. When every slot
/// is taken the ring pointer lands on the oldest announcement, which is
/// evicted and its index handed to the new class.
#[derive(Debug)]
pub struct ClassCache {
    slots: Vec<Option<&'static str>>,
    indices: HashMap<&'static str, u8>,
    next: usize,
}

impl ClassCache {
    pub fn new() -> Self {
        Self {
            slots: vec![None; CLASS_CACHE_CAPACITY],
            indices: HashMap::with_capacity(CLASS_CACHE_CAPACITY),
            next: 0,
        }
    }

    /// Index of a class announced earlier.
    pub fn get(&self, class: &str) -> Option<u8> {
        self.indices.get(class).copied()
    }

    /// Index the next [`insert`](Self::insert) will assign.
    pub fn next_index(&self) -> u8 {
        self.next as u8
    }

    /// Class that the next insert would evict, if the ring is full.
    pub fn next_eviction(&self) -> Option<&'static str> {
        self.slots[self.next]
    }

    /// Assign the next ring index to `class`.
    ///
    /// Returns the index and the class evicted from it, if any.
    pub fn insert(&mut self, class: &'static str) -> (u8, Option<&'static str>) {
        let index = self.next;
        let evicted = self.slots[index].replace(class);
        if let Some(old) = evicted {
            self.indices.remove(old);
        }
        self.indices.insert(class, index as u8);
        self.next = (index + 1) % CLASS_CACHE_CAPACITY;
        (index as u8, evicted)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.indices.clear();
        self.next = 0;
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl Default for ClassCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoder-side class references, keyed by announced index.
///
/// Re-announcing an index overwrites the previous class.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    classes: HashMap<u8, &'static EntityDescriptor>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: u8) -> Option<&'static EntityDescriptor> {
        self.classes.get(&index).copied()
    }

    /// Bind `index` to `descriptor`, returning the class previously bound.
    pub fn insert(
        &mut self,
        index: u8,
        descriptor: &'static EntityDescriptor,
    ) -> Option<&'static EntityDescriptor> {
        self.classes.insert(index, descriptor)
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
