//! Compile-time field tables for entity types.
//!
//! `#[derive(Entity)]` generates one [`EntityDescriptor`] per struct: the
//! class name written on the wire, the version tag, and the ordered list of
//! declared fields with erased accessors. Field indices on the wire are
//! positions in that list, so declaration order is part of the format.

use std::any::Any;
use std::fmt;

use crate::error::Result;
use crate::registry::ValueType;

/// Field count above which field indices take two bytes.
pub const ONE_BYTE_FIELD_LIMIT: usize = 255;

/// Most fields an entity may declare (two-byte index, 0 reserved).
pub const MAX_FIELDS: usize = u16::MAX as usize;

/// A serializable plain-data object.
///
/// Implemented by `#[derive(Entity)]`. The trait is object safe so that a
/// decoder can return heterogeneous entities as `Box<dyn Entity>`.
pub trait Entity: Any + fmt::Debug + 'static {
    fn descriptor(&self) -> &'static EntityDescriptor;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Static access to a concrete entity type's descriptor.
pub trait EntityType: Entity + Default {
    fn entity_descriptor() -> &'static EntityDescriptor;
}

impl dyn Entity {
    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Take ownership of the concrete entity, handing the box back on a type mismatch.
    pub fn downcast<T: Entity>(self: Box<Self>) -> std::result::Result<Box<T>, Box<dyn Entity>> {
        if !self.is::<T>() {
            return Err(self);
        }
        Ok(self
            .into_any()
            .downcast::<T>()
            .unwrap_or_else(|_| unreachable!("type checked above")))
    }
}

/// Reads a field; `None` means the field is absent (null) and is omitted.
pub type FieldGetter = fn(&dyn Entity) -> Option<&dyn Any>;

/// Assigns a decoded value to a field.
pub type FieldSetter = fn(&mut dyn Entity, Box<dyn Any>) -> Result<()>;

/// Creates a default instance.
pub type Constructor = fn() -> Box<dyn Entity>;

/// One declared field.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub value_type: ValueType,
    /// Transient fields keep their position but never travel.
    pub transient: bool,
    pub get: FieldGetter,
    pub set: FieldSetter,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("transient", &self.transient)
            .finish()
    }
}

/// Field table and identity of one entity class.
pub struct EntityDescriptor {
    /// Fully qualified class name written on the wire.
    pub name: &'static str,
    /// Declared version tag; 0 when the type declares none.
    pub version: i64,
    /// Former names still accepted when decoding.
    pub aliases: &'static [&'static str],
    /// Declared fields in declaration order.
    pub fields: &'static [FieldDescriptor],
    /// No-argument constructor, `None` for types that cannot be instantiated.
    pub constructor: Option<Constructor>,
}

impl EntityDescriptor {
    /// Bytes per field index for this class: 1, or 2 above 255 declared fields.
    pub fn field_index_width(&self) -> usize {
        if self.fields.len() > ONE_BYTE_FIELD_LIMIT {
            2
        } else {
            1
        }
    }

    /// Field at a 1-based wire index.
    pub fn field(&self, index: usize) -> Option<&'static FieldDescriptor> {
        index.checked_sub(1).and_then(|position| self.fields.get(position))
    }

    /// Fields that travel on the wire, with their 1-based indices.
    pub fn wire_fields(&self) -> impl Iterator<Item = (usize, &'static FieldDescriptor)> {
        let fields: &'static [FieldDescriptor] = self.fields;
        fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.transient)
            .map(|(position, field)| (position + 1, field))
    }

    /// True when `name` is the class name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| *alias == name)
    }

    /// Create a default instance through the constructor.
    pub fn instantiate(&self) -> Option<Box<dyn Entity>> {
        self.constructor.map(|construct| construct())
    }
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("aliases", &self.aliases)
            .field("fields", &self.fields)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Point {
        x: i32,
        label: Option<String>,
    }

    fn get_x(entity: &dyn Entity) -> Option<&dyn Any> {
        entity.downcast_ref::<Point>().map(|p| &p.x as &dyn Any)
    }

    fn get_label(entity: &dyn Entity) -> Option<&dyn Any> {
        entity
            .downcast_ref::<Point>()
            .and_then(|p| p.label.as_ref().map(|v| v as &dyn Any))
    }

    fn new_point() -> Box<dyn Entity> {
        Box::new(Point::default())
    }

    fn set_noop(_: &mut dyn Entity, _: Box<dyn Any>) -> Result<()> {
        Ok(())
    }

    static FIELDS: [FieldDescriptor; 3] = [
        FieldDescriptor {
            name: "x",
            value_type: ValueType::Plain {
                type_id: std::any::TypeId::of::<i32>,
                type_name: "i32",
            },
            transient: false,
            get: get_x,
            set: set_noop,
        },
        FieldDescriptor {
            name: "cache",
            value_type: ValueType::Plain {
                type_id: std::any::TypeId::of::<i32>,
                type_name: "i32",
            },
            transient: true,
            get: get_x,
            set: set_noop,
        },
        FieldDescriptor {
            name: "label",
            value_type: ValueType::Plain {
                type_id: std::any::TypeId::of::<String>,
                type_name: "String",
            },
            transient: false,
            get: get_label,
            set: set_noop,
        },
    ];

    static POINT: EntityDescriptor = EntityDescriptor {
        name: "geo.Point",
        version: 3,
        aliases: &["geo.OldPoint"],
        fields: &FIELDS,
        constructor: Some(new_point),
    };

    impl Entity for Point {
        fn descriptor(&self) -> &'static EntityDescriptor {
            &POINT
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    }

    #[test]
    fn field_positions_are_one_based() {
        assert!(POINT.field(0).is_none());
        assert_eq!(POINT.field(1).unwrap().name, "x");
        assert_eq!(POINT.field(3).unwrap().name, "label");
        assert!(POINT.field(4).is_none());
        assert_eq!(POINT.field_index_width(), 1);
    }

    #[test]
    fn wire_fields_skip_transient_but_keep_positions() {
        let indices: Vec<(usize, &str)> = POINT
            .wire_fields()
            .map(|(index, field)| (index, field.name))
            .collect();
        assert_eq!(indices, vec![(1, "x"), (3, "label")]);
    }

    #[test]
    fn aliases_resolve() {
        assert!(POINT.answers_to("geo.Point"));
        assert!(POINT.answers_to("geo.OldPoint"));
        assert!(!POINT.answers_to("geo.Line"));
    }

    #[test]
    fn getters_report_absent_values() {
        let point = Point {
            x: 4,
            label: None,
        };
        let entity: &dyn Entity = &point;
        assert_eq!((FIELDS[0].get)(entity).unwrap().downcast_ref::<i32>(), Some(&4));
        assert!((FIELDS[2].get)(entity).is_none());
    }

    #[test]
    fn downcast_recovers_concrete_type() {
        let entity = POINT.instantiate().unwrap();
        assert!(entity.is::<Point>());
        let point = entity.downcast::<Point>().unwrap();
        assert_eq!(point.x, 0);
    }
}
