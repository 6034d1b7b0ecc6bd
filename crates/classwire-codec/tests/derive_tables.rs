use std::any::Any;

use classwire_codec::{CodecError, Entity, EntityType, ValueType, WireEnum};
use classwire_derive::{Entity, WireEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, WireEnum)]
enum Priority {
    #[default]
    Low,
    Normal,
    High,
}

#[derive(Debug, Default, PartialEq, Entity)]
#[entity(name = "acme.mail.Envelope", version = 7, alias = "acme.Envelope", alias = "Envelope")]
struct Envelope {
    id: i64,
    subject: Option<String>,
    #[wire(skip)]
    scratch: Vec<u8>,
    #[wire(ordinal)]
    priority: Priority,
    #[wire(ordinal)]
    fallback: Option<Priority>,
}

#[derive(Debug, Default, Entity)]
struct Bare {
    flag: bool,
}

#[test]
fn descriptor_carries_identity_and_declaration_order() {
    let descriptor = Envelope::entity_descriptor();
    assert_eq!(descriptor.name, "acme.mail.Envelope");
    assert_eq!(descriptor.version, 7);
    assert_eq!(descriptor.aliases, ["acme.Envelope", "Envelope"]);

    let names: Vec<&str> = descriptor.fields.iter().map(|f| f.name).collect();
    assert_eq!(names, ["id", "subject", "scratch", "priority", "fallback"]);
    assert!(descriptor.fields[2].transient);
    assert_eq!(descriptor.field_index_width(), 1);
}

#[test]
fn default_name_is_module_qualified_and_version_zero() {
    let descriptor = Bare::entity_descriptor();
    assert_eq!(descriptor.name, concat!(module_path!(), "::Bare"));
    assert_eq!(descriptor.version, 0);
    assert!(descriptor.aliases.is_empty());
}

#[test]
fn value_types_follow_field_declarations() {
    let fields = Envelope::entity_descriptor().fields;
    assert!(matches!(
        fields[0].value_type,
        ValueType::Plain { type_name: "i64", .. }
    ));
    // Option is unwrapped: the registry sees the inner type
    assert!(matches!(
        fields[1].value_type,
        ValueType::Plain { type_name: "String", .. }
    ));
    match fields[4].value_type {
        ValueType::Enum(descriptor) => {
            assert_eq!(descriptor().len, 3);
            assert!(descriptor().name.ends_with("Priority"));
        }
        other => panic!("expected enum field, got {other:?}"),
    }
}

#[test]
fn getters_omit_absent_values() {
    let envelope = Envelope {
        id: 9,
        subject: None,
        scratch: vec![1, 2],
        priority: Priority::High,
        fallback: None,
    };
    let fields = Envelope::entity_descriptor().fields;
    let entity: &dyn Entity = &envelope;

    assert_eq!(
        (fields[0].get)(entity).and_then(|v| v.downcast_ref::<i64>()),
        Some(&9)
    );
    assert!((fields[1].get)(entity).is_none());
    assert!((fields[2].get)(entity).is_none());
    assert!((fields[4].get)(entity).is_none());
}

#[test]
fn setters_assign_decoded_values() {
    let mut entity = Envelope::entity_descriptor().instantiate().unwrap();
    let fields = Envelope::entity_descriptor().fields;

    (fields[1].set)(entity.as_mut(), Box::new("hello".to_string())).unwrap();
    (fields[4].set)(entity.as_mut(), Box::new(Priority::Normal)).unwrap();

    let envelope = entity.downcast::<Envelope>().unwrap();
    assert_eq!(envelope.subject.as_deref(), Some("hello"));
    assert_eq!(envelope.fallback, Some(Priority::Normal));
}

#[test]
fn setter_rejects_wrong_value_type() {
    let mut entity = Envelope::entity_descriptor().instantiate().unwrap();
    let fields = Envelope::entity_descriptor().fields;

    let err = (fields[0].set)(entity.as_mut(), Box::new(1i32) as Box<dyn Any>).unwrap_err();
    assert!(matches!(err, CodecError::TypeMismatch { expected: "i64" }));

    let err = (fields[2].set)(entity.as_mut(), Box::new(Vec::<u8>::new())).unwrap_err();
    assert!(matches!(err, CodecError::TypeMismatch { .. }));
}

#[test]
fn wire_enum_ordinals_follow_declaration_order() {
    assert_eq!(Priority::Low.ordinal(), 0);
    assert_eq!(Priority::High.ordinal(), 2);
    assert_eq!(Priority::from_ordinal(1), Some(Priority::Normal));
    assert_eq!(Priority::from_ordinal(3), None);
    assert_eq!(Priority::enum_descriptor().ordinal_width(), 1);
}
