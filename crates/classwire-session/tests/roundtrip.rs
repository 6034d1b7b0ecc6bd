use std::sync::Arc;

use classwire_codec::chrono::{DateTime, TimeDelta, Utc};
use classwire_codec::{
    erased_constant, erased_ordinal, CodecRegistry, EnumDescriptor, EntityType, TimeValue,
    WireEnum,
};
use classwire_derive::{Entity, WireEnum};
use classwire_session::{Catalog, Decoder, Encoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, WireEnum)]
enum Status {
    #[default]
    Draft,
    Sent,
    Failed,
}

/// Enum stand-in with more constants than a one-byte ordinal can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Code(u16);

static CODE: EnumDescriptor = EnumDescriptor {
    name: "roundtrip::Code",
    len: 300,
    ordinal_of: erased_ordinal::<Code>,
    from_ordinal: erased_constant::<Code>,
};

impl WireEnum for Code {
    fn enum_descriptor() -> &'static EnumDescriptor {
        &CODE
    }

    fn ordinal(&self) -> usize {
        usize::from(self.0)
    }

    fn from_ordinal(ordinal: usize) -> Option<Self> {
        (ordinal < CODE.len).then_some(Self(ordinal as u16))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(name = "test.Everything", version = 1)]
struct Everything {
    flag: bool,
    count: i32,
    total: i64,
    label: String,
    numbers: Vec<i32>,
    boxed: Vec<Option<i32>>,
    words: Vec<String>,
    at: Option<DateTime<Utc>>,
    timeout: Option<TimeDelta>,
    deadline: Option<TimeValue>,
    #[wire(ordinal)]
    status: Status,
    #[wire(ordinal)]
    code: Option<Code>,
}

fn session() -> (Encoder, Decoder) {
    let registry = Arc::new(CodecRegistry::new());
    let mut catalog = Catalog::new();
    catalog.register::<Everything>().unwrap();
    (
        Encoder::new(registry.clone()),
        Decoder::new(registry, Arc::new(catalog)),
    )
}

fn roundtrip(values: &[Everything]) -> Vec<Everything> {
    let (mut encoder, mut decoder) = session();
    for value in values {
        encoder.append(value).unwrap();
    }
    let bytes = encoder.get_encoded_and_reset();
    decoder.decode_as::<Everything>(&bytes).unwrap()
}

#[test]
fn int_tier_boundaries_roundtrip() {
    let ints = [
        0,
        1,
        -1,
        63,
        64,
        8191,
        8192,
        (1 << 21) - 1,
        1 << 21,
        (1 << 29) - 1,
        1 << 29,
        i32::MIN,
        i32::MAX,
    ];
    let values: Vec<Everything> = ints
        .iter()
        .map(|&count| Everything {
            count,
            numbers: vec![count, count.wrapping_neg()],
            ..Default::default()
        })
        .collect();
    assert_eq!(roundtrip(&values), values);
}

#[test]
fn long_tier_boundaries_roundtrip() {
    let mut longs = vec![i64::MIN, i64::MAX, 0];
    for shift in [4, 11, 18, 25, 32, 39, 46, 53, 60] {
        let edge = 1i64 << shift;
        longs.extend([edge - 1, edge, edge + 1, -edge, -edge - 1]);
    }
    let values: Vec<Everything> = longs
        .iter()
        .map(|&total| Everything {
            total,
            ..Default::default()
        })
        .collect();
    assert_eq!(roundtrip(&values), values);
}

#[test]
fn strings_and_arrays_roundtrip() {
    let values = vec![
        Everything::default(),
        Everything {
            flag: true,
            label: "größe ✓ 日本語 🦀".to_string(),
            numbers: vec![],
            boxed: vec![Some(i32::MIN), Some(0), Some(i32::MAX)],
            words: vec![String::new(), "ünïcödé".to_string(), "x".repeat(70)],
            ..Default::default()
        },
        Everything {
            label: "a".repeat(10_000),
            numbers: (-100..100).collect(),
            ..Default::default()
        },
    ];
    assert_eq!(roundtrip(&values), values);
}

#[test]
fn time_values_roundtrip() {
    let values = vec![
        Everything {
            at: DateTime::from_timestamp_millis(1_700_000_000_123),
            timeout: Some(TimeDelta::milliseconds(-2_500)),
            deadline: Some(TimeValue::relative(30_000)),
            ..Default::default()
        },
        Everything {
            at: DateTime::from_timestamp_millis(-86_400_000),
            timeout: Some(TimeDelta::zero()),
            deadline: Some(TimeValue::absolute(1_700_000_000_000)),
            ..Default::default()
        },
    ];
    assert_eq!(roundtrip(&values), values);
}

#[test]
fn enum_ordinals_roundtrip_across_width_threshold() {
    let values: Vec<Everything> = [0u16, 1, 255, 256, 299]
        .iter()
        .map(|&code| Everything {
            status: Status::Failed,
            code: Some(Code(code)),
            ..Default::default()
        })
        .collect();
    assert_eq!(roundtrip(&values), values);
}

#[test]
fn wide_enum_uses_two_byte_ordinal() {
    let (mut encoder, _) = session();
    encoder
        .append(&Everything {
            code: Some(Code(256)),
            ..Default::default()
        })
        .unwrap();
    let bytes = encoder.get_encoded_and_reset();
    // code is field 12, the last one before the terminator
    assert!(bytes.ends_with(&[12, 0x01, 0x00, 0x00]));
}

#[test]
fn absent_fields_decode_to_none() {
    let values = vec![Everything {
        at: None,
        timeout: None,
        deadline: None,
        code: None,
        ..Default::default()
    }];
    let decoded = roundtrip(&values);
    assert_eq!(decoded[0].at, None);
    assert_eq!(decoded[0].code, None);
    assert_eq!(
        Everything::entity_descriptor().name,
        "test.Everything"
    );
}
