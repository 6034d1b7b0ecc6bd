use bytes::BytesMut;
use classwire::codec::varint::{self, MAX_I32_LEN, MAX_I64_LEN};
use serde::Serialize;

use crate::cmd::VarintArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{hex, print_json, print_table, OutputFormat};

#[derive(Serialize, Debug, PartialEq)]
struct VarintOutput {
    schema_id: &'static str,
    value: i64,
    width: &'static str,
    tier: u8,
    literal: bool,
    len: usize,
    bytes: String,
}

pub fn run(args: VarintArgs, format: OutputFormat) -> CliResult<i32> {
    let out = describe(args.value, args.long)?;
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(
            vec!["VALUE", "WIDTH", "TIER", "LITERAL", "LEN", "BYTES"],
            vec![vec![
                out.value.to_string(),
                out.width.to_string(),
                out.tier.to_string(),
                out.literal.to_string(),
                out.len.to_string(),
                out.bytes.clone(),
            ]],
        ),
        OutputFormat::Pretty => println!(
            "{} ({}) -> {} byte(s), tier {}{}: {}",
            out.value,
            out.width,
            out.len,
            out.tier,
            if out.literal { " literal" } else { "" },
            out.bytes
        ),
    }
    Ok(SUCCESS)
}

fn describe(value: i64, long: bool) -> CliResult<VarintOutput> {
    let (width, bytes, tier, literal) = if long {
        let mut bytes = BytesMut::new();
        varint::write_i64(&mut bytes, value);
        let tier = bytes[0] >> 5;
        let literal = bytes.len() == MAX_I64_LEN;
        ("i64", bytes, tier, literal)
    } else {
        let narrow = i32::try_from(value).map_err(|_| {
            CliError::new(
                USAGE,
                format!("{value} does not fit in 32 bits; use --long"),
            )
        })?;
        let mut bytes = BytesMut::new();
        varint::write_i32(&mut bytes, narrow);
        let tier = bytes[0] >> 6;
        let literal = bytes.len() == MAX_I32_LEN;
        ("i32", bytes, tier, literal)
    };

    Ok(VarintOutput {
        schema_id: "https://schemas.3leaps.dev/classwire/cli/v1/varint.schema.json",
        value,
        width,
        tier,
        literal,
        len: bytes.len(),
        bytes: hex(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_tier_boundaries() {
        let small = describe(63, false).unwrap();
        assert_eq!((small.tier, small.len, small.bytes.as_str()), (1, 2, "40 3F"));

        let literal = describe(1 << 21, false).unwrap();
        assert!(literal.literal);
        assert_eq!(literal.bytes, "C0 00 20 00 00");

        let negative = describe(-1, true).unwrap();
        assert_eq!((negative.width, negative.len, negative.bytes.as_str()), ("i64", 1, "1F"));
    }

    #[test]
    fn wide_value_needs_long() {
        let err = describe(i64::from(i32::MAX) + 1, false).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert_eq!(describe(i64::MAX, true).unwrap().len, MAX_I64_LEN);
    }
}
