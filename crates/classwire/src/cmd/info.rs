use classwire::codec::ordinal::ONE_BYTE_ORDINAL_LIMIT;
use classwire::codec::varint::{MAX_I32_LEN, MAX_I64_LEN};
use classwire::codec::{CodecRegistry, MAX_FIELDS, ONE_BYTE_FIELD_LIMIT};
use classwire::session::CLASS_CACHE_CAPACITY;
use classwire::stream::{DEFAULT_MAX_BATCH_SIZE, MAGIC};
use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct WireLimits {
    class_cache_capacity: usize,
    one_byte_field_limit: usize,
    max_fields: usize,
    one_byte_ordinal_limit: usize,
    max_i32_len: usize,
    max_i64_len: usize,
    batch_magic: String,
    max_batch_size: usize,
}

#[derive(Serialize)]
struct InfoOutput {
    schema_id: &'static str,
    version: &'static str,
    codecs: Vec<&'static str>,
    enum_codec: bool,
    limits: WireLimits,
}

pub fn run(_args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = CodecRegistry::new();
    let out = InfoOutput {
        schema_id: "https://schemas.3leaps.dev/classwire/cli/v1/codec-info.schema.json",
        version: env!("CARGO_PKG_VERSION"),
        codecs: registry.type_names(),
        enum_codec: true,
        limits: WireLimits {
            class_cache_capacity: CLASS_CACHE_CAPACITY,
            one_byte_field_limit: ONE_BYTE_FIELD_LIMIT,
            max_fields: MAX_FIELDS,
            one_byte_ordinal_limit: ONE_BYTE_ORDINAL_LIMIT,
            max_i32_len: MAX_I32_LEN,
            max_i64_len: MAX_I64_LEN,
            batch_magic: String::from_utf8_lossy(&MAGIC).into_owned(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        },
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut rows: Vec<Vec<String>> = out
                .codecs
                .iter()
                .map(|name| vec!["codec".to_string(), name.to_string()])
                .collect();
            rows.push(vec!["codec".to_string(), "enum (ordinal)".to_string()]);
            rows.extend(limit_rows(&out.limits));
            print_table(vec!["KIND", "VALUE"], rows);
        }
        OutputFormat::Pretty => {
            println!("classwire {}", out.version);
            println!("  Codecs:           {}, enum", out.codecs.join(", "));
            for row in limit_rows(&out.limits) {
                println!("  {:<17} {}", format!("{}:", row[0]), row[1]);
            }
        }
    }
    Ok(SUCCESS)
}

fn limit_rows(limits: &WireLimits) -> Vec<Vec<String>> {
    [
        ("class cache", limits.class_cache_capacity.to_string()),
        ("1-byte fields", limits.one_byte_field_limit.to_string()),
        ("max fields", limits.max_fields.to_string()),
        ("1-byte ordinals", limits.one_byte_ordinal_limit.to_string()),
        ("i32 max bytes", limits.max_i32_len.to_string()),
        ("i64 max bytes", limits.max_i64_len.to_string()),
        ("batch magic", limits.batch_magic.clone()),
        ("max batch bytes", limits.max_batch_size.to_string()),
    ]
    .into_iter()
    .map(|(name, value)| vec![name.to_string(), value])
    .collect()
}
