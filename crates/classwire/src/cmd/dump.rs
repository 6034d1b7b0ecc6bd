use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use classwire::codec::CodecRegistry;
use classwire::session::Decoder;
use classwire::stream::BatchReader;
use serde::Serialize;

use crate::cmd::DumpArgs;
use crate::exit::{decode_error, io_error, stream_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};
use crate::samples;

#[derive(Serialize)]
struct EntityRow {
    schema_id: &'static str,
    batch: u64,
    class: &'static str,
    version: i64,
    value: String,
}

pub fn run(args: DumpArgs, format: OutputFormat) -> CliResult<i32> {
    let file = File::open(&args.file)
        .map_err(|err| io_error(&format!("open {}", args.file.display()), err))?;
    let catalog = samples::catalog().map_err(|err| decode_error("sample catalog", err))?;
    let decoder = Decoder::new(Arc::new(CodecRegistry::new()), Arc::new(catalog));
    let mut reader = BatchReader::new(BufReader::new(file), decoder);

    let mut rows = Vec::new();
    while let Some(batch) = reader
        .read_batch()
        .map_err(|err| stream_error("read batch", err))?
    {
        let number = reader.batches_read();
        for entity in batch {
            let descriptor = entity.descriptor();
            rows.push(EntityRow {
                schema_id: "https://schemas.3leaps.dev/classwire/cli/v1/entity-decoded.schema.json",
                batch: number,
                class: descriptor.name,
                version: descriptor.version,
                value: format!("{entity:?}"),
            });
        }
    }
    tracing::info!(
        batches = reader.batches_read(),
        entities = rows.len(),
        "decoded file"
    );

    match format {
        // one object per line, like a log stream
        OutputFormat::Json => rows.iter().for_each(print_json),
        OutputFormat::Table => print_table(
            vec!["BATCH", "CLASS", "VALUE"],
            rows.iter()
                .map(|row| vec![row.batch.to_string(), row.class.to_string(), row.value.clone()])
                .collect(),
        ),
        OutputFormat::Pretty => {
            for row in &rows {
                println!("[{}] {}", row.batch, row.value);
            }
        }
    }
    Ok(SUCCESS)
}
