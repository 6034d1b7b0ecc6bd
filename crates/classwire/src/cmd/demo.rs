use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use classwire::codec::chrono::Utc;
use classwire::codec::CodecRegistry;
use classwire::session::{Encoder, EncoderConfig};
use classwire::stream::{BatchWriter, HEADER_SIZE};
use serde::Serialize;

use crate::cmd::DemoArgs;
use crate::exit::{io_error, stream_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};
use crate::samples;

#[derive(Serialize)]
struct BatchSummary {
    batch: usize,
    entities: usize,
    payload_bytes: usize,
    announced: Vec<&'static str>,
}

#[derive(Serialize)]
struct DemoOutput {
    schema_id: &'static str,
    entities: usize,
    total_bytes: usize,
    out: Option<String>,
    batches: Vec<BatchSummary>,
}

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    let sink: Box<dyn Write> = match &args.out {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| io_error(&format!("create {}", path.display()), err))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::sink()),
    };

    let encoder = Encoder::with_config(
        Arc::new(CodecRegistry::new()),
        EncoderConfig {
            auto_reset: args.auto_reset,
            ..EncoderConfig::default()
        },
    );
    let mut writer = BatchWriter::new(sink, encoder);
    let entities = samples::generate(args.count, Utc::now());

    let mut batches = Vec::new();
    for (position, chunk) in entities.chunks(args.batch_size).enumerate() {
        let mut announced = Vec::new();
        for entity in chunk {
            let class = entity.descriptor().name;
            if writer.encoder().class_index(class).is_none() && !announced.contains(&class) {
                announced.push(class);
            }
            writer
                .append(entity.as_ref())
                .map_err(|err| stream_error("encode entity", err))?;
        }
        let payload_bytes = writer
            .flush()
            .map_err(|err| stream_error("write batch", err))?;
        batches.push(BatchSummary {
            batch: position + 1,
            entities: chunk.len(),
            payload_bytes,
            announced,
        });
    }

    let out = DemoOutput {
        schema_id: "https://schemas.3leaps.dev/classwire/cli/v1/demo-summary.schema.json",
        entities: entities.len(),
        total_bytes: batches.iter().map(|b| HEADER_SIZE + b.payload_bytes).sum(),
        out: args.out.as_ref().map(|path| path.display().to_string()),
        batches,
    };
    print_summary(&out, format);
    Ok(SUCCESS)
}

fn print_summary(out: &DemoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => print_table(
            vec!["BATCH", "ENTITIES", "BYTES", "ANNOUNCED"],
            out.batches
                .iter()
                .map(|b| {
                    vec![
                        b.batch.to_string(),
                        b.entities.to_string(),
                        b.payload_bytes.to_string(),
                        b.announced.join(", "),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty => {
            for b in &out.batches {
                println!(
                    "batch {}: {} entities, {} bytes, announced [{}]",
                    b.batch,
                    b.entities,
                    b.payload_bytes,
                    b.announced.join(", ")
                );
            }
            match &out.out {
                Some(path) => println!("{} bytes written to {path}", out.total_bytes),
                None => println!("{} bytes (not written)", out.total_bytes),
            }
        }
    }
}
