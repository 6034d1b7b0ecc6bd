use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod demo;
pub mod dump;
pub mod info;
pub mod varint;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show version information.
    Version(VersionArgs),
    /// List registered codecs and wire constants.
    Info(InfoArgs),
    /// Show the variable-length encoding of an integer.
    Varint(VarintArgs),
    /// Encode sample entities into framed batches.
    Demo(DemoArgs),
    /// Decode a framed batch file and print its entities.
    Dump(DumpArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Version(args) => version::run(args),
        Command::Info(args) => info::run(args, format),
        Command::Varint(args) => varint::run(args, format),
        Command::Demo(args) => demo::run(args, format),
        Command::Dump(args) => dump::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct InfoArgs {}

#[derive(Args, Debug)]
pub struct VarintArgs {
    /// Integer to encode.
    #[arg(allow_negative_numbers = true)]
    pub value: i64,
    /// Use the 64-bit encoding instead of the 32-bit one.
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Number of sample entities to encode.
    #[arg(long, short = 'n', default_value_t = 12)]
    pub count: usize,
    /// Entities per batch.
    #[arg(long, default_value_t = 4, value_parser = parse_batch_size)]
    pub batch_size: usize,
    /// Write the framed batches to this file.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Announce classes again in every batch.
    #[arg(long)]
    pub auto_reset: bool,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Framed batch file written by `demo --out`.
    pub file: PathBuf,
}

fn parse_batch_size(input: &str) -> Result<usize, String> {
    match input.parse::<usize>() {
        Ok(0) => Err("batch size must be greater than zero".to_string()),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}
