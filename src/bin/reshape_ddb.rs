//! reshape-ddb: Reshape DynamoDB export records into relational tables
//!
//! Reads newline-delimited `{"Item": {...}}` envelopes, decodes them, spreads
//! partition keys, pivots configured maps and writes one table per list.
//!
//! Usage:
//!   # Read from file, output to stdout
//!   reshape-ddb export.jsonl --partition-keys pk,sk
//!
//!   # Read from stdin, write one .jsonl file per table
//!   cat export.jsonl | reshape-ddb --output-dir ./tables
//!
//!   # Pivot a map, optionally moving it (path[:destination])
//!   reshape-ddb export.jsonl --pivot attributes --pivot meta.tags:tags
//!
//!   # Load settings from a config file; flags are applied on top
//!   reshape-ddb export.jsonl --config pipeline.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use reshape::{FieldPath, Pipeline, PipelineConfig, PivotSpec, SingleWriter, TableWriter};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reshape-ddb")]
#[command(about = "Reshape DynamoDB export records into relational tables", long_about = None)]
struct Args {
    /// Input file of newline-delimited envelopes (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Output directory for separate .jsonl files per table
    /// If omitted, writes to stdout as a single stream tagged with `_table`
    #[arg(long, short = 'o')]
    output_dir: Option<String>,

    /// JSON pipeline configuration file
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Comma-separated partition keys to spread and restore
    #[arg(long)]
    partition_keys: Option<String>,

    /// Map to pivot, as `path` or `path:destination` (dotted paths, repeatable)
    #[arg(long = "pivot", value_name = "PATH[:DEST]")]
    pivots: Vec<String>,

    /// Drop null values from pivoted maps given with --pivot
    #[arg(long)]
    skip_nulls: bool,

    /// Name of the root table (default: "root")
    #[arg(long)]
    root_name: Option<String>,

    /// Records are already native JSON, skip DynamoDB decoding
    #[arg(long)]
    native: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    debug!(?config, "pipeline configuration");

    let pipeline = Pipeline::new(config);

    let reader: Box<dyn BufRead> = if let Some(file_path) = &args.input {
        let file = File::open(file_path)
            .with_context(|| format!("Failed to open input file: {file_path}"))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(std::io::stdin()))
    };

    let count = if let Some(output_dir) = &args.output_dir {
        let mut writer = TableWriter::new(output_dir)
            .with_context(|| format!("Failed to create output directory: {output_dir}"))?;
        let count = process_records(reader, &pipeline, args.native, |tables| {
            writer.write_tables(tables).map_err(Into::into)
        })?;
        writer.flush()?;
        count
    } else {
        let mut writer = SingleWriter::new(std::io::stdout().lock());
        let count = process_records(reader, &pipeline, args.native, |tables| {
            writer.write_tables(tables).map_err(Into::into)
        })?;
        writer.flush()?;
        count
    };

    info!(records = count, "done");
    Ok(())
}

/// Layer command-line flags over the optional config file
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(keys) = &args.partition_keys {
        config.partition_keys = keys
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(root_name) = &args.root_name {
        config.relationalize.root_name = root_name.clone();
    }

    for spec in &args.pivots {
        let (path, destination) = match spec.split_once(':') {
            Some((path, destination)) => (path, Some(FieldPath::parse(destination))),
            None => (spec.as_str(), None),
        };
        config.pivots.push(PivotSpec {
            path: FieldPath::parse(path),
            destination,
            skip_nulls: args.skip_nulls,
        });
    }

    Ok(config)
}

/// Run every non-empty input line through the pipeline, handing tables to `sink`
fn process_records<F>(
    reader: Box<dyn BufRead>,
    pipeline: &Pipeline,
    native: bool,
    mut sink: F,
) -> Result<usize>
where
    F: FnMut(&reshape::TableCollection) -> Result<()>,
{
    let mut count = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }

        // SIMD parsing straight into serde_json::Value
        let mut bytes = line.into_bytes();
        let value: Value = simd_json::serde::from_slice(&mut bytes)
            .with_context(|| format!("Failed to parse JSON on line {}", line_no + 1))?;

        let tables = if native {
            pipeline.process_tree(value)
        } else {
            pipeline.process(&value)
        }
        .with_context(|| format!("Failed to reshape record on line {}", line_no + 1))?;

        sink(&tables)?;
        count += 1;
    }

    Ok(count)
}
