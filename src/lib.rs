//! # Reshape - record reshaping for relational flattening
//!
//! Structural transforms applied to semi-structured records before they are
//! exploded into tables, plus a decoder for DynamoDB-style typed records.
//!
//! ## Modules
//!
//! - **ddb**: Decode `{"Item": {...}}` envelopes of typed attribute values
//! - **pivot**: Turn a map at some path into a list of `item_key`/`item_value` records
//! - **spread**: Copy partition keys into every list element of a record
//! - **relational**: Flatten records into linked tables and restore partition keys
//! - **pipeline**: All of the above, driven by a [`PipelineConfig`]
//!
//! ## Quick Start
//!
//! ```rust
//! use reshape::{decode_item, pivot_map_to_list, spread_partition_keys};
//! use serde_json::{json, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let envelope = json!({"Item": {
//!     "pk": {"S": "P1"},
//!     "price": {"N": "4.5"},
//!     "attrs": {"M": {"color": {"S": "red"}}},
//!     "items": {"L": [{"M": {"qty": {"N": "2"}}}]}
//! }});
//!
//! let mut record = Value::Object(decode_item(&envelope)?);
//! spread_partition_keys(&mut record, &["pk"]);
//! pivot_map_to_list(&mut record, &["attrs"], None)?;
//!
//! assert_eq!(record, json!({
//!     "pk": "P1",
//!     "price": 4.5,
//!     "items": [{"qty": 2, "pk": "P1"}],
//!     "attrs": [{"item_key": "color", "item_value": "red"}]
//! }));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::BufRead;
use tracing::info;

pub mod ddb;
pub mod error;
pub mod path;
pub mod pipeline;
pub mod pivot;
pub mod relational;
pub mod spread;

// Re-export commonly used types for convenience
pub use ddb::{decode_item, decode_item_str, AttributeValue};
pub use error::{ReshapeError, ReshapeResult};
pub use path::FieldPath;
pub use pipeline::{Pipeline, PipelineConfig, PivotSpec};
pub use pivot::{pivot_map_to_list, pivot_map_to_list_with, MapPivot, PivotOutcome};
pub use relational::{
    root_partition_keys, RelationalizeConfig, Relationalizer, SingleWriter, Table,
    TableCollection, TableWriter,
};
pub use spread::spread_partition_keys;

/// Main entry point: reshape a stream of newline-delimited envelopes into tables
///
/// Returns the number of records processed.
pub fn reshape_json<R: BufRead>(
    reader: R,
    writer: &mut TableWriter,
    config: PipelineConfig,
) -> Result<usize> {
    let pipeline = Pipeline::new(config);
    let mut count = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let envelope: Value = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse JSON on line {}", line_no + 1))?;

        let tables = pipeline
            .process(&envelope)
            .with_context(|| format!("Failed to reshape record on line {}", line_no + 1))?;
        writer.write_tables(&tables)?;
        count += 1;
    }

    writer.flush()?;
    info!(records = count, "reshaped records");
    Ok(count)
}
