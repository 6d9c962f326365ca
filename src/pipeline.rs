//! End-to-end record reshaping.
//!
//! decode -> spread partition keys -> pivot maps -> relationalize -> repair.

use crate::ddb::decode_item;
use crate::error::ReshapeResult;
use crate::path::FieldPath;
use crate::pivot::{MapPivot, PivotOutcome};
use crate::relational::{root_partition_keys, RelationalizeConfig, Relationalizer, TableCollection};
use crate::spread::spread_partition_keys;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// One configured pivot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotSpec {
    /// Path to the map to pivot, dotted or as a list of keys.
    pub path: FieldPath,

    /// Where to write the list; defaults to `path`.
    #[serde(default)]
    pub destination: Option<FieldPath>,

    /// Drop entries whose value is null.
    #[serde(default)]
    pub skip_nulls: bool,
}

impl PivotSpec {
    fn to_pivot(&self) -> MapPivot {
        let pivot = MapPivot::new(self.path.clone()).skip_nulls(self.skip_nulls);
        match &self.destination {
            Some(destination) => pivot.to(destination.clone()),
            None => pivot,
        }
    }
}

/// Configuration for the reshaping pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Top-level fields copied into every list element and restored on child tables
    pub partition_keys: Vec<String>,

    /// Maps to pivot into `{item_key, item_value}` lists, applied in order
    pub pivots: Vec<PivotSpec>,

    /// Table naming
    pub relationalize: RelationalizeConfig,
}

impl PipelineConfig {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Runs every reshaping step over one record at a time.
pub struct Pipeline {
    partition_keys: Vec<String>,
    pivots: Vec<MapPivot>,
    relationalizer: Relationalizer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline {
            pivots: config.pivots.iter().map(PivotSpec::to_pivot).collect(),
            partition_keys: config.partition_keys,
            relationalizer: Relationalizer::new(config.relationalize),
        }
    }

    /// Process an `{"Item": ...}` envelope.
    pub fn process(&self, envelope: &Value) -> ReshapeResult<TableCollection> {
        let item = decode_item(envelope)?;
        self.process_tree(Value::Object(item))
    }

    /// Process an already-native record.
    pub fn process_tree(&self, mut tree: Value) -> ReshapeResult<TableCollection> {
        self.reshape(&mut tree)?;
        let tables = self.relationalizer.relationalize(tree);
        Ok(root_partition_keys(tables, &self.partition_keys))
    }

    /// Apply the in-place steps (spread, then pivots) without relationalizing.
    pub fn reshape(&self, tree: &mut Value) -> ReshapeResult<()> {
        spread_partition_keys(tree, &self.partition_keys);

        for pivot in &self.pivots {
            match pivot.apply(tree)? {
                PivotOutcome::Pivoted { kept, dropped } => {
                    debug!(path = %pivot.path, kept, dropped, "pivoted map");
                }
                outcome => {
                    debug!(path = %pivot.path, ?outcome, "pivot skipped");
                }
            }
        }
        Ok(())
    }
}
