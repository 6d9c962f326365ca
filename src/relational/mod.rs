//! Relationalizing - flatten nested records into linked tables
//!
//! This module explodes every list of a record into its own table and
//! renames spread partition keys back onto those tables afterwards.
//!
//! ## Naming
//!
//! For a record `{"pk": "P1", "items": [{"v": 1, "pk": "P1"}]}` the tables are
//! `root` (columns `pk`, `items`) and `root_items` (columns `id`, `index`,
//! `items.val.v`, `items.val.pk`). [`root_partition_keys`] turns
//! `items.val.pk` back into `pk`.

pub mod extractor;
pub mod repair;
pub mod types;
pub mod writer;

pub use extractor::Relationalizer;
pub use repair::root_partition_keys;
pub use types::{sanitize_field_name, RelationalizeConfig, Row, Table, TableCollection};
pub use writer::{SingleWriter, TableWriter};
