//! Partition key repair after relationalizing.
//!
//! Once [`crate::spread::spread_partition_keys`] has copied the partition keys
//! into list elements, the child tables carry them under columns such as
//! `items.val.pk`. This pass renames those columns back to the bare key.

use crate::relational::types::{
    sanitize_field_name, TableCollection, ID_COLUMN, INDEX_COLUMN, VALUE_SEGMENT,
};
use tracing::warn;

/// Rename `{relative_name}.val.{key}` to `key` in every non-root table.
///
/// The root table is returned untouched; an empty collection is returned as is.
/// Keys named like the link columns (`id`, `index`) are not renamed, since that
/// would overwrite the reference to the parent row; they keep their
/// `{relative_name}.val.{key}` column.
pub fn root_partition_keys<S: AsRef<str>>(
    mut tables: TableCollection,
    partition_keys: &[S],
) -> TableCollection {
    if tables.is_empty() {
        return tables;
    }

    let keys: Vec<&str> = partition_keys
        .iter()
        .map(|key| key.as_ref())
        .filter(|key| {
            let reserved = *key == ID_COLUMN || *key == INDEX_COLUMN;
            if reserved {
                warn!(key = *key, "partition key clashes with a link column, not renaming");
            }
            !reserved
        })
        .collect();

    let names: Vec<String> = tables.names().skip(1).map(str::to_string).collect();
    for name in names {
        let relative = tables.relative_name(&name).to_string();
        let Some(table) = tables.iter_mut().find(|t| t.name == name) else {
            continue;
        };
        for key in &keys {
            let field = sanitize_field_name(&format!("{relative}.{VALUE_SEGMENT}.{key}"));
            table.rename_field(&field, key);
        }
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relational::{RelationalizeConfig, Relationalizer};
    use crate::spread::spread_partition_keys;
    use serde_json::{json, Value};

    #[test]
    fn test_renames_spread_keys() {
        let mut record = json!({
            "pk": "P1",
            "sk": "S1",
            "items": [{"v": 1, "subs": [{"w": true}]}]
        });
        spread_partition_keys(&mut record, &["pk", "sk"]);

        let tables = Relationalizer::new(RelationalizeConfig::default()).relationalize(record);
        let tables = root_partition_keys(tables, &["pk", "sk"]);

        let items = tables.get("root_items").unwrap();
        assert_eq!(
            Value::Object(items.rows[0].clone()),
            json!({"id": 1, "index": 0, "items.val.v": 1, "items.val.subs": 2, "pk": "P1", "sk": "S1"})
        );

        let subs = tables.get("root_items.val.subs").unwrap();
        assert_eq!(subs.rows[0].get("pk"), Some(&json!("P1")));
        assert_eq!(subs.rows[0].get("sk"), Some(&json!("S1")));
        assert!(!subs.rows[0].contains_key("items.val.subs.val.pk"));

        let root = tables.root().unwrap();
        assert_eq!(root.rows[0].get("pk"), Some(&json!("P1")));
    }

    #[test]
    fn test_list_column_with_leading_separator() {
        let mut record = json!({"pk": "P1", "_lines": [{"v": 1}]});
        spread_partition_keys(&mut record, &["pk"]);

        let tables = Relationalizer::new(RelationalizeConfig::default()).relationalize(record);
        let tables = root_partition_keys(tables, &["pk"]);

        let lines = tables.get("root__lines").unwrap();
        assert_eq!(
            Value::Object(lines.rows[0].clone()),
            json!({"id": 1, "index": 0, "_lines.val.v": 1, "pk": "P1"})
        );
    }

    #[test]
    fn test_link_column_keys_keep_their_column() {
        let mut record = json!({"id": "X", "pk": "P1", "items": [{"v": 1}]});
        spread_partition_keys(&mut record, &["id", "pk"]);

        let tables = Relationalizer::new(RelationalizeConfig::default()).relationalize(record);
        let tables = root_partition_keys(tables, &["id", "pk"]);

        let root = tables.root().unwrap();
        assert_eq!(root.rows[0].get("items"), Some(&json!(1)));

        let items = tables.get("root_items").unwrap();
        assert_eq!(
            Value::Object(items.rows[0].clone()),
            json!({"id": 1, "index": 0, "items.val.v": 1, "items.val.id": "X", "pk": "P1"})
        );
    }

    #[test]
    fn test_missing_columns_are_ignored() {
        let tables = Relationalizer::new(RelationalizeConfig::default())
            .relationalize(json!({"tags": ["a"]}));
        let before = tables.clone();
        let after = root_partition_keys(tables, &["pk"]);
        assert_eq!(after, before);
    }

    #[test]
    fn test_empty_collection() {
        let tables = TableCollection::new("root", "_");
        assert!(root_partition_keys(tables, &["pk"]).is_empty());
    }

    #[test]
    fn test_custom_root_name() {
        let config = RelationalizeConfig {
            root_name: "orders".to_string(),
            separator: "_".to_string(),
        };
        let mut record = json!({"tenant": "t1", "lines": [{"n": 1}]});
        spread_partition_keys(&mut record, &["tenant"]);

        let tables = root_partition_keys(Relationalizer::new(config).relationalize(record), &["tenant"]);
        let lines = tables.get("orders_lines").unwrap();
        assert_eq!(lines.rows[0].get("tenant"), Some(&json!("t1")));
    }
}
