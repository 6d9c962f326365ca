use crate::relational::types::{
    RelationalizeConfig, Row, TableCollection, ID_COLUMN, INDEX_COLUMN, VALUE_SEGMENT,
};
use serde_json::{Map, Value};
use std::cell::Cell;

/// Flattens nested records into a root table plus one child table per list.
///
/// Nested maps become dotted columns of the row they live in. A list column
/// holds a reference id; its elements become rows of the child table
/// `{root}{separator}{column}`, carrying `id`, `index` and the element under
/// `{column}.val` (scalars) or `{column}.val.{field}` (maps).
pub struct Relationalizer {
    config: RelationalizeConfig,
    id_counter: Cell<u64>,
}

impl Relationalizer {
    pub fn new(config: RelationalizeConfig) -> Self {
        Relationalizer {
            config,
            id_counter: Cell::new(0),
        }
    }

    /// Relationalize one record. Reference ids keep increasing across calls,
    /// so the tables of several records can be concatenated.
    ///
    /// A record that is not a map produces an empty root table.
    pub fn relationalize(&self, value: Value) -> TableCollection {
        let mut tables = TableCollection::new(&self.config.root_name, &self.config.separator);
        tables.table_mut(&self.config.root_name);

        if let Value::Object(obj) = value {
            let mut row = Row::new();
            self.flatten_object(obj, "", &mut row, &mut tables);
            tables.table_mut(&self.config.root_name).push_row(row);
        }

        tables
    }

    fn flatten_value(
        &self,
        value: Value,
        column: String,
        row: &mut Row,
        tables: &mut TableCollection,
    ) {
        match value {
            Value::Object(obj) => self.flatten_object(obj, &column, row, tables),
            Value::Array(arr) => self.extract_list(arr, column, row, tables),
            scalar => {
                row.insert(column, scalar);
            }
        }
    }

    fn flatten_object(
        &self,
        obj: Map<String, Value>,
        prefix: &str,
        row: &mut Row,
        tables: &mut TableCollection,
    ) {
        for (key, value) in obj {
            let column = if prefix.is_empty() {
                key
            } else {
                format!("{prefix}.{key}")
            };
            self.flatten_value(value, column, row, tables);
        }
    }

    fn extract_list(
        &self,
        arr: Vec<Value>,
        column: String,
        row: &mut Row,
        tables: &mut TableCollection,
    ) {
        let id = self.next_id();
        let table_name = format!("{}{}{}", self.config.root_name, self.config.separator, column);
        let element_column = format!("{column}.{VALUE_SEGMENT}");

        // Create the child table before any grandchild tables.
        tables.table_mut(&table_name);

        for (idx, item) in arr.into_iter().enumerate() {
            let mut child = Row::new();
            child.insert(ID_COLUMN.to_string(), Value::from(id));
            child.insert(INDEX_COLUMN.to_string(), Value::from(idx));
            self.flatten_value(item, element_column.clone(), &mut child, tables);
            tables.table_mut(&table_name).push_row(child);
        }

        row.insert(column, Value::from(id));
    }

    fn next_id(&self) -> u64 {
        let id = self.id_counter.get() + 1;
        self.id_counter.set(id);
        id
    }
}
