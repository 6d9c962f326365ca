use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name segment placed between a list column and its element fields.
pub const VALUE_SEGMENT: &str = "val";

/// Column holding the reference id shared by a list column and its child rows.
pub const ID_COLUMN: &str = "id";

/// Column holding an element's position in its list.
pub const INDEX_COLUMN: &str = "index";

/// One row of a table: flat column name to scalar value.
pub type Row = Map<String, Value>;

/// A named table produced by relationalizing records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Rename a column in every row. Returns how many rows were touched.
    ///
    /// `from` may be backtick-quoted, in which case it names a single column
    /// whose name contains dots. Rows without the column are left alone.
    pub fn rename_field(&mut self, from: &str, to: &str) -> usize {
        let from = unquote_field_name(from);
        let mut renamed = 0;
        for row in &mut self.rows {
            if let Some(value) = row.shift_remove(from) {
                row.insert(to.to_string(), value);
                renamed += 1;
            }
        }
        renamed
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ordered collection of tables; the root table always comes first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCollection {
    pub root_name: String,
    pub separator: String,
    tables: Vec<Table>,
}

impl TableCollection {
    pub fn new(root_name: impl Into<String>, separator: impl Into<String>) -> Self {
        TableCollection {
            root_name: root_name.into(),
            separator: separator.into(),
            tables: Vec::new(),
        }
    }

    /// Get a table by name, creating it at the end if it does not exist yet.
    pub fn table_mut(&mut self, name: &str) -> &mut Table {
        let idx = match self.tables.iter().position(|t| t.name == name) {
            Some(idx) => idx,
            None => {
                self.tables.push(Table::new(name));
                self.tables.len() - 1
            }
        };
        &mut self.tables[idx]
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn root(&self) -> Option<&Table> {
        self.tables.first()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.tables.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Name of a child table relative to the root: the root prefix and one
    /// separator following it are stripped, undoing the child table naming.
    pub fn relative_name<'a>(&self, table_name: &'a str) -> &'a str {
        let rest = table_name
            .strip_prefix(self.root_name.as_str())
            .unwrap_or(table_name);
        rest.strip_prefix(self.separator.as_str()).unwrap_or(rest)
    }
}

/// Configuration for relationalizing records into tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationalizeConfig {
    /// Name of the root table; child tables are prefixed with it.
    pub root_name: String,

    /// Separator between the root name and a child table's column path.
    pub separator: String,
}

impl Default for RelationalizeConfig {
    fn default() -> Self {
        RelationalizeConfig {
            root_name: String::from("root"),
            separator: String::from("_"),
        }
    }
}

/// Quote a column name that contains dots so renames treat it as one field.
pub fn sanitize_field_name(name: &str) -> String {
    if name.contains('.') {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

fn unquote_field_name(name: &str) -> &str {
    name.strip_prefix('`')
        .and_then(|n| n.strip_suffix('`'))
        .unwrap_or(name)
}
