//! Map-to-list pivot.
//!
//! Turns a map found at a path into a list of `{"item_key": k, "item_value": v}`
//! records, optionally writing the list somewhere else. Runs in two explicit
//! phases: [`detach`] takes the source map out of the tree, [`attach`] writes
//! the built list back. Source lookup is tolerant; the write-back is strict.

use crate::error::ReshapeResult;
use crate::path::{parent_map_mut, parent_map_strict, require_parent_map, FieldPath};
use serde_json::{Map, Value};

pub const ITEM_KEY: &str = "item_key";
pub const ITEM_VALUE: &str = "item_value";

/// What happened to the source field during [`detach`].
#[derive(Debug, Clone, PartialEq)]
pub enum Detached {
    /// The path did not resolve: a segment was missing, null, or not a map.
    Missing,
    /// The field exists but does not hold a map. It was left in place.
    NotAMap,
    /// The field held a map and has been removed from its parent.
    Map(Map<String, Value>),
}

/// Result of a pivot that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotOutcome {
    /// The list was written; `kept` entries survived the keep predicate.
    Pivoted { kept: usize, dropped: usize },
    /// Nothing to pivot, the tree is unchanged.
    SourceMissing,
    /// The source is not a map, the tree is unchanged.
    SourceNotMap,
}

/// Predicate that keeps every entry.
pub fn keep_all(_value: &Value, _key: &str) -> bool {
    true
}

/// Predicate that drops entries whose value is null.
pub fn keep_non_null(value: &Value, _key: &str) -> bool {
    !value.is_null()
}

/// Pivot the map at `path` in place, keeping every entry.
///
/// With no `destination` the list replaces the map at `path`.
pub fn pivot_map_to_list<S: AsRef<str>>(
    tree: &mut Value,
    path: &[S],
    destination: Option<&[S]>,
) -> ReshapeResult<PivotOutcome> {
    pivot_map_to_list_with(tree, path, destination, keep_all)
}

/// Pivot the map at `path` in place, keeping entries for which
/// `keep(value, key)` holds.
///
/// An explicit `destination` must lead through existing maps, and is checked
/// even when there turns out to be nothing to pivot. The default destination
/// (`path` itself) is only navigated when a list is actually written.
pub fn pivot_map_to_list_with<S, F>(
    tree: &mut Value,
    path: &[S],
    destination: Option<&[S]>,
    mut keep: F,
) -> ReshapeResult<PivotOutcome>
where
    S: AsRef<str>,
    F: FnMut(&Value, &str) -> bool,
{
    if let Some(destination) = destination {
        require_parent_map(tree, destination)?;
    }

    let source = match detach(tree, path) {
        Detached::Missing => return Ok(PivotOutcome::SourceMissing),
        Detached::NotAMap => return Ok(PivotOutcome::SourceNotMap),
        Detached::Map(source) => source,
    };

    let total = source.len();
    let list = build_entries(source, &mut keep);
    let kept = list.len();

    attach(tree, destination.unwrap_or(path), list)?;

    Ok(PivotOutcome::Pivoted {
        kept,
        dropped: total - kept,
    })
}

/// Detach phase: remove the map stored at `path` from its parent.
///
/// Values that are not maps are never removed.
pub fn detach<S: AsRef<str>>(tree: &mut Value, path: &[S]) -> Detached {
    let Some(last) = path.last() else {
        return Detached::Missing;
    };
    let Some(parent) = parent_map_mut(tree, path) else {
        return Detached::Missing;
    };

    let key = last.as_ref();
    match parent.get(key) {
        None | Some(Value::Null) => return Detached::Missing,
        Some(Value::Object(_)) => {}
        Some(_) => return Detached::NotAMap,
    }
    match parent.shift_remove(key) {
        Some(Value::Object(map)) => Detached::Map(map),
        _ => Detached::Missing,
    }
}

/// Attach phase: strictly navigate `destination` and store `list` under its
/// last key, creating or overwriting it.
pub fn attach<S: AsRef<str>>(
    tree: &mut Value,
    destination: &[S],
    list: Vec<Value>,
) -> ReshapeResult<()> {
    let (parent, key) = parent_map_strict(tree, destination)?;
    parent.insert(key.to_string(), Value::Array(list));
    Ok(())
}

fn build_entries<F>(source: Map<String, Value>, keep: &mut F) -> Vec<Value>
where
    F: FnMut(&Value, &str) -> bool,
{
    source
        .into_iter()
        .filter(|(key, value)| keep(value, key.as_str()))
        .map(|(key, value)| {
            let mut entry = Map::new();
            entry.insert(ITEM_KEY.to_string(), Value::String(key));
            entry.insert(ITEM_VALUE.to_string(), value);
            Value::Object(entry)
        })
        .collect()
}

/// A reusable pivot definition, e.g. loaded from pipeline configuration.
#[derive(Debug, Clone)]
pub struct MapPivot {
    pub path: FieldPath,
    pub destination: Option<FieldPath>,
    pub skip_nulls: bool,
}

impl MapPivot {
    pub fn new(path: FieldPath) -> Self {
        MapPivot {
            path,
            destination: None,
            skip_nulls: false,
        }
    }

    pub fn to(mut self, destination: FieldPath) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn skip_nulls(mut self, skip: bool) -> Self {
        self.skip_nulls = skip;
        self
    }

    pub fn apply(&self, tree: &mut Value) -> ReshapeResult<PivotOutcome> {
        let destination = self.destination.as_ref().map(FieldPath::segments);
        if self.skip_nulls {
            pivot_map_to_list_with(tree, self.path.segments(), destination, keep_non_null)
        } else {
            pivot_map_to_list_with(tree, self.path.segments(), destination, keep_all)
        }
    }
}
