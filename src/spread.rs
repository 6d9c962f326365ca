//! Partition key spreading.
//!
//! Copies selected top-level fields of a record into every map that is an
//! element of a list, at any depth, so the partition identity survives when
//! lists are later exploded into their own tables.

use serde_json::{Map, Value};

/// Inject the root values of `keys` into every list-element map of `tree`.
///
/// Keys missing from the root are spread as null. Maps that are not list
/// elements, the root included, are never injected into. A non-map root
/// leaves the tree untouched.
pub fn spread_partition_keys<S: AsRef<str>>(tree: &mut Value, keys: &[S]) {
    let Value::Object(root) = tree else {
        return;
    };

    let captured: Vec<(String, Value)> = keys
        .iter()
        .map(|key| {
            let key = key.as_ref();
            (key.to_string(), root.get(key).cloned().unwrap_or(Value::Null))
        })
        .collect();

    walk(tree, &captured);
}

fn walk(node: &mut Value, captured: &[(String, Value)]) {
    match node {
        Value::Array(items) => {
            for item in items.iter_mut() {
                match item {
                    Value::Object(element) => {
                        inject(element, captured);
                        walk_children(element, captured, true);
                    }
                    other => walk(other, captured),
                }
            }
        }
        Value::Object(map) => walk_children(map, captured, false),
        _ => {}
    }
}

// Injected values are copies of root data and are not walked again.
fn walk_children(map: &mut Map<String, Value>, captured: &[(String, Value)], injected: bool) {
    for (key, child) in map.iter_mut() {
        if injected && captured.iter().any(|(k, _)| k == key) {
            continue;
        }
        walk(child, captured);
    }
}

fn inject(element: &mut Map<String, Value>, captured: &[(String, Value)]) {
    for (key, value) in captured {
        element.insert(key.clone(), value.clone());
    }
}
