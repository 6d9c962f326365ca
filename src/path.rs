//! Field paths and the two ways of walking them.
//!
//! Reads are tolerant: a missing key, a null value or a non-map node simply
//! ends the walk. Writes are strict: every intermediate node must be a map
//! that is already present, otherwise a [`ReshapeError::Navigation`] is raised.

use crate::error::{ReshapeError, ReshapeResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// An ordered sequence of map keys, resolved from the root of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "PathRepr", into = "Vec<String>")]
pub struct FieldPath(Vec<String>);

/// Paths may be written as `"a.b.c"` or as `["a", "b", "c"]` in config files.
/// The list form is the only way to address keys that contain a dot.
#[derive(Deserialize)]
#[serde(untagged)]
enum PathRepr {
    Dotted(String),
    Segments(Vec<String>),
}

impl From<PathRepr> for FieldPath {
    fn from(repr: PathRepr) -> Self {
        match repr {
            PathRepr::Dotted(s) => FieldPath::parse(&s),
            PathRepr::Segments(segments) => FieldPath(segments),
        }
    }
}

impl From<FieldPath> for Vec<String> {
    fn from(path: FieldPath) -> Self {
        path.0
    }
}

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath(segments.into_iter().map(Into::into).collect())
    }

    /// Split a dotted path. Empty input yields an empty path.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return FieldPath::default();
        }
        FieldPath::new(dotted.split('.'))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldPath::parse(s))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FieldPath::new(iter)
    }
}

/// Tolerant descent to the map that owns the last segment of `path`.
///
/// Returns `None` if the root or any intermediate node is absent, null or not
/// a map. An empty path has no owning map.
pub fn parent_map_mut<'a, S: AsRef<str>>(
    root: &'a mut Value,
    path: &[S],
) -> Option<&'a mut Map<String, Value>> {
    let (_, parents) = path.split_last()?;
    let mut current = root;
    for segment in parents {
        current = match current.as_object_mut()?.get_mut(segment.as_ref()) {
            Some(next) if !next.is_null() => next,
            _ => return None,
        };
    }
    current.as_object_mut()
}

/// Strict check that every node leading to the last segment of `path` is a
/// present map. Nothing is mutated.
pub fn require_parent_map<S: AsRef<str>>(root: &Value, path: &[S]) -> ReshapeResult<()> {
    let Some((_, parents)) = path.split_last() else {
        return Err(ReshapeError::navigation(path, "", "an empty path"));
    };
    let mut current = root.as_object().ok_or_else(|| not_a_map(path, "<root>"))?;
    for segment in parents {
        let segment = segment.as_ref();
        current = match current.get(segment) {
            None => return Err(ReshapeError::navigation(path, segment, "missing")),
            Some(Value::Object(next)) => next,
            Some(_) => return Err(not_a_map(path, segment)),
        };
    }
    Ok(())
}

/// Strict descent to the map that owns the last segment of `path`, returning
/// that map together with the last segment.
pub fn parent_map_strict<'a, 'p, S: AsRef<str>>(
    root: &'a mut Value,
    path: &'p [S],
) -> ReshapeResult<(&'a mut Map<String, Value>, &'p str)> {
    let Some((last, parents)) = path.split_last() else {
        return Err(ReshapeError::navigation(path, "", "an empty path"));
    };
    let mut current = root.as_object_mut().ok_or_else(|| not_a_map(path, "<root>"))?;
    for segment in parents {
        let segment = segment.as_ref();
        current = match current.get_mut(segment) {
            None => return Err(ReshapeError::navigation(path, segment, "missing")),
            Some(Value::Object(next)) => next,
            Some(_) => return Err(not_a_map(path, segment)),
        };
    }
    Ok((current, last.as_ref()))
}

fn not_a_map<S: AsRef<str>>(path: &[S], segment: &str) -> ReshapeError {
    ReshapeError::navigation(path, segment, "not a map")
}
