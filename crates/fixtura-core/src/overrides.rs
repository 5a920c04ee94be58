use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::descriptor::kind_name;
use crate::error::{Error, Result};

/// Separator between segments of a nested override path.
pub const PATH_SEPARATOR: char = '.';

/// Caller-pinned field values, keyed by field key or dotted path.
///
/// Keys are kept sorted so nested overrides are applied in a stable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    values: BTreeMap<String, Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Overrides::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Overrides that reach into nested values.
    pub fn paths(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().filter(|(key, _)| is_path(key))
    }
}

impl From<Map<String, Value>> for Overrides {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

pub fn is_path(key: &str) -> bool {
    key.contains(PATH_SEPARATOR)
}

/// First segment of `key`, i.e. the top-level field it addresses.
pub fn root_key(key: &str) -> &str {
    key.split(PATH_SEPARATOR).next().unwrap_or(key)
}

/// Write `value` at the dotted `path` inside `target`.
///
/// Object segments must name an existing key and array segments must be an
/// in-range index; the shape of `target` is never extended.
pub fn set_path(target: &mut Map<String, Value>, path: &str, value: Value) -> Result<()> {
    let mut segments = path.split(PATH_SEPARATOR);
    let first = segments.next().unwrap_or(path);
    let mut current = target
        .get_mut(first)
        .ok_or_else(|| invalid(path, format!("no field named '{first}'")))?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map
                .get_mut(segment)
                .ok_or_else(|| invalid(path, format!("no field named '{segment}'")))?,
            Value::Array(items) => {
                let len = items.len();
                let index: usize = segment
                    .parse()
                    .map_err(|_| invalid(path, format!("'{segment}' is not an index")))?;
                items.get_mut(index).ok_or_else(|| {
                    invalid(path, format!("index {index} out of range (len {len})"))
                })?
            }
            other => {
                return Err(invalid(
                    path,
                    format!("cannot descend into {} at '{segment}'", kind_name(other)),
                ));
            }
        };
    }

    *current = value;
    Ok(())
}

fn invalid(path: &str, reason: String) -> Error {
    Error::InvalidPath {
        path: path.to_string(),
        reason,
    }
}
