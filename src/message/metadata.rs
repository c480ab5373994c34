// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::Serialize;

use super::Value;

/// Separator used to address nested metadata keys, e.g. `root/child/leaf`.
pub const PATH_SEPARATOR: char = '/';

/// Insertion-ordered metadata tree attached to every message.
///
/// Keys passed to the accessors are paths: `a/b` addresses key `b` inside the map
/// stored at key `a`. Writing to a path creates the intermediate maps and replaces
/// any non-map value that is in the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(IndexMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split(PATH_SEPARATOR);
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_map()?.0.get(part)?;
        }
        Some(current)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut parts = path.split(PATH_SEPARATOR);
        let mut current = self.0.get_mut(parts.next()?)?;
        for part in parts {
            current = current.as_map_mut()?.0.get_mut(part)?;
        }
        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Store `value` at `path`, creating intermediate maps as needed.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        match path.split_once(PATH_SEPARATOR) {
            None => {
                self.0.insert(path.to_string(), value.into());
            }
            Some((head, rest)) => self.child_map(head).set(rest, value),
        }
    }

    /// Remove the value at `path`, returning it if it existed.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        match path.split_once(PATH_SEPARATOR) {
            None => self.0.shift_remove(path),
            Some((head, rest)) => self.0.get_mut(head)?.as_map_mut()?.remove(rest),
        }
    }

    /// Mutable access to the map stored at `path`.
    ///
    /// Missing nodes are created and non-map nodes are replaced by an empty map.
    pub fn force_map(&mut self, path: &str) -> &mut Metadata {
        match path.split_once(PATH_SEPARATOR) {
            None => self.child_map(path),
            Some((head, rest)) => self.child_map(head).force_map(rest),
        }
    }

    pub fn get_bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.get(path).map(Value::as_bytes)
    }

    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).map(Value::as_string)
    }

    /// Copy all entries of `other` into this map, overwriting existing keys.
    pub fn merge(&mut self, other: Metadata) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    fn child_map(&mut self, key: &str) -> &mut Metadata {
        let entry = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Value::Map(Metadata::new()));
        if !matches!(entry, Value::Map(_)) {
            *entry = Value::Map(Metadata::new());
        }
        match entry {
            Value::Map(map) => map,
            _ => unreachable!("entry was replaced by a map above"),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Metadata {
    fn from(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
