//! The in-memory key-value mapping.
//!
//! Nothing in here touches disk. The [`JsonVault`](crate::JsonVault) keeps a
//! `Store` behind its lock and hands snapshots of it to the flush path.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Insertion-ordered mapping from non-empty string keys to JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    map: Map<String, Value>,
}

/// One key-value pair, as returned by [`Store::entries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// The key.
    pub key: String,
    /// The value stored under it.
    pub value: Value,
}

pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::empty_key());
    }
    Ok(())
}

impl Store {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-loaded map. Entries with an empty key are dropped since
    /// no operation could ever address them.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        map.retain(|k, _| !k.is_empty());
        Self { map }
    }

    /// Borrow the value for `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Result<Option<&Value>> {
        check_key(key)?;
        Ok(self.map.get(key))
    }

    /// `true` if the key exists.
    pub fn has(&self, key: &str) -> Result<bool> {
        check_key(key)?;
        Ok(self.map.contains_key(key))
    }

    /// Overwrite the value at `key`, returning the previous one.
    pub fn set(&mut self, key: String, value: Value) -> Result<Option<Value>> {
        check_key(&key)?;
        Ok(self.map.insert(key, value))
    }

    /// Remove `key`. `Some` means it existed.
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        check_key(key)?;
        // shift_remove keeps the remaining keys in insertion order
        Ok(self.map.shift_remove(key))
    }

    /// Ordered pairs, at most `limit` of them when `limit > 0`, otherwise all.
    pub fn entries(&self, limit: usize) -> Vec<Entry> {
        let take = if limit > 0 { limit } else { self.map.len() };
        self.map
            .iter()
            .take(take)
            .map(|(k, v)| Entry {
                key: k.clone(),
                value: v.clone(),
            })
            .collect()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` when there are no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub(crate) fn as_map(&self) -> &Map<String, Value> {
        &self.map
    }
}
