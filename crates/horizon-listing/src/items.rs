//! Rendered items and element naming.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Stable key of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key from a JSON scalar. Strings and numbers only.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self(s.clone())),
            serde_json::Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<i64> for ItemKey {
    fn from(key: i64) -> Self {
        Self(key.to_string())
    }
}

/// A rendered entry: its key and value.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    pub key: ItemKey,
    pub value: serde_json::Value,
}

impl ListingItem {
    pub fn new(key: impl Into<ItemKey>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Ordered collection of rendered items, unique by key.
#[derive(Debug, Clone)]
pub struct ItemGroup {
    element_name: String,
    items: Vec<ListingItem>,
}

impl ItemGroup {
    pub fn new(element_name: impl Into<String>) -> Self {
        Self {
            element_name: element_name.into(),
            items: Vec::new(),
        }
    }

    /// Element name shared by every item of this group.
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ListingItem] {
        &self.items
    }

    pub fn keys(&self) -> Vec<ItemKey> {
        self.items.iter().map(|item| item.key.clone()).collect()
    }

    pub fn get(&self, key: &ItemKey) -> Option<&ListingItem> {
        self.items.iter().find(|item| &item.key == key)
    }

    pub fn position(&self, key: &ItemKey) -> Option<usize> {
        self.items.iter().position(|item| &item.key == key)
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.position(key).is_some()
    }

    /// Append an item. An item with the same key is updated in place.
    ///
    /// Returns true if a new key was added.
    pub fn push(&mut self, item: ListingItem) -> bool {
        let index = self.items.len();
        self.insert(index, item)
    }

    /// Insert at `index` (clamped to the length). An item with the same key
    /// is updated in place instead.
    ///
    /// Returns true if a new key was added.
    pub fn insert(&mut self, index: usize, item: ListingItem) -> bool {
        if let Some(existing) = self.items.iter_mut().find(|i| i.key == item.key) {
            existing.value = item.value;
            return false;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        true
    }

    /// Remove the given keys, returning the ones that were present.
    pub fn remove(&mut self, keys: &[ItemKey]) -> Vec<ItemKey> {
        let mut removed = Vec::new();
        self.items.retain(|item| {
            if keys.contains(&item.key) {
                removed.push(item.key.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Keep the first `len` items, returning the keys of the rest.
    pub fn truncate(&mut self, len: usize) -> Vec<ItemKey> {
        if len >= self.items.len() {
            return Vec::new();
        }
        self.items.drain(len..).map(|item| item.key).collect()
    }

    /// Remove everything, returning the removed keys.
    pub fn clear(&mut self) -> Vec<ItemKey> {
        self.truncate(0)
    }
}

/// Produces unique element names for item groups.
pub trait NameAllocator: Send + Sync {
    /// Return a name based on `base` that was not handed out before.
    fn allocate(&self, base: &str) -> String;
}

/// Allocator that appends `-2`, `-3`, … to repeated names.
#[derive(Debug, Default)]
pub struct SequentialNameAllocator {
    used: Mutex<HashMap<String, usize>>,
}

impl SequentialNameAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameAllocator for SequentialNameAllocator {
    fn allocate(&self, base: &str) -> String {
        let mut used = self.used.lock();
        let count = used.entry(base.to_string()).or_insert(0);
        *count += 1;
        match *count {
            1 => base.to_string(),
            n => format!("{base}-{n}"),
        }
    }
}
