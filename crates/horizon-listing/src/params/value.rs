//! Parameter values and parameter maps.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The value of a single search parameter.
///
/// `Unset` plays the role of "undefined": the parameter is recognized but
/// carries no value and is omitted from outgoing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// No value.
    #[default]
    Unset,
    /// An integer value (page numbers, page sizes).
    Number(i64),
    /// A text value (sort field, order, search query).
    Text(String),
}

static UNSET: ParamValue = ParamValue::Unset;

impl ParamValue {
    /// Returns true unless the value is `Unset`.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Returns true for `Unset` and for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// The text value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The numeric value. Numeric text is parsed as well.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Unset => None,
        }
    }

    /// The value as it appears in a query string, `None` when unset.
    pub fn to_query(&self) -> Option<String> {
        match self {
            Self::Unset => None,
            Self::Number(n) => Some(n.to_string()),
            Self::Text(text) => Some(text.clone()),
        }
    }

    /// Convert a JSON value coming from an API or a store.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Unset,
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(n) => Self::Number(n),
                None => Self::Text(n.to_string()),
            },
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::Number(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A mapping from parameter name to value.
///
/// Used both for full snapshots (every recognized parameter) and for the
/// partial patches passed to `set_search_params`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(BTreeMap<String, ParamValue>);

impl SearchParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a value; missing names read as `Unset`.
    pub fn get(&self, name: &str) -> &ParamValue {
        self.0.get(name).unwrap_or(&UNSET)
    }

    /// Shorthand for `get(name).as_text()`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).as_text()
    }

    /// Shorthand for `get(name).as_number()`.
    pub fn number(&self, name: &str) -> Option<i64> {
        self.get(name).as_number()
    }

    /// Set a value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Remove a name entirely.
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.0.remove(name)
    }

    /// Whether the map has an entry for `name` (even an `Unset` one).
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Overwrite entries with the ones from `other`.
    pub fn merge(&mut self, other: &SearchParams) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// A copy of `self` with `other` merged on top.
    pub fn merged(&self, other: &SearchParams) -> SearchParams {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
