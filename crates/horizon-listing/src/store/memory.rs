//! In-memory store.

use std::cmp::Ordering;

use horizon_listing_core::{CancellationToken, Signal};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;

use super::{LocalStore, StoreEvent, StoreQueryResult, StoreSize};
use crate::config::ListingConfig;
use crate::error::{ListingError, Result};
use crate::items::ItemKey;
use crate::paging::PagingState;
use crate::params::SearchParams;

/// Parameter names a [`MemoryStore`] reads from a query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryStoreParams {
    pub search: String,
    pub sort: String,
    pub order: String,
    pub page: String,
    pub per_page: String,
}

impl Default for MemoryStoreParams {
    fn default() -> Self {
        Self {
            search: "search".to_string(),
            sort: "sort".to_string(),
            order: "order".to_string(),
            page: "page".to_string(),
            per_page: "per_page".to_string(),
        }
    }
}

impl MemoryStoreParams {
    /// The names a listing built from `config` sends.
    pub fn from_config(config: &ListingConfig) -> Self {
        let mut names = Self::default();
        if let Some(search) = &config.search {
            names.search = search.param.clone();
            names.sort = search.sort_param.clone();
            names.order = search.order_param.clone();
            names.page = search.page_param.clone();
        }
        if let Some(sorting) = &config.sorting {
            names.sort = sorting.sort_param.clone();
            names.order = sorting.order_param.clone();
        }
        if let Some(paging) = &config.paging {
            names.page = paging.page_param.clone();
            names.per_page = paging.per_page_param.clone();
        }
        names
    }
}

/// A [`LocalStore`] holding JSON entries in memory.
///
/// Understands a search text (case-insensitive substring over string and
/// number fields), a sort field with `asc` or `desc` order, and a page with
/// its size. The parameter names default to `search`, `sort`, `order`,
/// `page` and `per_page`; see [`MemoryStore::with_params`].
pub struct MemoryStore {
    entries: RwLock<Vec<(ItemKey, Value)>>,
    events: Signal<StoreEvent>,
    params: MemoryStoreParams,
    deferred_size: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_entries(Vec::new())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (ItemKey, Value)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
            events: Signal::new(),
            params: MemoryStoreParams::default(),
            deferred_size: false,
        }
    }

    /// Read queries under different parameter names.
    pub fn with_params(mut self, params: MemoryStoreParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &MemoryStoreParams {
        &self.params
    }

    /// Report the size through a deferred future.
    pub fn with_deferred_size(mut self) -> Self {
        self.deferred_size = true;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Append an entry.
    pub fn add(&self, key: impl Into<ItemKey>, value: Value) {
        let position = self.len();
        self.insert(position, key, value);
    }

    /// Insert an entry at `position` (clamped).
    pub fn insert(&self, position: usize, key: impl Into<ItemKey>, value: Value) {
        let key = key.into();
        let position = {
            let mut entries = self.entries.write();
            let position = position.min(entries.len());
            entries.insert(position, (key.clone(), value.clone()));
            position
        };
        self.events.emit(StoreEvent::Add {
            key,
            element: value,
            position,
        });
    }

    /// Delete one entry. Returns false if it did not exist.
    pub fn delete(&self, key: &ItemKey) -> bool {
        let (found, total) = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|(k, _)| k != key);
            (entries.len() != before, entries.len())
        };
        let event = if found {
            StoreEvent::Delete {
                key: key.clone(),
                total,
            }
        } else {
            StoreEvent::DeleteNotFound {
                keys: vec![key.clone()],
                total,
            }
        };
        self.events.emit(event);
        found
    }

    /// Delete several entries. Returns how many existed.
    pub fn delete_many(&self, keys: &[ItemKey]) -> usize {
        let (found, missing, total) = {
            let mut entries = self.entries.write();
            let (found, missing): (Vec<ItemKey>, Vec<ItemKey>) = keys
                .iter()
                .cloned()
                .partition(|key| entries.iter().any(|(k, _)| k == key));
            entries.retain(|(k, _)| !found.contains(k));
            (found, missing, entries.len())
        };
        let count = found.len();
        if !found.is_empty() {
            self.events.emit(StoreEvent::DeleteMany { keys: found, total });
        }
        if !missing.is_empty() {
            self.events.emit(StoreEvent::DeleteNotFound { keys: missing, total });
        }
        count
    }

    fn query(&self, params: &SearchParams) -> Result<StoreQueryResult> {
        let names = &self.params;
        let mut rows: Vec<(ItemKey, Value)> = self.entries.read().clone();

        if let Some(needle) = params.text(&names.search).map(str::to_lowercase).filter(|s| !s.is_empty()) {
            rows.retain(|(_, value)| contains_text(value, &needle));
        }
        if let Some(field) = params.text(&names.sort) {
            rows.sort_by(|(_, a), (_, b)| compare(&a[field], &b[field]));
            if params.text(&names.order) == Some("desc") {
                rows.reverse();
            }
        }

        let total = rows.len();
        let per_page = match params.number(&names.per_page) {
            Some(n) => usize::try_from(n)
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ListingError::Store(format!("invalid {} {n}", names.per_page)))?,
            None => total.max(1),
        };
        let page = params
            .number(&names.page)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(1);
        let state = PagingState::new(total, per_page, page)?;

        let mut applied_params = params.clone();
        if params.contains(&names.page) {
            applied_params.set(names.page.as_str(), state.page.max(1));
        }
        let entries = rows
            .drain(state.offset_start()..state.offset_end())
            .collect();
        Ok(StoreQueryResult {
            entries,
            total,
            applied_params,
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("len", &self.len())
            .field("params", &self.params)
            .field("deferred_size", &self.deferred_size)
            .finish()
    }
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|item| contains_text(item, needle)),
        Value::Object(map) => map.values().any(|item| contains_text(item, needle)),
        _ => false,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

impl LocalStore for MemoryStore {
    fn size(&self) -> StoreSize {
        let size = self.len();
        if self.deferred_size {
            StoreSize::Deferred(Box::pin(async move {
                tokio::task::yield_now().await;
                Ok(size)
            }))
        } else {
            StoreSize::Known(size)
        }
    }

    async fn apply_search_params(
        &self,
        params: &SearchParams,
        token: &CancellationToken,
    ) -> Result<StoreQueryResult> {
        tokio::task::yield_now().await;
        if token.is_cancelled() {
            return Err(ListingError::Aborted);
        }
        self.query(params)
    }

    fn events(&self) -> &Signal<StoreEvent> {
        &self.events
    }
}
