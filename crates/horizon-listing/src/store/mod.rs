//! Listings backed by a local store.
//!
//! The store answers queries for resolved parameters and announces its own
//! changes on a signal. Announcements are queued and replayed against the
//! listing by [`Listing::process_store_events`], which patches the rendered
//! items in place when it can and reloads otherwise.

mod memory;

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use horizon_listing_core::logging::targets;
use horizon_listing_core::{CancellationToken, ConnectionGuard, Signal};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

pub use memory::{MemoryStore, MemoryStoreParams};

use crate::error::Result;
use crate::events::Origin;
use crate::items::{ItemKey, ListingItem};
use crate::listing::{Listing, SetParamsOptions};
use crate::params::SearchParams;
use crate::source::{ApplyContext, ListingSource, SourcePage};

/// A listing over a local store.
pub type StoreListing<St> = Listing<StoreSource<St>>;

/// Size of a store, possibly only known after some work.
pub enum StoreSize {
    Known(usize),
    Deferred(BoxFuture<'static, Result<usize>>),
}

impl std::fmt::Debug for StoreSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(size) => f.debug_tuple("Known").field(size).finish(),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Answer of a store query.
#[derive(Debug, Clone, Default)]
pub struct StoreQueryResult {
    /// The requested page, in order.
    pub entries: Vec<(ItemKey, Value)>,
    /// Matching entries across all pages.
    pub total: usize,
    /// Parameters the store actually applied.
    pub applied_params: SearchParams,
}

/// A change announced by a store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// An entry was added at `position` of the store's order.
    Add {
        key: ItemKey,
        element: Value,
        position: usize,
    },
    Delete {
        key: ItemKey,
        total: usize,
    },
    DeleteMany {
        keys: Vec<ItemKey>,
        total: usize,
    },
    /// Keys a listing may still render no longer exist in the store.
    DeleteNotFound {
        keys: Vec<ItemKey>,
        total: usize,
    },
}

/// A local data store a listing can query.
pub trait LocalStore: Send + Sync + 'static {
    fn size(&self) -> StoreSize;

    /// Filter, order, and page the store's entries.
    fn apply_search_params(
        &self,
        params: &SearchParams,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<StoreQueryResult>> + Send;

    /// Signal announcing the store's changes.
    fn events(&self) -> &Signal<StoreEvent>;
}

/// [`ListingSource`] adapter for a [`LocalStore`].
pub struct StoreSource<St: LocalStore> {
    store: Arc<St>,
    queue: Mutex<mpsc::UnboundedReceiver<StoreEvent>>,
    _connection: ConnectionGuard<StoreEvent>,
}

impl<St: LocalStore> StoreSource<St> {
    /// Wrap `store`, queueing its events from now on.
    pub fn new(store: Arc<St>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection = store.events().connect_scoped(move |event: &StoreEvent| {
            if sender.send(event.clone()).is_err() {
                tracing::trace!(target: targets::STORE, "store event dropped, queue closed");
            }
        });
        Self {
            store,
            queue: Mutex::new(receiver),
            _connection: connection,
        }
    }

    pub fn store(&self) -> &Arc<St> {
        &self.store
    }

    fn next_event(&self) -> Option<StoreEvent> {
        self.queue.lock().try_recv().ok()
    }
}

impl<St: LocalStore> ListingSource for StoreSource<St> {
    async fn set_params_request(&self, params: &SearchParams, ctx: &ApplyContext) -> Result<SourcePage> {
        tracing::trace!(target: targets::STORE, process = %ctx.process.id(), "querying store");
        let result = self
            .store
            .apply_search_params(params, ctx.process.token())
            .await?;
        Ok(SourcePage {
            entries: result
                .entries
                .into_iter()
                .map(|(key, value)| ListingItem { key, value })
                .collect(),
            total: Some(to_total(result.total)),
            applied_params: result.applied_params,
            metadata: None,
        })
    }

    async fn prepare(&self) -> Result<Option<usize>> {
        match self.store.size() {
            StoreSize::Known(size) => Ok(Some(size)),
            StoreSize::Deferred(size) => {
                tracing::debug!(target: targets::STORE, "waiting for deferred store size");
                size.await.map(Some)
            }
        }
    }
}

fn to_total(total: usize) -> i64 {
    i64::try_from(total).unwrap_or(i64::MAX)
}

impl<St: LocalStore> Listing<StoreSource<St>> {
    /// Replay queued store events. Returns how many were applied.
    pub async fn process_store_events(&self) -> Result<usize> {
        let mut applied = 0;
        while let Some(event) = self.source().next_event() {
            self.apply_store_event(event).await?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Reflect one store change in the rendered items.
    pub async fn apply_store_event(&self, event: StoreEvent) -> Result<()> {
        tracing::debug!(target: targets::STORE, listing = %self.name(), ?event, "applying store event");
        match event {
            StoreEvent::Add {
                key,
                element,
                position,
            } => self.store_added(ListingItem::new(key, element), position).await,
            StoreEvent::Delete { key, total } => self.store_deleted(&[key], total).await,
            StoreEvent::DeleteMany { keys, total } => self.store_deleted(&keys, total).await,
            StoreEvent::DeleteNotFound { keys, total } => {
                self.remove_items(&keys);
                if !self.in_store_order() {
                    return self.store_reload().await;
                }
                self.set_total(to_total(total))?;
                Ok(())
            }
        }
    }

    /// Whether the rendered items are the store's entries in store order,
    /// unfiltered. Only then do store positions and totals describe the
    /// rendered window.
    fn in_store_order(&self) -> bool {
        let params = self.search_params();
        let paging: Vec<&str> = self
            .paged()
            .map(|paged| vec![paged.page_param(), paged.per_page_param()])
            .unwrap_or_default();
        let sorted = self.sorted();
        let sort_set = sorted.is_some_and(|sorted| !params.get(sorted.sort_param()).is_blank());
        let order_param = sorted.map(|sorted| sorted.order_param());
        params.iter().all(|(name, value)| {
            value.is_blank() || paging.contains(&name) || (!sort_set && order_param == Some(name))
        })
    }

    async fn store_added(&self, item: ListingItem, position: usize) -> Result<()> {
        if !self.in_store_order() {
            return self.store_reload().await;
        }
        let Some(paged) = self.paged().cloned() else {
            self.insert_item_at(position, item);
            return Ok(());
        };
        let total = paged.paging().total();
        let start = paged.window_start();
        let capacity = paged.window_capacity();
        let rendered = self.item_count();
        self.set_total(to_total(total + 1))?;

        if position < start {
            return self.store_reload().await;
        }
        let index = position - start;
        if index <= rendered && index < capacity {
            self.insert_item_at(index, item);
            if self.item_count() > capacity {
                self.truncate_items(capacity);
            }
        }
        Ok(())
    }

    async fn store_deleted(&self, keys: &[ItemKey], total: usize) -> Result<()> {
        if !self.in_store_order() {
            self.remove_items(keys);
            return self.store_reload().await;
        }
        let multi_page = self
            .paged()
            .is_some_and(|paged| paged.paging().page_count() > 1);
        self.set_total(to_total(total))?;
        if multi_page {
            return self.store_reload().await;
        }
        self.remove_items(keys);
        Ok(())
    }

    async fn store_reload(&self) -> Result<()> {
        let options = SetParamsOptions {
            force_when_matching: true,
            origin: Origin::Store,
        };
        match self.set_search_params(SearchParams::new(), options).await {
            Err(err) if err.is_aborted() => Ok(()),
            result => result.map(drop),
        }
    }
}
