//! Horizon Listing - paged, sortable, searchable listings of keyed items.
//!
//! A [`Listing`] renders the entries of a [`ListingSource`] into an
//! [`ItemGroup`] and keeps it in step with a set of search parameters.
//! Optional capabilities add behaviour on top of the base:
//!
//! - **Selectable**: per-item selection with an "all selected" state
//! - **Sorted**: sort column and order, with head and menu affordances
//! - **Searchable**: a search field that can switch the sort to relevance
//! - **Paged**: regular or streamed paging with page navigation
//!
//! Two sources ship with the crate: [`ApiSource`] for JSON APIs and
//! [`StoreSource`] for local stores such as [`MemoryStore`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use horizon_listing::prelude::*;
//!
//! # async fn run() -> horizon_listing::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let listing = ListingBuilder::new("people", StoreSource::new(store))
//!     .selectable()
//!     .searchable(SearchableConfig::default())
//!     .paged(PagedConfig::default())
//!     .build()?;
//! listing.load().await?;
//! listing.search("ada").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
mod builder;
pub mod capability;
mod config;
mod error;
mod events;
mod items;
mod listing;
mod paging;
pub mod params;
pub mod prelude;
pub mod process;
mod source;
pub mod store;

pub use api::{ApiListing, ApiSource, ApiSourceBuilder, Endpoints};
pub use builder::ListingBuilder;
pub use config::ListingConfig;
pub use error::{ListingError, Result};
pub use events::{ListingEvent, Origin};
pub use items::{ItemGroup, ItemKey, ListingItem, NameAllocator, SequentialNameAllocator};
pub use listing::{Listing, SetParamsOptions};
pub use paging::{PageRangeOrientation, PagingCalculator, PagingChange, PagingState};
pub use source::{
    ApplyContext, CustomParam, ListingMetadata, ListingSource, ReloadPlan, SourcePage,
};
pub use store::{
    LocalStore, MemoryStore, MemoryStoreParams, StoreEvent, StoreListing, StoreQueryResult, StoreSize,
    StoreSource,
};

pub use horizon_listing_core::{CancellationToken, ConnectionGuard, ConnectionId, Signal};
