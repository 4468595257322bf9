//! Commonly used types.
//!
//! ```
//! use horizon_listing::prelude::*;
//! ```

pub use crate::capability::{
    Capability, CapabilityKind, NavTarget, Paged, PagedConfig, PagingMethod, Searchable,
    SearchableConfig, Selectable, SelectionCount, SortOrder, Sorted, SortedConfig,
};
pub use crate::params::{Control, ParamConfig, ParamKind, ParamOption, ParamValue, SearchParams};
pub use crate::{
    ApiListing, ApiSource, ItemKey, Listing, ListingBuilder, ListingConfig, ListingError,
    ListingEvent, ListingItem, ListingSource, LocalStore, MemoryStore, MemoryStoreParams, Origin,
    SetParamsOptions, StoreListing, StoreSource,
};
