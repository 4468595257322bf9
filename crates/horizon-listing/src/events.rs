//! Listing notifications.

use crate::capability::SelectionCount;
use crate::items::ItemKey;
use crate::params::SearchParams;

/// What triggered a parameter change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Application code.
    #[default]
    Programmatic,
    /// The search input.
    Search,
    /// A sort or order menu.
    Sort,
    /// A head-row column.
    HeadRow,
    /// Paging navigation or scroll loading.
    Paging,
    /// The page-size menu.
    PerPage,
    /// A local store change.
    Store,
}

/// Notifications emitted on a listing's event signal.
///
/// Every event is emitted after the listing's internal lock is released, so
/// slots may call back into the listing.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingEvent {
    /// A new apply cycle is about to run with these resolved params.
    RequestParams {
        params: SearchParams,
        initiators: Vec<String>,
        origin: Origin,
    },
    /// An apply cycle completed; `params` is the new applied snapshot.
    SearchParamsApplied {
        params: SearchParams,
        initiators: Vec<String>,
    },
    /// Items were added to the rendered group.
    ItemsInserted { keys: Vec<ItemKey> },
    /// Items were removed from the rendered group.
    ItemsRemoved { keys: Vec<ItemKey> },
    /// The rendered group became empty or non-empty.
    EmptyChanged { empty: bool },
    /// The selection count changed.
    SelectionChanged(SelectionCount),
    /// Source metadata (titles, option sets) was applied.
    MetadataLoaded,
}
