//! Optional listing behaviours.
//!
//! Each capability contributes parameter declarations, adjusts requests
//! before they are resolved, and observes applied parameters and item
//! insertions/removals. Capabilities adjust requests in an explicit order
//! (see [`DEFAULT_ADJUST_ORDER`]) so that interplay such as "a new search
//! switches the sort to relevance" composes predictably.

mod paged;
mod searchable;
mod selectable;
mod sorted;

use std::collections::BTreeSet;

use serde::Deserialize;

pub use paged::{NavButton, NavTarget, Paged, PagedConfig, PagingMethod};
pub use searchable::{Searchable, SearchableConfig};
pub use selectable::{Selectable, SelectionControls, SelectionCount};
pub use sorted::{HeadAffordance, HeadColumn, SortColumn, SortOrder, Sorted, SortedConfig};

use crate::events::Origin;
use crate::items::ItemKey;
use crate::params::{ParamConfig, ParamValue, SearchParams};
use crate::source::{ListingMetadata, ReloadPlan};

/// Identifies a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Selectable,
    Sorted,
    Searchable,
    Paged,
}

/// Order in which capabilities adjust a request unless configured otherwise.
///
/// Search runs first so its sort override is visible to sorting, and paging
/// runs last so it sees every other change.
pub const DEFAULT_ADJUST_ORDER: [CapabilityKind; 4] = [
    CapabilityKind::Searchable,
    CapabilityKind::Sorted,
    CapabilityKind::Paged,
    CapabilityKind::Selectable,
];

/// A parameter request being resolved.
#[derive(Debug)]
pub struct ParamRequest<'a> {
    partial: &'a SearchParams,
    applied: &'a SearchParams,
    base: &'a SearchParams,
    params: SearchParams,
    origin: Origin,
}

impl<'a> ParamRequest<'a> {
    /// `partial` resolved onto `base`, the newest known parameters.
    pub(crate) fn new(
        partial: &'a SearchParams,
        applied: &'a SearchParams,
        base: &'a SearchParams,
        origin: Origin,
    ) -> Self {
        Self {
            partial,
            applied,
            base,
            params: base.merged(partial),
            origin,
        }
    }

    /// What the caller asked for.
    pub fn partial(&self) -> &SearchParams {
        self.partial
    }

    /// The last applied snapshot.
    pub fn applied(&self) -> &SearchParams {
        self.applied
    }

    /// What `partial` was merged onto: the in-flight cycle's parameters
    /// when one is pending, otherwise the applied snapshot.
    pub fn base(&self) -> &SearchParams {
        self.base
    }

    /// The resolved parameters so far.
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn get(&self, name: &str) -> &ParamValue {
        self.params.get(name)
    }

    /// Overwrite a resolved value.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.params.set(name, value);
    }

    /// Whether the caller named `name` explicitly.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.partial.contains(name)
    }

    /// Whether the resolved value of `name` differs from the base one.
    pub fn changed(&self, name: &str) -> bool {
        self.params.get(name) != self.base.get(name)
    }

    pub(crate) fn into_params(self) -> SearchParams {
        self.params
    }
}

/// What a completed apply cycle produced.
#[derive(Debug, Clone, Copy)]
pub struct AppliedParams<'a> {
    pub params: &'a SearchParams,
    pub initiators: &'a BTreeSet<String>,
    /// New total, when the cycle reported one.
    pub total: Option<i64>,
    pub plan: ReloadPlan,
}

/// A behaviour mixed into a listing.
pub trait Capability: Send + Sync {
    fn kind(&self) -> CapabilityKind;

    /// Parameters this capability needs registered.
    fn param_configs(&self) -> Vec<ParamConfig> {
        Vec::new()
    }

    /// Adjust a request before it is compared with the applied snapshot.
    fn adjust_request(&self, _request: &mut ParamRequest<'_>) {}

    /// Observe a completed apply cycle.
    fn params_applied(&self, _applied: &AppliedParams<'_>) {}

    /// Observe insertions. `item_count` is the rendered count afterwards.
    fn items_inserted(&self, _keys: &[ItemKey], _item_count: usize) {}

    /// Observe removals. `item_count` is the rendered count afterwards.
    fn items_removed(&self, _keys: &[ItemKey], _item_count: usize) {}

    /// Observe source metadata.
    fn metadata_loaded(&self, _metadata: &ListingMetadata) {}

    /// Override the enabled state of the control bound to `param`.
    fn control_enabled(&self, _param: &str) -> Option<bool> {
        None
    }
}
