//! The seam between a listing and where its items come from.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use crate::error::Result;
use crate::items::ListingItem;
use crate::params::{ParamOption, SearchParams};
use crate::process::Process;

/// How an apply cycle changes the rendered group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPlan {
    /// Clear everything and render the fetched page.
    Replace,
    /// Keep what is rendered and append the fetched page.
    Append,
    /// Keep the first `keep` items and drop the rest, with no fetch.
    TrimTail { keep: usize },
}

/// Per-cycle context handed to a source.
#[derive(Debug, Clone)]
pub struct ApplyContext {
    /// Names whose value changed relative to the applied snapshot.
    pub initiators: BTreeSet<String>,
    /// The cycle's process. Sources pass its token to their I/O.
    pub process: Process,
    pub plan: ReloadPlan,
    /// Absolute index of the first entry this cycle fetches.
    pub offset: usize,
}

/// A parameter declared by the source at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomParam {
    pub name: String,
    pub values: Vec<ParamOption>,
}

/// Option sets and labels reported by a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingMetadata {
    pub sort_values: Option<Vec<ParamOption>>,
    pub per_page_values: Option<Vec<ParamOption>>,
    pub relevance_key: Option<String>,
    pub titles: BTreeMap<String, String>,
    pub custom_params: Vec<CustomParam>,
}

/// Result of one source fetch.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    /// Entries in render order.
    pub entries: Vec<ListingItem>,
    /// Total item count across all pages, when known.
    pub total: Option<i64>,
    /// Parameter values the source actually applied.
    pub applied_params: SearchParams,
    pub metadata: Option<ListingMetadata>,
}

/// Where a listing's items come from.
///
/// The listing decides what to fetch and renders the result; a source only
/// performs the fetch for the resolved parameters.
pub trait ListingSource: Send + Sync + 'static {
    /// Fetch the entries for `params`.
    ///
    /// Long-running work must observe `ctx.process.token()` and resolve with
    /// [`ListingError::Aborted`](crate::ListingError::Aborted) once it fires.
    fn set_params_request(
        &self,
        params: &SearchParams,
        ctx: &ApplyContext,
    ) -> impl Future<Output = Result<SourcePage>> + Send;

    /// Resolve the total before the first apply, when the source knows it.
    fn prepare(&self) -> impl Future<Output = Result<Option<usize>>> + Send {
        async { Ok(None) }
    }

    /// Whether trailing items can be dropped without refetching.
    fn supports_partial_removal(&self) -> bool {
        true
    }
}
