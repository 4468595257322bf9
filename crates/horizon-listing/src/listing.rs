//! The listing base: parameter negotiation, apply cycles, and population.
//!
//! Every change of search parameters goes through
//! [`Listing::set_search_params`]:
//!
//! 1. the partial request is merged onto the newest known parameters,
//! 2. capabilities adjust it in their configured order,
//! 3. the result is compared with the applied snapshot; an unchanged
//!    request is a no-op unless forced,
//! 4. a new [`Process`] supersedes any in-flight cycle,
//! 5. the source fetches and the listing renders the result, checking that
//!    the process is still current before touching the item group.
//!
//! Notifications are emitted after the internal lock is released.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use horizon_listing_core::logging::targets;
use horizon_listing_core::{ConnectionGuard, Signal};
use parking_lot::Mutex;

use crate::capability::{
    AppliedParams, Capability, NavTarget, Paged, ParamRequest, Searchable, Selectable,
    SelectionCount, SortOrder, Sorted,
};
use crate::error::{ListingError, Result};
use crate::events::{ListingEvent, Origin};
use crate::items::{ItemGroup, ItemKey, ListingItem};
use crate::params::{
    Control, ParamConfig, ParamKind, ParamRegistry, SearchParams, field_control, menu_control,
};
use crate::process::{Process, ProcessTracker, Settled, SettledReceiver, wait_settled};
use crate::source::{ApplyContext, ListingMetadata, ListingSource, ReloadPlan, SourcePage};

/// Options for [`Listing::set_search_params`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetParamsOptions {
    /// Run a cycle even when the request matches the applied snapshot.
    pub force_when_matching: bool,
    pub origin: Origin,
}

impl SetParamsOptions {
    /// Options that always run a cycle.
    pub fn forced() -> Self {
        Self {
            force_when_matching: true,
            origin: Origin::Programmatic,
        }
    }

    /// Options tagged with `origin`.
    pub fn from_origin(origin: Origin) -> Self {
        Self {
            force_when_matching: false,
            origin,
        }
    }
}

struct ListingInner {
    registry: ParamRegistry,
    items: ItemGroup,
    /// Resolved params of the in-flight cycle.
    pending: Option<SearchParams>,
    titles: BTreeMap<String, String>,
}

/// One apply cycle, resolved and started.
struct Cycle {
    process: Process,
    params: SearchParams,
    initiators: BTreeSet<String>,
    plan: ReloadPlan,
    offset: usize,
}

/// What a call to [`Listing::set_search_params`] turned into.
enum Start {
    Run(Cycle),
    /// The request matches the applied snapshot.
    Unchanged,
    /// The request matches the in-flight cycle; wait for its outcome.
    Join(Process, SettledReceiver),
}

/// Item-group changes to announce once the lock is released.
#[derive(Default)]
struct Mutation {
    inserted: Vec<ItemKey>,
    removed: Vec<ItemKey>,
    was_empty: bool,
    item_count: usize,
}

/// Resets the scroll-loading guard when dropped.
struct AdvanceGuard<'a>(&'a Paged);

impl Drop for AdvanceGuard<'_> {
    fn drop(&mut self) {
        self.0.end_advance();
    }
}

/// Parts assembled by [`ListingBuilder`](crate::ListingBuilder).
pub(crate) struct ListingParts<S> {
    pub name: String,
    pub element_name: String,
    pub source: S,
    pub registry: ParamRegistry,
    pub capabilities: Vec<Arc<dyn Capability>>,
    pub selectable: Option<Arc<Selectable>>,
    pub sorted: Option<Arc<Sorted>>,
    pub searchable: Option<Arc<Searchable>>,
    pub paged: Option<Arc<Paged>>,
}

/// A headless listing over a [`ListingSource`].
pub struct Listing<S> {
    name: String,
    source: S,
    inner: Mutex<ListingInner>,
    processes: ProcessTracker,
    capabilities: Vec<Arc<dyn Capability>>,
    selectable: Option<Arc<Selectable>>,
    sorted: Option<Arc<Sorted>>,
    searchable: Option<Arc<Searchable>>,
    paged: Option<Arc<Paged>>,
    events: Arc<Signal<ListingEvent>>,
    _selection_forward: Option<ConnectionGuard<SelectionCount>>,
}

impl<S: ListingSource> Listing<S> {
    pub(crate) fn from_parts(parts: ListingParts<S>) -> Self {
        let events = Arc::new(Signal::new());
        let selection_forward = parts.selectable.as_ref().map(|selectable| {
            let events = events.clone();
            selectable
                .count_changed
                .connect_scoped(move |count: &SelectionCount| {
                    events.emit(ListingEvent::SelectionChanged(*count));
                })
        });
        tracing::debug!(
            target: targets::LISTING,
            name = %parts.name,
            element = %parts.element_name,
            capabilities = parts.capabilities.len(),
            "listing created"
        );
        Self {
            name: parts.name,
            source: parts.source,
            inner: Mutex::new(ListingInner {
                registry: parts.registry,
                items: ItemGroup::new(parts.element_name),
                pending: None,
                titles: BTreeMap::new(),
            }),
            processes: ProcessTracker::new(),
            capabilities: parts.capabilities,
            selectable: parts.selectable,
            sorted: parts.sorted,
            searchable: parts.searchable,
            paged: parts.paged,
            events,
            _selection_forward: selection_forward,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name of the rendered item group.
    pub fn element_name(&self) -> String {
        self.inner.lock().items.element_name().to_string()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Signal carrying every [`ListingEvent`].
    pub fn events(&self) -> &Signal<ListingEvent> {
        &self.events
    }

    pub fn selectable(&self) -> Option<&Arc<Selectable>> {
        self.selectable.as_ref()
    }

    pub fn sorted(&self) -> Option<&Arc<Sorted>> {
        self.sorted.as_ref()
    }

    pub fn searchable(&self) -> Option<&Arc<Searchable>> {
        self.searchable.as_ref()
    }

    pub fn paged(&self) -> Option<&Arc<Paged>> {
        self.paged.as_ref()
    }

    /// The applied parameter snapshot.
    pub fn search_params(&self) -> SearchParams {
        self.inner.lock().registry.values().clone()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.lock().registry.is_registered(name)
    }

    /// Register additional parameters after construction.
    pub fn register_params(&self, configs: impl IntoIterator<Item = ParamConfig>) -> Result<()> {
        self.inner.lock().registry.register(configs)
    }

    /// State of the control bound to `name`, built on first access.
    pub fn control(&self, name: &str) -> Option<Control> {
        let mut inner = self.inner.lock();
        let mut control = inner.registry.control(name)?.clone();
        if let Some(enabled) = self.capabilities.iter().find_map(|c| c.control_enabled(name)) {
            control.set_enabled(enabled);
            if let Some(built) = inner.registry.control_mut(name) {
                built.set_enabled(enabled);
            }
        }
        Some(control)
    }

    /// Rendered items in order.
    pub fn items(&self) -> Vec<ListingItem> {
        self.inner.lock().items.items().to_vec()
    }

    pub fn item_keys(&self) -> Vec<ItemKey> {
        self.inner.lock().items.keys()
    }

    pub fn item_count(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Column titles reported by the source.
    pub fn titles(&self) -> BTreeMap<String, String> {
        self.inner.lock().titles.clone()
    }

    /// Whether an apply cycle is in flight.
    pub fn is_loading(&self) -> bool {
        self.processes.in_flight()
    }

    /// Resolve the source's size, then run the first apply cycle.
    pub async fn load(&self) -> Result<SearchParams> {
        if let Some(total) = self.source.prepare().await? {
            tracing::debug!(target: targets::LISTING, listing = %self.name, total, "source size resolved");
            if let Some(paged) = &self.paged {
                paged.paging().set_total(i64::try_from(total).unwrap_or(i64::MAX))?;
            }
        }
        self.reload().await
    }

    /// Re-run the apply cycle with the current parameters.
    pub async fn reload(&self) -> Result<SearchParams> {
        self.set_search_params(SearchParams::new(), SetParamsOptions::forced())
            .await
    }

    /// Request new search parameters.
    ///
    /// Resolves with the applied snapshot. A call superseded by a newer one
    /// resolves with [`ListingError::Aborted`] and leaves no trace in the
    /// rendered items. A call matching the in-flight cycle waits for that
    /// cycle and resolves with its outcome.
    #[tracing::instrument(skip_all, target = "horizon_listing::listing", level = "trace", fields(listing = %self.name))]
    pub async fn set_search_params(
        &self,
        partial: SearchParams,
        options: SetParamsOptions,
    ) -> Result<SearchParams> {
        let cycle = match self.start_cycle(partial, options) {
            Start::Run(cycle) => cycle,
            Start::Unchanged => return Ok(self.search_params()),
            Start::Join(process, settled) => return self.join_cycle(process, settled).await,
        };

        self.events.emit(ListingEvent::RequestParams {
            params: cycle.params.clone(),
            initiators: cycle.initiators.iter().cloned().collect(),
            origin: options.origin,
        });

        if let ReloadPlan::TrimTail { keep } = cycle.plan {
            return self.trim_tail(cycle, keep);
        }

        let ctx = ApplyContext {
            initiators: cycle.initiators.clone(),
            process: cycle.process.clone(),
            plan: cycle.plan,
            offset: cycle.offset,
        };
        match self.source.set_params_request(&cycle.params, &ctx).await {
            Ok(page) => self.populate(cycle, page),
            Err(err) => Err(self.fail(&cycle.process, err)),
        }
    }

    fn start_cycle(&self, partial: SearchParams, options: SetParamsOptions) -> Start {
        let mut inner = self.inner.lock();
        let partial = inner.registry.recognized(partial);
        let applied = inner.registry.values().clone();
        let base = inner.pending.clone().unwrap_or_else(|| applied.clone());

        let mut request = ParamRequest::new(&partial, &applied, &base, options.origin);
        for capability in &self.capabilities {
            capability.adjust_request(&mut request);
        }
        let params = request.into_params();
        let initiators = inner.registry.initiators(&params);

        let in_flight = self.processes.in_flight();
        let matches_target = if in_flight {
            inner.pending.as_ref() == Some(&params)
        } else {
            initiators.is_empty()
        };
        if matches_target && !options.force_when_matching {
            if in_flight {
                if let Some((process, settled)) = self.processes.join() {
                    tracing::trace!(target: targets::LISTING, listing = %self.name, process = %process.id(), "params match in-flight cycle, joining it");
                    return Start::Join(process, settled);
                }
            }
            tracing::trace!(target: targets::LISTING, listing = %self.name, "params unchanged, skipping apply cycle");
            return Start::Unchanged;
        }

        let plan = match &self.paged {
            Some(paged) => paged.plan(
                &initiators,
                &params,
                &applied,
                inner.items.len(),
                self.source.supports_partial_removal(),
            ),
            None => ReloadPlan::Replace,
        };
        let offset = self.paged.as_ref().map_or(0, |paged| paged.offset_of(&params));
        let process = self.processes.start();
        inner.pending = Some(params.clone());

        tracing::debug!(
            target: targets::LISTING,
            listing = %self.name,
            process = %process.id(),
            ?initiators,
            ?plan,
            "starting apply cycle"
        );
        Start::Run(Cycle {
            process,
            params,
            initiators,
            plan,
            offset,
        })
    }

    async fn join_cycle(&self, process: Process, settled: SettledReceiver) -> Result<SearchParams> {
        match wait_settled(&process, settled).await {
            Some(Settled::Applied(params)) => Ok(params),
            Some(Settled::Failed(message)) => Err(ListingError::JoinedCycleFailed(message)),
            None => Err(ListingError::Aborted),
        }
    }

    fn fail(&self, process: &Process, err: ListingError) -> ListingError {
        if !process.is_current() {
            tracing::debug!(target: targets::LISTING, listing = %self.name, process = %process.id(), "apply cycle superseded");
            return ListingError::Aborted;
        }
        {
            let mut inner = self.inner.lock();
            inner.pending = None;
            self.processes.finish(process, Settled::Failed(err.to_string()));
        }
        if !err.is_aborted() {
            tracing::warn!(target: targets::LISTING, listing = %self.name, %err, "apply cycle failed");
        }
        err
    }

    fn populate(&self, cycle: Cycle, page: SourcePage) -> Result<SearchParams> {
        let SourcePage {
            entries,
            total,
            applied_params,
            metadata,
        } = page;
        if let Some(total) = total.filter(|total| *total < 0) {
            let err = ListingError::range(format!("source reported a negative total ({total})"));
            return Err(self.fail(&cycle.process, err));
        }

        let mut mutation = Mutation::default();
        let snapshot = {
            let mut inner = self.inner.lock();
            // New cycles start under this lock, so currency cannot change
            // while the group is being written.
            if !cycle.process.is_current() {
                tracing::debug!(target: targets::LISTING, listing = %self.name, process = %cycle.process.id(), "discarding superseded result");
                return Err(ListingError::Aborted);
            }
            mutation.was_empty = inner.items.is_empty();
            if let Some(metadata) = &metadata {
                self.apply_metadata(&mut inner, metadata);
            }
            if cycle.plan == ReloadPlan::Replace {
                mutation.removed = inner.items.clear();
            }
            for item in entries {
                let key = item.key.clone();
                if inner.items.push(item) {
                    mutation.inserted.push(key);
                }
            }
            inner.registry.merge_applied(&cycle.params);
            inner.registry.merge_applied(&applied_params);
            inner.registry.sync_controls();
            inner.pending = None;
            let snapshot = inner.registry.values().clone();
            self.processes.finish(&cycle.process, Settled::Applied(snapshot.clone()));
            mutation.item_count = inner.items.len();
            snapshot
        };

        if let Some(metadata) = &metadata {
            for capability in &self.capabilities {
                capability.metadata_loaded(metadata);
            }
            self.events.emit(ListingEvent::MetadataLoaded);
        }
        self.finish_cycle(&cycle, snapshot, mutation, total)
    }

    fn trim_tail(&self, cycle: Cycle, keep: usize) -> Result<SearchParams> {
        let mut mutation = Mutation::default();
        let snapshot = {
            let mut inner = self.inner.lock();
            if !cycle.process.is_current() {
                return Err(ListingError::Aborted);
            }
            mutation.was_empty = inner.items.is_empty();
            mutation.removed = inner.items.truncate(keep);
            inner.registry.merge_applied(&cycle.params);
            inner.registry.sync_controls();
            inner.pending = None;
            let snapshot = inner.registry.values().clone();
            self.processes.finish(&cycle.process, Settled::Applied(snapshot.clone()));
            mutation.item_count = inner.items.len();
            snapshot
        };
        self.finish_cycle(&cycle, snapshot, mutation, None)
    }

    fn finish_cycle(
        &self,
        cycle: &Cycle,
        snapshot: SearchParams,
        mutation: Mutation,
        total: Option<i64>,
    ) -> Result<SearchParams> {
        self.announce(mutation);
        let applied = AppliedParams {
            params: &snapshot,
            initiators: &cycle.initiators,
            total,
            plan: cycle.plan,
        };
        for capability in &self.capabilities {
            capability.params_applied(&applied);
        }
        self.refresh_controls();

        tracing::debug!(
            target: targets::LISTING,
            listing = %self.name,
            process = %cycle.process.id(),
            items = self.item_count(),
            "search params applied"
        );
        self.events.emit(ListingEvent::SearchParamsApplied {
            params: snapshot.clone(),
            initiators: cycle.initiators.iter().cloned().collect(),
        });
        Ok(snapshot)
    }

    fn apply_metadata(&self, inner: &mut ListingInner, metadata: &ListingMetadata) {
        if let (Some(sorted), Some(values)) = (&self.sorted, &metadata.sort_values) {
            inner.registry.set_param_values(sorted.sort_param(), values.clone());
        }
        if let (Some(paged), Some(values)) = (&self.paged, &metadata.per_page_values) {
            inner.registry.set_param_values(paged.per_page_param(), values.clone());
        }
        for custom in &metadata.custom_params {
            if inner.registry.is_registered(&custom.name) {
                inner.registry.set_param_values(&custom.name, custom.values.clone());
                continue;
            }
            let config = if custom.values.is_empty() {
                ParamConfig::new(custom.name.as_str(), ParamKind::Text).with_control(field_control(None))
            } else {
                ParamConfig::new(custom.name.as_str(), ParamKind::Choice)
                    .with_values(custom.values.clone())
                    .with_control(menu_control())
            };
            if let Err(err) = inner.registry.register([config]) {
                tracing::warn!(target: targets::PARAMS, %err, "failed to register custom search param");
            }
        }
        inner.titles.extend(metadata.titles.clone());
    }

    /// Run hooks and emit events for an item-group mutation.
    fn announce(&self, mutation: Mutation) {
        if !mutation.removed.is_empty() {
            for capability in &self.capabilities {
                capability.items_removed(&mutation.removed, mutation.item_count);
            }
            self.events.emit(ListingEvent::ItemsRemoved {
                keys: mutation.removed,
            });
        }
        if !mutation.inserted.is_empty() {
            for capability in &self.capabilities {
                capability.items_inserted(&mutation.inserted, mutation.item_count);
            }
            self.events.emit(ListingEvent::ItemsInserted {
                keys: mutation.inserted,
            });
        }
        let empty = mutation.item_count == 0;
        if empty != mutation.was_empty {
            self.events.emit(ListingEvent::EmptyChanged { empty });
        }
    }

    /// Push capability-driven enabled states into built controls.
    fn refresh_controls(&self) {
        let mut inner = self.inner.lock();
        for name in inner.registry.built_controls() {
            let enabled = self.capabilities.iter().find_map(|c| c.control_enabled(&name));
            if let (Some(enabled), Some(control)) = (enabled, inner.registry.control_mut(&name)) {
                control.set_enabled(enabled);
            }
        }
    }

    fn patch<R>(&self, f: impl FnOnce(&mut ItemGroup, &mut Mutation) -> R) -> R {
        let mut mutation = Mutation::default();
        let result = {
            let mut inner = self.inner.lock();
            mutation.was_empty = inner.items.is_empty();
            let result = f(&mut inner.items, &mut mutation);
            mutation.item_count = inner.items.len();
            result
        };
        self.announce(mutation);
        self.refresh_controls();
        result
    }

    /// Insert an item into the rendered group without a fetch.
    ///
    /// Returns false if the key was already rendered (its value is updated).
    pub fn insert_item_at(&self, index: usize, item: ListingItem) -> bool {
        self.patch(|items, mutation| {
            let key = item.key.clone();
            let added = items.insert(index, item);
            if added {
                mutation.inserted.push(key);
            }
            added
        })
    }

    /// Remove items from the rendered group without a fetch.
    pub fn remove_items(&self, keys: &[ItemKey]) -> Vec<ItemKey> {
        self.patch(|items, mutation| {
            let removed = items.remove(keys);
            mutation.removed = removed.clone();
            removed
        })
    }

    /// Keep the first `len` rendered items.
    pub fn truncate_items(&self, len: usize) -> Vec<ItemKey> {
        self.patch(|items, mutation| {
            let removed = items.truncate(len);
            mutation.removed = removed.clone();
            removed
        })
    }

    /// Update the paging total without a fetch. Unpaged listings ignore it.
    pub fn set_total(&self, total: i64) -> Result<bool> {
        match &self.paged {
            Some(paged) => paged.paging().set_total(total),
            None => Ok(false),
        }
    }

    fn require_paged(&self) -> Result<&Arc<Paged>> {
        self.paged
            .as_ref()
            .ok_or_else(|| ListingError::validation(format!("listing '{}' is not paged", self.name)))
    }

    /// Search for `query`; an empty query clears the search.
    pub async fn search(&self, query: &str) -> Result<SearchParams> {
        let searchable = self
            .searchable
            .as_ref()
            .ok_or_else(|| ListingError::validation(format!("listing '{}' is not searchable", self.name)))?;
        let partial = SearchParams::new().with(searchable.param(), query);
        self.set_search_params(partial, SetParamsOptions::from_origin(Origin::Search))
            .await
    }

    /// Set the sort field (or clear it) and direction.
    pub async fn set_sort(&self, field: Option<&str>, order: SortOrder) -> Result<SearchParams> {
        let sorted = self
            .sorted
            .as_ref()
            .ok_or_else(|| ListingError::validation(format!("listing '{}' is not sorted", self.name)))?;
        let partial = SearchParams::new()
            .with(sorted.sort_param(), field)
            .with(sorted.order_param(), order);
        self.set_search_params(partial, SetParamsOptions::from_origin(Origin::Sort))
            .await
    }

    /// Handle a click on a head-row column.
    pub async fn sort_by_column(&self, field: &str) -> Result<SearchParams> {
        let Some(partial) = self.sorted.as_ref().and_then(|sorted| sorted.toggle_column(field)) else {
            return Ok(self.search_params());
        };
        self.set_search_params(partial, SetParamsOptions::from_origin(Origin::HeadRow))
            .await
    }

    /// Change the page size; the page resets to 1.
    pub async fn set_per_page(&self, per_page: usize) -> Result<SearchParams> {
        let paged = self.require_paged()?;
        let partial = SearchParams::new().with(paged.per_page_param(), per_page);
        self.set_search_params(partial, SetParamsOptions::from_origin(Origin::PerPage))
            .await
    }

    pub async fn go_to_page(&self, page: usize) -> Result<SearchParams> {
        let paged = self.require_paged()?;
        let partial = SearchParams::new().with(paged.page_param(), page);
        self.set_search_params(partial, SetParamsOptions::from_origin(Origin::Paging))
            .await
    }

    /// Go to the next page. Returns false when there is none.
    pub async fn go_to_next_page(&self) -> Result<bool> {
        let Some(next) = self.require_paged()?.paging().state().next_page() else {
            return Ok(false);
        };
        self.go_to_page(next).await?;
        Ok(true)
    }

    /// Go to the previous page. Returns false when there is none.
    pub async fn go_to_previous_page(&self) -> Result<bool> {
        let Some(previous) = self.require_paged()?.paging().state().previous_page() else {
            return Ok(false);
        };
        self.go_to_page(previous).await?;
        Ok(true)
    }

    /// Follow a navigation button. Returns false when it leads nowhere.
    pub async fn navigate(&self, target: NavTarget) -> Result<bool> {
        let state = self.require_paged()?.paging().state();
        let page = match target {
            NavTarget::First => 1,
            NavTarget::Previous => return self.go_to_previous_page().await,
            NavTarget::Next => return self.go_to_next_page().await,
            NavTarget::Last => state.page_count(),
            NavTarget::Page(page) => page,
        };
        if state.page_count() == 0 || state.clamp_page(page) == state.page {
            return Ok(false);
        }
        self.go_to_page(page).await?;
        Ok(true)
    }

    /// Advance page by page until `done` holds or the last page is reached.
    ///
    /// Returns the number of pages loaded.
    pub async fn go_to_next_page_until<F>(&self, done: F) -> Result<usize>
    where
        F: Fn(&Self) -> bool,
    {
        let mut loaded = 0;
        while !done(self) {
            if !self.go_to_next_page().await? {
                break;
            }
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Step back page by page until `done` holds or the first page is reached.
    pub async fn go_to_previous_page_until<F>(&self, done: F) -> Result<usize>
    where
        F: Fn(&Self) -> bool,
    {
        let mut loaded = 0;
        while !done(self) {
            if !self.go_to_previous_page().await? {
                break;
            }
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Scroll loading: the end-of-list sentinel became visible.
    ///
    /// Loads the next page, and keeps loading while `still_visible` holds.
    /// Does nothing unless stream paging with scroll loading is configured,
    /// and ignores calls while a load is pending.
    pub async fn on_sentinel_visible<F>(&self, still_visible: F) -> Result<usize>
    where
        F: Fn(&Self) -> bool,
    {
        let Some(paged) = self.paged.as_ref().filter(|paged| paged.scroll_loading()) else {
            return Ok(0);
        };
        if self.processes.in_flight() || !paged.begin_advance() {
            tracing::trace!(target: targets::PAGING, listing = %self.name, "scroll load already pending");
            return Ok(0);
        }
        let _guard = AdvanceGuard(paged);

        let mut loaded = 0;
        while self.go_to_next_page().await? {
            loaded += 1;
            if !still_visible(self) {
                break;
            }
        }
        Ok(loaded)
    }
}

impl<S> std::fmt::Debug for Listing<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Listing")
            .field("name", &self.name)
            .field("params", inner.registry.values())
            .field("items", &inner.items.len())
            .field("capabilities", &self.capabilities.len())
            .finish()
    }
}
