//! Free-text search with relevance ordering.

use horizon_listing_core::logging::targets;
use parking_lot::Mutex;
use serde::Deserialize;

use super::{AppliedParams, Capability, CapabilityKind, ParamRequest};
use crate::events::Origin;
use crate::items::ItemKey;
use crate::params::{ParamConfig, ParamKind, ParamValue, field_control};
use crate::source::ListingMetadata;

/// Configuration of the searchable capability.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchableConfig {
    pub param: String,
    pub sort_param: String,
    pub order_param: String,
    pub page_param: String,
    /// Sort value meaning "by relevance".
    pub relevance_key: Option<String>,
    /// Relevance ordering is available even without a relevance key.
    pub relevance: bool,
    pub placeholder: Option<String>,
}

impl Default for SearchableConfig {
    fn default() -> Self {
        Self {
            param: "search".to_string(),
            sort_param: "sort".to_string(),
            order_param: "order".to_string(),
            page_param: "page".to_string(),
            relevance_key: None,
            relevance: false,
            placeholder: None,
        }
    }
}

#[derive(Debug, Default)]
struct SearchState {
    relevance_key: Option<String>,
    /// `(sort, order)` active before the current search started.
    saved_sort: Option<(ParamValue, ParamValue)>,
    item_count: usize,
    has_query: bool,
}

/// Search negotiation.
///
/// Starting a search switches to relevance ordering when it is available,
/// and clearing the search restores the ordering that was active before.
#[derive(Debug)]
pub struct Searchable {
    config: SearchableConfig,
    state: Mutex<SearchState>,
}

impl Searchable {
    pub fn new(config: SearchableConfig) -> Self {
        let state = SearchState {
            relevance_key: config.relevance_key.clone(),
            ..SearchState::default()
        };
        Self {
            config,
            state: Mutex::new(state),
        }
    }

    pub fn param(&self) -> &str {
        &self.config.param
    }

    pub fn relevance_key(&self) -> Option<String> {
        self.state.lock().relevance_key.clone()
    }

    pub fn relevance_available(&self) -> bool {
        self.relevance_available_locked(&self.state.lock())
    }

    fn relevance_available_locked(&self, state: &SearchState) -> bool {
        self.config.relevance || state.relevance_key.is_some()
    }

    /// The search input is disabled while nothing is rendered and no query
    /// is active.
    pub fn is_input_enabled(&self) -> bool {
        let state = self.state.lock();
        state.item_count > 0 || state.has_query
    }

    /// `(sort, order)` that clearing the search will restore.
    pub fn saved_sort(&self) -> Option<(ParamValue, ParamValue)> {
        self.state.lock().saved_sort.clone()
    }
}

impl Capability for Searchable {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Searchable
    }

    fn param_configs(&self) -> Vec<ParamConfig> {
        vec![
            ParamConfig::new(self.config.param.as_str(), ParamKind::Text)
                .with_control(field_control(self.config.placeholder.clone())),
        ]
    }

    fn adjust_request(&self, request: &mut ParamRequest<'_>) {
        let param = self.config.param.as_str();
        if request.get(param).is_blank() && request.get(param).is_set() {
            request.set(param, ParamValue::Unset);
        }
        if !request.changed(param) {
            return;
        }

        if request.origin() == Origin::Search && request.params().contains(&self.config.page_param) {
            request.set(&self.config.page_param, 1i64);
        }

        let starting = request.base().get(param).is_blank() && !request.get(param).is_blank();
        let clearing = !request.base().get(param).is_blank() && request.get(param).is_blank();
        let sort = self.config.sort_param.as_str();
        let order = self.config.order_param.as_str();
        let ordering_named = request.is_explicit(sort) || request.is_explicit(order);

        let mut state = self.state.lock();
        if starting && self.relevance_available_locked(&state) && !ordering_named {
            state.saved_sort = Some((
                request.base().get(sort).clone(),
                request.base().get(order).clone(),
            ));
            tracing::debug!(target: targets::PARAMS, "search started, ordering by relevance");
            request.set(sort, ParamValue::from(state.relevance_key.clone()));
            request.set(order, "desc");
        } else if clearing {
            if let Some((saved_sort, saved_order)) = state.saved_sort.clone().filter(|_| !ordering_named) {
                tracing::debug!(target: targets::PARAMS, "search cleared, restoring ordering");
                request.set(sort, saved_sort);
                request.set(order, saved_order);
            }
        }
    }

    fn params_applied(&self, applied: &AppliedParams<'_>) {
        let has_query = !applied.params.get(&self.config.param).is_blank();
        let mut state = self.state.lock();
        state.has_query = has_query;
        // Once the ordering moves off relevance there is nothing to restore.
        let relevance_ordered = applied.params.get(&self.config.sort_param)
            == &ParamValue::from(state.relevance_key.clone())
            && applied.params.text(&self.config.order_param) == Some("desc");
        if !has_query || !relevance_ordered {
            state.saved_sort = None;
        }
    }

    fn items_inserted(&self, _keys: &[ItemKey], item_count: usize) {
        self.state.lock().item_count = item_count;
    }

    fn items_removed(&self, _keys: &[ItemKey], item_count: usize) {
        self.state.lock().item_count = item_count;
    }

    fn metadata_loaded(&self, metadata: &ListingMetadata) {
        if let Some(key) = &metadata.relevance_key {
            self.state.lock().relevance_key = Some(key.clone());
        }
    }

    fn control_enabled(&self, param: &str) -> Option<bool> {
        (param == self.config.param).then(|| self.is_input_enabled())
    }
}
