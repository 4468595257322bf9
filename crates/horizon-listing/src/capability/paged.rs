//! Paging: page parameters, navigation, and reload planning.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use horizon_listing_core::logging::targets;
use serde::Deserialize;

use super::{AppliedParams, Capability, CapabilityKind, ParamRequest};
use crate::error::Result;
use crate::params::{ParamConfig, ParamKind, ParamOption, SearchParams, menu_control};
use crate::paging::{PageRangeOrientation, PagingCalculator, PagingState};
use crate::source::ReloadPlan;

/// How consecutive pages are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMethod {
    /// One page at a time.
    #[default]
    Regular,
    /// Pages accumulate as the user advances.
    Stream,
}

/// Configuration of the paged capability.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PagedConfig {
    pub page_param: String,
    pub per_page_param: String,
    pub per_page: usize,
    pub per_page_values: Vec<usize>,
    pub method: PagingMethod,
    /// Load the next page when the end-of-list sentinel becomes visible.
    pub scroll_loading: bool,
    /// Number of page buttons in the navigation bar.
    pub visible_range: usize,
    pub orientation: PageRangeOrientation,
}

impl Default for PagedConfig {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
            per_page_param: "per_page".to_string(),
            per_page: 10,
            per_page_values: vec![10, 25, 50],
            method: PagingMethod::Regular,
            scroll_loading: false,
            visible_range: 5,
            orientation: PageRangeOrientation::Center,
        }
    }
}

/// Destination of a navigation button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    First,
    Previous,
    Page(usize),
    Next,
    Last,
}

/// Render state of one navigation button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButton {
    pub target: NavTarget,
    /// Page the button leads to.
    pub page: usize,
    pub enabled: bool,
    /// The button stands for the current page.
    pub current: bool,
}

/// Paging negotiation and navigation state.
#[derive(Debug)]
pub struct Paged {
    config: PagedConfig,
    paging: PagingCalculator,
    /// First page of the rendered window; 0 before anything is rendered.
    first_rendered_page: AtomicUsize,
    advancing: AtomicBool,
}

impl Paged {
    /// Fails if `per_page` is 0.
    pub fn new(config: PagedConfig) -> Result<Self> {
        let paging = PagingCalculator::new(config.per_page)?;
        Ok(Self {
            config,
            paging,
            first_rendered_page: AtomicUsize::new(0),
            advancing: AtomicBool::new(false),
        })
    }

    pub fn paging(&self) -> &PagingCalculator {
        &self.paging
    }

    pub fn method(&self) -> PagingMethod {
        self.config.method
    }

    pub fn page_param(&self) -> &str {
        &self.config.page_param
    }

    pub fn per_page_param(&self) -> &str {
        &self.config.per_page_param
    }

    pub fn scroll_loading(&self) -> bool {
        self.config.scroll_loading && self.config.method == PagingMethod::Stream
    }

    /// Pages currently rendered. Empty before the first apply.
    pub fn rendered_pages(&self) -> RangeInclusive<usize> {
        let first = self.first_rendered_page.load(Ordering::Acquire);
        let page = self.paging.page();
        if first == 0 || page == 0 {
            return 1..=0;
        }
        first.min(page)..=page
    }

    /// Page numbers shown in the navigation bar.
    pub fn visible_pages(&self) -> RangeInclusive<usize> {
        self.paging
            .state()
            .visible_page_range(self.config.visible_range, self.config.orientation)
    }

    /// First/previous, the visible page numbers, then next/last.
    pub fn navigation(&self) -> Vec<NavButton> {
        let state = self.paging.state();
        let count = state.page_count();
        let mut buttons = vec![
            NavButton {
                target: NavTarget::First,
                page: count.min(1),
                enabled: state.has_previous_page(),
                current: false,
            },
            NavButton {
                target: NavTarget::Previous,
                page: state.previous_page().unwrap_or(state.page),
                enabled: state.has_previous_page(),
                current: false,
            },
        ];
        buttons.extend(self.visible_pages().map(|page| NavButton {
            target: NavTarget::Page(page),
            page,
            enabled: page != state.page,
            current: page == state.page,
        }));
        buttons.push(NavButton {
            target: NavTarget::Next,
            page: state.next_page().unwrap_or(state.page),
            enabled: state.has_next_page(),
            current: false,
        });
        buttons.push(NavButton {
            target: NavTarget::Last,
            page: count,
            enabled: state.has_next_page(),
            current: false,
        });
        buttons
    }

    /// Options of the page-size menu.
    pub fn per_page_options(&self) -> Vec<ParamOption> {
        self.config
            .per_page_values
            .iter()
            .map(|value| ParamOption::plain(*value))
            .collect()
    }

    /// Decide how an apply cycle changes the rendered group.
    ///
    /// Only a lone page change under stream paging avoids a full reload:
    /// advancing by one appends, stepping back by one trims the tail.
    pub(crate) fn plan(
        &self,
        initiators: &BTreeSet<String>,
        resolved: &SearchParams,
        applied: &SearchParams,
        rendered_len: usize,
        supports_partial_removal: bool,
    ) -> ReloadPlan {
        let page_param = self.config.page_param.as_str();
        let page_only = initiators.len() == 1 && initiators.contains(page_param);
        let first = self.first_rendered_page.load(Ordering::Acquire);
        if !page_only || self.config.method != PagingMethod::Stream || first == 0 {
            return ReloadPlan::Replace;
        }

        let previous = page_number(applied, page_param);
        let next = page_number(resolved, page_param);
        if next == previous + 1 {
            return ReloadPlan::Append;
        }
        if next + 1 == previous && next >= first && supports_partial_removal {
            let state = self.paging.state();
            let keep = state
                .offset_end_of(next)
                .saturating_sub(state.offset_start_of(first))
                .min(rendered_len);
            tracing::debug!(target: targets::PAGING, previous, next, keep, "trimming rendered tail");
            return ReloadPlan::TrimTail { keep };
        }
        ReloadPlan::Replace
    }

    /// Take the scroll-loading guard. Returns false if already taken.
    pub(crate) fn begin_advance(&self) -> bool {
        !self.advancing.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn end_advance(&self) {
        self.advancing.store(false, Ordering::Release);
    }

    /// Number of items the rendered window can hold.
    pub(crate) fn window_capacity(&self) -> usize {
        let pages = self.rendered_pages();
        if pages.is_empty() {
            return self.paging.per_page();
        }
        (pages.end() - pages.start() + 1) * self.paging.per_page()
    }

    /// Absolute index of the first entry of the page `params` request.
    pub(crate) fn offset_of(&self, params: &SearchParams) -> usize {
        let per_page = params
            .number(&self.config.per_page_param)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(self.config.per_page);
        (page_number(params, &self.config.page_param).max(1) - 1) * per_page
    }

    /// Absolute index of the first rendered item.
    pub(crate) fn window_start(&self) -> usize {
        let first = self.first_rendered_page.load(Ordering::Acquire);
        PagingState {
            page: first,
            ..self.paging.state()
        }
        .offset_start()
    }
}

fn page_number(params: &SearchParams, name: &str) -> usize {
    params
        .number(name)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(1)
}

impl Capability for Paged {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Paged
    }

    fn param_configs(&self) -> Vec<ParamConfig> {
        vec![
            ParamConfig::new(self.config.page_param.as_str(), ParamKind::Number).with_default(1i64),
            ParamConfig::new(self.config.per_page_param.as_str(), ParamKind::Choice)
                .with_default(self.config.per_page)
                .with_values(self.per_page_options())
                .with_control(menu_control()),
        ]
    }

    fn adjust_request(&self, request: &mut ParamRequest<'_>) {
        let page_param = self.config.page_param.as_str();
        let per_page_param = self.config.per_page_param.as_str();

        if request.get(per_page_param).as_number().is_none_or(|n| n < 1) {
            request.set(per_page_param, self.config.per_page);
        }

        let others_changed = request
            .params()
            .names()
            .filter(|name| *name != page_param)
            .any(|name| request.changed(name));
        if others_changed && !request.is_explicit(page_param) {
            request.set(page_param, 1i64);
        } else if request.get(page_param).as_number().is_none_or(|n| n < 1) {
            request.set(page_param, 1i64);
        }
    }

    fn params_applied(&self, applied: &AppliedParams<'_>) {
        let per_page = applied
            .params
            .number(&self.config.per_page_param)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0);
        if let Some(per_page) = per_page {
            if let Err(err) = self.paging.set_per_page(per_page) {
                tracing::warn!(target: targets::PAGING, %err, "ignoring applied per_page");
            }
        }
        if let Some(total) = applied.total {
            if let Err(err) = self.paging.set_total(total) {
                tracing::warn!(target: targets::PAGING, %err, "ignoring applied total");
            }
        }
        let page = page_number(applied.params, &self.config.page_param);
        self.paging.set_page(page);

        if applied.plan == ReloadPlan::Replace {
            self.first_rendered_page.store(self.paging.page(), Ordering::Release);
        } else if self.first_rendered_page.load(Ordering::Acquire) == 0 {
            self.first_rendered_page.store(self.paging.page(), Ordering::Release);
        }
    }
}
