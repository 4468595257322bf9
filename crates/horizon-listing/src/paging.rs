//! Paging arithmetic.
//!
//! [`PagingState`] is the pure arithmetic over `(total, per_page, page)`.
//! [`PagingCalculator`] wraps it in properties and emits a
//! [`PagingChange`] only when a value actually changes.
//!
//! Pages are 1-based. Page 0 is reserved for "no pages": it is the current
//! page exactly when the total is 0.

use std::ops::RangeInclusive;

use horizon_listing_core::logging::targets;
use horizon_listing_core::{Property, Signal};
use serde::Deserialize;

use crate::error::{ListingError, Result};

/// Where the current page sits inside the visible page-number window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageRangeOrientation {
    /// Current page is the first number shown.
    Start,
    /// Current page is centered; even widths show one extra page before it.
    #[default]
    Center,
    /// Current page is the last number shown.
    End,
}

/// A snapshot of paging values with the derived arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingState {
    pub total: usize,
    pub per_page: usize,
    pub page: usize,
}

impl PagingState {
    /// Build a state, normalizing `page` into range.
    pub fn new(total: usize, per_page: usize, page: usize) -> Result<Self> {
        if per_page == 0 {
            return Err(ListingError::range("per_page must be at least 1"));
        }
        let mut state = Self {
            total,
            per_page,
            page,
        };
        state.page = state.clamp_page(page);
        Ok(state)
    }

    /// Number of pages; 0 when there are no items.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.per_page)
    }

    /// Clamp a page number into `1..=page_count`, or 0 when empty.
    pub fn clamp_page(&self, page: usize) -> usize {
        match self.page_count() {
            0 => 0,
            count => page.clamp(1, count),
        }
    }

    /// Index of the first item on the current page.
    pub fn offset_start(&self) -> usize {
        self.offset_start_of(self.page)
    }

    /// Index of the first item on `page`.
    pub fn offset_start_of(&self, page: usize) -> usize {
        page.saturating_sub(1) * self.per_page
    }

    /// Index one past the last item on the current page.
    pub fn offset_end(&self) -> usize {
        self.offset_end_of(self.page)
    }

    /// Index one past the last item on `page`.
    pub fn offset_end_of(&self, page: usize) -> usize {
        (page * self.per_page).min(self.total)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn previous_page(&self) -> Option<usize> {
        self.has_previous_page().then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<usize> {
        self.has_next_page().then(|| self.page + 1)
    }

    /// Page numbers to show in a navigation bar of at most `size` entries.
    ///
    /// Always contains the current page and never leaves `1..=page_count`.
    /// Returns an empty range when there are no pages or `size` is 0.
    pub fn visible_page_range(
        &self,
        size: usize,
        orientation: PageRangeOrientation,
    ) -> RangeInclusive<usize> {
        let count = self.page_count();
        if count == 0 || size == 0 {
            return 1..=0;
        }
        let size = size.min(count);
        let page = self.page.clamp(1, count);
        let before = match orientation {
            PageRangeOrientation::Start => 0,
            PageRangeOrientation::End => size - 1,
            PageRangeOrientation::Center => size / 2,
        };
        let max_start = count - size + 1;
        let start = page.saturating_sub(before).clamp(1, max_start);
        start..=start + size - 1
    }
}

/// Which paging value changed, with old and new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingChange {
    Total { old: usize, new: usize },
    PerPage { old: usize, new: usize },
    Page { old: usize, new: usize },
}

/// Observable paging state.
///
/// Every setter keeps `page` inside `1..=page_count` (or 0 when empty) and
/// emits on [`changed`](Self::changed) only for values that really changed.
pub struct PagingCalculator {
    total: Property<usize>,
    per_page: Property<usize>,
    page: Property<usize>,
    /// Emitted once per changed value.
    pub changed: Signal<PagingChange>,
}

impl PagingCalculator {
    /// Create a calculator with no items.
    pub fn new(per_page: usize) -> Result<Self> {
        let state = PagingState::new(0, per_page, 0)?;
        Ok(Self {
            total: Property::new(state.total),
            per_page: Property::new(state.per_page),
            page: Property::new(state.page),
            changed: Signal::new(),
        })
    }

    /// Current values.
    pub fn state(&self) -> PagingState {
        PagingState {
            total: self.total.get(),
            per_page: self.per_page.get(),
            page: self.page.get(),
        }
    }

    pub fn total(&self) -> usize {
        self.total.get()
    }

    pub fn per_page(&self) -> usize {
        self.per_page.get()
    }

    pub fn page(&self) -> usize {
        self.page.get()
    }

    pub fn page_count(&self) -> usize {
        self.state().page_count()
    }

    pub fn offset_start(&self) -> usize {
        self.state().offset_start()
    }

    pub fn offset_end(&self) -> usize {
        self.state().offset_end()
    }

    /// Set the item total. Negative totals are rejected.
    pub fn set_total(&self, total: i64) -> Result<bool> {
        let total = usize::try_from(total)
            .map_err(|_| ListingError::range(format!("total must not be negative, got {total}")))?;
        let changed = match self.total.replace(total) {
            Some(old) => {
                tracing::debug!(target: targets::PAGING, old, new = total, "total changed");
                self.changed.emit(PagingChange::Total { old, new: total });
                true
            }
            None => false,
        };
        let page = self.page.get();
        let page = if page == 0 { 1 } else { page };
        self.store_page(page);
        Ok(changed)
    }

    /// Set the page size. Zero is rejected.
    pub fn set_per_page(&self, per_page: usize) -> Result<bool> {
        if per_page == 0 {
            return Err(ListingError::range("per_page must be at least 1"));
        }
        let changed = match self.per_page.replace(per_page) {
            Some(old) => {
                self.changed.emit(PagingChange::PerPage { old, new: per_page });
                true
            }
            None => false,
        };
        self.store_page(self.page.get());
        Ok(changed)
    }

    /// Set the current page, clamped into range. Returns true on change.
    pub fn set_page(&self, page: usize) -> bool {
        self.store_page(page)
    }

    fn store_page(&self, page: usize) -> bool {
        let page = self.state().clamp_page(page);
        match self.page.replace(page) {
            Some(old) => {
                tracing::trace!(target: targets::PAGING, old, new = page, "page changed");
                self.changed.emit(PagingChange::Page { old, new: page });
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for PagingCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagingCalculator")
            .field("state", &self.state())
            .finish()
    }
}
