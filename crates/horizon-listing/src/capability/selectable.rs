//! Selection of rendered items.

use std::collections::HashSet;

use horizon_listing_core::Signal;
use horizon_listing_core::logging::targets;
use parking_lot::Mutex;

use super::{Capability, CapabilityKind};
use crate::items::ItemKey;

/// Payload of a selection count change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionCount {
    pub new_count: usize,
    pub old_count: usize,
    /// Every rendered item is selected.
    pub is_all: bool,
}

/// Enabled state of the bulk selection controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionControls {
    pub select_all_enabled: bool,
    pub deselect_all_enabled: bool,
}

#[derive(Debug, Default)]
struct SelectionState {
    rendered: Vec<ItemKey>,
    selected: HashSet<ItemKey>,
}

impl SelectionState {
    fn is_all(&self) -> bool {
        !self.rendered.is_empty() && self.selected.len() == self.rendered.len()
    }
}

/// Tracks which rendered items are selected.
///
/// Only rendered keys can be selected, and removing an item from the
/// rendered group removes it from the selection.
#[derive(Debug, Default)]
pub struct Selectable {
    state: Mutex<SelectionState>,
    /// Emitted when the number of selected items changes.
    pub count_changed: Signal<SelectionCount>,
}

impl Selectable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, key: &ItemKey) -> bool {
        self.state.lock().selected.contains(key)
    }

    pub fn selected_count(&self) -> usize {
        self.state.lock().selected.len()
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().rendered.len()
    }

    pub fn is_all_selected(&self) -> bool {
        self.state.lock().is_all()
    }

    /// Selected keys in render order.
    pub fn selected_keys(&self) -> Vec<ItemKey> {
        let state = self.state.lock();
        state
            .rendered
            .iter()
            .filter(|key| state.selected.contains(*key))
            .cloned()
            .collect()
    }

    /// Select a rendered item. Returns false if not rendered or already selected.
    pub fn select(&self, key: &ItemKey) -> bool {
        self.update(|state| state.rendered.contains(key) && state.selected.insert(key.clone()))
    }

    /// Deselect an item. Returns false if it was not selected.
    pub fn deselect(&self, key: &ItemKey) -> bool {
        self.update(|state| state.selected.remove(key))
    }

    /// Flip the selection of a rendered item. Returns the new state.
    pub fn toggle(&self, key: &ItemKey) -> bool {
        self.update(|state| {
            if state.selected.remove(key) {
                false
            } else {
                state.rendered.contains(key) && state.selected.insert(key.clone())
            }
        })
    }

    /// Select every rendered item. Returns how many were newly selected.
    pub fn select_all(&self) -> usize {
        self.update(|state| {
            let before = state.selected.len();
            let rendered = state.rendered.clone();
            state.selected.extend(rendered);
            state.selected.len() - before
        })
    }

    /// Clear the selection. Returns how many were deselected.
    pub fn deselect_all(&self) -> usize {
        self.update(|state| {
            let count = state.selected.len();
            state.selected.clear();
            count
        })
    }

    /// Enabled state of select-all / deselect-all.
    pub fn controls(&self) -> SelectionControls {
        let state = self.state.lock();
        let items = state.rendered.len();
        let selected = state.selected.len();
        SelectionControls {
            select_all_enabled: items > 0 && selected < items,
            deselect_all_enabled: items > 0 && selected > 0,
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut SelectionState) -> R) -> R {
        let (result, change) = {
            let mut state = self.state.lock();
            let old_count = state.selected.len();
            let result = f(&mut state);
            let new_count = state.selected.len();
            let change = (new_count != old_count).then(|| SelectionCount {
                new_count,
                old_count,
                is_all: state.is_all(),
            });
            (result, change)
        };
        if let Some(change) = change {
            tracing::trace!(target: targets::SELECTION, old = change.old_count, new = change.new_count, "selection count changed");
            self.count_changed.emit(change);
        }
        result
    }
}

impl Capability for Selectable {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Selectable
    }

    fn items_inserted(&self, keys: &[ItemKey], _item_count: usize) {
        let mut state = self.state.lock();
        for key in keys {
            if !state.rendered.contains(key) {
                state.rendered.push(key.clone());
            }
        }
    }

    fn items_removed(&self, keys: &[ItemKey], _item_count: usize) {
        self.update(|state| {
            state.rendered.retain(|key| !keys.contains(key));
            for key in keys {
                state.selected.remove(key);
            }
        });
    }
}
