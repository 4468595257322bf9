//! Listing construction.

use std::sync::{Arc, LazyLock};

use crate::capability::{
    Capability, CapabilityKind, DEFAULT_ADJUST_ORDER, Paged, PagedConfig, Searchable,
    SearchableConfig, Selectable, Sorted, SortedConfig,
};
use crate::config::ListingConfig;
use crate::error::{ListingError, Result};
use crate::items::{NameAllocator, SequentialNameAllocator};
use crate::listing::{Listing, ListingParts};
use crate::params::{ParamConfig, ParamRegistry};
use crate::source::ListingSource;

static ELEMENT_NAMES: LazyLock<Arc<dyn NameAllocator>> = LazyLock::new(default_allocator);

fn default_allocator() -> Arc<dyn NameAllocator> {
    Arc::new(SequentialNameAllocator::new())
}

/// Builder for [`Listing`].
///
/// # Example
///
/// ```ignore
/// use horizon_listing::prelude::*;
///
/// let listing = ListingBuilder::new("users", source)
///     .selectable()
///     .sorted(SortedConfig::default())
///     .paged(PagedConfig { per_page: 20, ..PagedConfig::default() })
///     .build()?;
/// listing.load().await?;
/// ```
pub struct ListingBuilder<S> {
    name: String,
    source: S,
    selectable: bool,
    sorted: Option<SortedConfig>,
    searchable: Option<SearchableConfig>,
    paged: Option<PagedConfig>,
    params: Vec<ParamConfig>,
    adjust_order: Option<Vec<CapabilityKind>>,
    allocator: Option<Arc<dyn NameAllocator>>,
}

impl<S: ListingSource> ListingBuilder<S> {
    pub fn new(name: impl Into<String>, source: S) -> Self {
        Self {
            name: name.into(),
            source,
            selectable: false,
            sorted: None,
            searchable: None,
            paged: None,
            params: Vec::new(),
            adjust_order: None,
            allocator: None,
        }
    }

    /// Enable the capabilities described by `config`.
    pub fn with_config(mut self, config: ListingConfig) -> Self {
        self.selectable = config.selectable;
        self.sorted = config.sorting;
        self.searchable = config.search;
        self.paged = config.paging;
        self.adjust_order = config.adjust_order;
        self
    }

    pub fn selectable(mut self) -> Self {
        self.selectable = true;
        self
    }

    pub fn sorted(mut self, config: SortedConfig) -> Self {
        self.sorted = Some(config);
        self
    }

    pub fn searchable(mut self, config: SearchableConfig) -> Self {
        self.searchable = Some(config);
        self
    }

    pub fn paged(mut self, config: PagedConfig) -> Self {
        self.paged = Some(config);
        self
    }

    /// Register an extra parameter not owned by any capability.
    pub fn param(mut self, config: ParamConfig) -> Self {
        self.params.push(config);
        self
    }

    /// Order in which capabilities adjust requests.
    ///
    /// Enabled capabilities missing from `order` run afterwards in the
    /// default order.
    pub fn adjust_order(mut self, order: Vec<CapabilityKind>) -> Self {
        self.adjust_order = Some(order);
        self
    }

    /// Allocator for the item group's element name. Defaults to a
    /// process-wide sequential allocator.
    pub fn name_allocator(mut self, allocator: Arc<dyn NameAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn build(self) -> Result<Listing<S>> {
        if self.name.trim().is_empty() {
            return Err(ListingError::validation("listing name must not be empty"));
        }

        let selectable = self.selectable.then(|| Arc::new(Selectable::new()));
        let sorted = self.sorted.map(|config| Arc::new(Sorted::new(config)));
        let searchable = self.searchable.map(|config| Arc::new(Searchable::new(config)));
        let paged = self.paged.map(Paged::new).transpose()?.map(Arc::new);

        let mut enabled: Vec<(CapabilityKind, Arc<dyn Capability>)> = Vec::new();
        if let Some(c) = &selectable {
            enabled.push((CapabilityKind::Selectable, c.clone() as Arc<dyn Capability>));
        }
        if let Some(c) = &sorted {
            enabled.push((CapabilityKind::Sorted, c.clone() as Arc<dyn Capability>));
        }
        if let Some(c) = &searchable {
            enabled.push((CapabilityKind::Searchable, c.clone() as Arc<dyn Capability>));
        }
        if let Some(c) = &paged {
            enabled.push((CapabilityKind::Paged, c.clone() as Arc<dyn Capability>));
        }

        let order = resolve_adjust_order(self.adjust_order.as_deref())?;
        let capabilities: Vec<Arc<dyn Capability>> = order
            .iter()
            .filter_map(|kind| enabled.iter().find(|(k, _)| k == kind))
            .map(|(_, capability)| capability.clone())
            .collect();

        let mut registry = ParamRegistry::new();
        for capability in &capabilities {
            registry.register(capability.param_configs())?;
        }
        registry.register(self.params)?;

        let allocator = self.allocator.unwrap_or_else(|| ELEMENT_NAMES.clone());
        let element_name = allocator.allocate(&format!("{}-item", self.name));

        Ok(Listing::from_parts(ListingParts {
            name: self.name,
            element_name,
            source: self.source,
            registry,
            capabilities,
            selectable,
            sorted,
            searchable,
            paged,
        }))
    }
}

/// Complete a requested order with the default one, rejecting duplicates.
fn resolve_adjust_order(requested: Option<&[CapabilityKind]>) -> Result<Vec<CapabilityKind>> {
    let mut order: Vec<CapabilityKind> = Vec::new();
    for kind in requested.unwrap_or(&DEFAULT_ADJUST_ORDER) {
        if order.contains(kind) {
            return Err(ListingError::validation(format!(
                "capability {kind:?} appears twice in adjust order"
            )));
        }
        order.push(*kind);
    }
    for kind in DEFAULT_ADJUST_ORDER {
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    Ok(order)
}
