//! Declarative listing configuration.
//!
//! ```toml
//! selectable = true
//! adjust_order = ["searchable", "sorted", "paged"]
//!
//! [paging]
//! per_page = 20
//! per_page_values = [10, 20, 50]
//! method = "stream"
//! scroll_loading = true
//!
//! [sorting]
//! supports_natural = true
//! affordance = "menu"
//! columns = [{ field = "name", label = "Name" }]
//!
//! [search]
//! relevance_key = "score"
//! ```

use serde::Deserialize;

use crate::capability::{CapabilityKind, PagedConfig, SearchableConfig, SortedConfig};
use crate::error::Result;

/// Which capabilities a listing has and how they are set up.
///
/// A missing section leaves the capability disabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub selectable: bool,
    pub paging: Option<PagedConfig>,
    pub sorting: Option<SortedConfig>,
    pub search: Option<SearchableConfig>,
    pub adjust_order: Option<Vec<CapabilityKind>>,
}

impl ListingConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}
