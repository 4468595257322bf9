//! Sorting and the head row.

use std::fmt;

use horizon_listing_core::Signal;
use horizon_listing_core::logging::targets;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;

use super::{AppliedParams, Capability, CapabilityKind, ParamRequest};
use crate::params::{ParamConfig, ParamKind, ParamOption, ParamValue, SearchParams, menu_control};
use crate::source::ListingMetadata;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
    /// The source's own order; no sort field applies.
    Natural,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Natural => "natural",
        }
    }

    /// Parse a parameter value. Unknown text reads as `None`.
    pub fn parse(value: &ParamValue) -> Option<Self> {
        match value.as_text()? {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            "natural" => Some(Self::Natural),
            _ => None,
        }
    }

    /// The opposite direction; natural flips to ascending.
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc | Self::Natural => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SortOrder> for ParamValue {
    fn from(order: SortOrder) -> Self {
        ParamValue::from(order.as_str())
    }
}

/// How head-row columns react to interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadAffordance {
    /// Clicking a column sorts by it; clicking again flips direction.
    #[default]
    Button,
    /// Each column opens a menu of directions.
    Menu,
    /// Columns are labels only.
    Plain,
}

/// A sortable field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortColumn {
    pub field: String,
    pub label: String,
}

impl SortColumn {
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
        }
    }
}

/// Configuration of the sorted capability.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SortedConfig {
    pub sort_param: String,
    pub order_param: String,
    pub columns: Vec<SortColumn>,
    pub supports_natural: bool,
    pub affordance: HeadAffordance,
    pub default_sort: Option<String>,
    pub default_order: Option<SortOrder>,
}

impl Default for SortedConfig {
    fn default() -> Self {
        Self {
            sort_param: "sort".to_string(),
            order_param: "order".to_string(),
            columns: Vec::new(),
            supports_natural: false,
            affordance: HeadAffordance::default(),
            default_sort: None,
            default_order: None,
        }
    }
}

/// Render state of one head-row column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadColumn {
    pub field: String,
    pub label: String,
    pub affordance: HeadAffordance,
    /// Direction when this column is the active sort.
    pub order: Option<SortOrder>,
}

impl HeadColumn {
    pub fn is_active(&self) -> bool {
        self.order.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SortState {
    sort: Option<String>,
    order: Option<SortOrder>,
}

/// Sort field and direction negotiation.
pub struct Sorted {
    config: SortedConfig,
    columns: RwLock<Vec<SortColumn>>,
    state: Mutex<SortState>,
    /// Emitted with `(sort, order)` when the applied sort changes.
    pub sort_changed: Signal<(Option<String>, Option<SortOrder>)>,
}

impl Sorted {
    pub fn new(config: SortedConfig) -> Self {
        let state = SortState {
            sort: config.default_sort.clone(),
            order: config.default_order,
        };
        Self {
            columns: RwLock::new(config.columns.clone()),
            config,
            state: Mutex::new(state),
            sort_changed: Signal::new(),
        }
    }

    pub fn sort_param(&self) -> &str {
        &self.config.sort_param
    }

    pub fn order_param(&self) -> &str {
        &self.config.order_param
    }

    pub fn affordance(&self) -> HeadAffordance {
        self.config.affordance
    }

    pub fn supports_natural(&self) -> bool {
        self.config.supports_natural
    }

    pub fn columns(&self) -> Vec<SortColumn> {
        self.columns.read().clone()
    }

    /// The applied sort field.
    pub fn active_sort(&self) -> Option<String> {
        self.state.lock().sort.clone()
    }

    /// The applied direction.
    pub fn active_order(&self) -> Option<SortOrder> {
        self.state.lock().order
    }

    /// Options of the order menu.
    pub fn order_options(&self) -> Vec<ParamOption> {
        let mut options = vec![
            ParamOption::new(SortOrder::Asc, "Ascending"),
            ParamOption::new(SortOrder::Desc, "Descending"),
        ];
        if self.config.supports_natural {
            options.push(ParamOption::new(SortOrder::Natural, "Natural"));
        }
        options
    }

    /// Head-row state derived from the applied sort.
    pub fn head_columns(&self) -> Vec<HeadColumn> {
        let state = self.state.lock().clone();
        self.columns
            .read()
            .iter()
            .map(|column| HeadColumn {
                field: column.field.clone(),
                label: column.label.clone(),
                affordance: self.config.affordance,
                order: (state.sort.as_deref() == Some(column.field.as_str()))
                    .then(|| state.order.unwrap_or(SortOrder::Asc)),
            })
            .collect()
    }

    /// Partial params for a click on the column `field`.
    ///
    /// The active column flips direction; any other column becomes the sort
    /// in ascending order. Plain columns yield nothing.
    pub fn toggle_column(&self, field: &str) -> Option<SearchParams> {
        if self.config.affordance == HeadAffordance::Plain {
            return None;
        }
        let state = self.state.lock().clone();
        let order = if state.sort.as_deref() == Some(field) {
            state.order.unwrap_or(SortOrder::Asc).flipped()
        } else {
            SortOrder::Asc
        };
        Some(self.column_params(field, order))
    }

    /// Partial params for each entry of a column's direction menu.
    pub fn column_menu(&self, field: &str) -> Vec<(SortOrder, SearchParams)> {
        [SortOrder::Asc, SortOrder::Desc]
            .into_iter()
            .map(|order| (order, self.column_params(field, order)))
            .collect()
    }

    fn column_params(&self, field: &str, order: SortOrder) -> SearchParams {
        SearchParams::new()
            .with(self.config.sort_param.as_str(), field)
            .with(self.config.order_param.as_str(), order)
    }
}

impl Capability for Sorted {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Sorted
    }

    fn param_configs(&self) -> Vec<ParamConfig> {
        let sort_values = self
            .columns
            .read()
            .iter()
            .map(|column| ParamOption::new(column.field.as_str(), column.label.as_str()))
            .collect();
        vec![
            ParamConfig::new(self.config.sort_param.as_str(), ParamKind::Choice)
                .with_default(self.config.default_sort.clone())
                .with_values(sort_values)
                .with_control(menu_control()),
            ParamConfig::new(self.config.order_param.as_str(), ParamKind::Choice)
                .with_default(self.config.default_order)
                .with_values(self.order_options())
                .with_control(menu_control()),
        ]
    }

    fn adjust_request(&self, request: &mut ParamRequest<'_>) {
        let sort_param = self.config.sort_param.as_str();
        let order_param = self.config.order_param.as_str();
        let natural = self.config.supports_natural;

        let sort_set = request.get(sort_param).is_set();
        let order = SortOrder::parse(request.get(order_param));

        if natural
            && order == Some(SortOrder::Natural)
            && request.is_explicit(order_param)
            && !request.is_explicit(sort_param)
        {
            if sort_set {
                tracing::trace!(target: targets::PARAMS, "natural order requested, clearing sort");
                request.set(sort_param, ParamValue::Unset);
            }
            return;
        }

        let corrected = match order {
            None | Some(SortOrder::Natural) if sort_set => Some(ParamValue::from(SortOrder::Asc)),
            Some(SortOrder::Natural) if !natural => Some(ParamValue::Unset),
            None if request.get(order_param).is_set() => Some(ParamValue::Unset),
            _ => None,
        };
        if let Some(value) = corrected {
            tracing::trace!(target: targets::PARAMS, order = %value, "correcting sort order");
            request.set(order_param, value);
        }
    }

    fn params_applied(&self, applied: &AppliedParams<'_>) {
        let next = SortState {
            sort: applied.params.text(&self.config.sort_param).map(str::to_string),
            order: SortOrder::parse(applied.params.get(&self.config.order_param)),
        };
        let changed = {
            let mut state = self.state.lock();
            if *state == next {
                false
            } else {
                *state = next.clone();
                true
            }
        };
        if changed {
            self.sort_changed.emit((next.sort, next.order));
        }
    }

    fn metadata_loaded(&self, metadata: &ListingMetadata) {
        if let Some(values) = &metadata.sort_values {
            *self.columns.write() = values
                .iter()
                .filter_map(|option| {
                    let field = option.value.as_text()?;
                    let label = metadata
                        .titles
                        .get(field)
                        .cloned()
                        .unwrap_or_else(|| option.label.clone());
                    Some(SortColumn::new(field, label))
                })
                .collect();
        }
    }
}

impl fmt::Debug for Sorted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sorted")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish()
    }
}
