//! Headless control state for search parameters.
//!
//! A control is the state a renderer needs to draw an input bound to one
//! parameter: the selected value, the options, and whether it is enabled.
//! Controls never talk to the listing directly; [`Control::change`] produces
//! the partial parameter map to pass to `set_search_params`.

use std::sync::Arc;

use serde::Deserialize;

use super::registry::ParamConfig;
use super::value::{ParamValue, SearchParams};

/// One selectable option of a choice parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParamOption {
    /// The parameter value this option selects.
    pub value: ParamValue,
    /// Human-readable label.
    pub label: String,
}

impl ParamOption {
    /// Create an option with an explicit label.
    pub fn new(value: impl Into<ParamValue>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Create an option labelled with its own value.
    pub fn plain(value: impl Into<ParamValue>) -> Self {
        let value = value.into();
        let label = value.to_string();
        Self { value, label }
    }
}

/// Factory that builds the control for a parameter on first access.
pub type ControlBuilder = Arc<dyn Fn(&ParamConfig) -> Control + Send + Sync>;

/// Builder producing a [`Control::Menu`] from the parameter's option set.
pub fn menu_control() -> ControlBuilder {
    Arc::new(|config: &ParamConfig| {
        Control::Menu(MenuControl {
            param: config.name().to_string(),
            options: config.values().to_vec(),
            selected: config.default_value().clone(),
            enabled: true,
        })
    })
}

/// Builder producing a [`Control::Field`] with an optional placeholder.
pub fn field_control(placeholder: Option<String>) -> ControlBuilder {
    Arc::new(move |config: &ParamConfig| {
        Control::Field(FieldControl {
            param: config.name().to_string(),
            text: config.default_value().to_string(),
            placeholder: placeholder.clone(),
            enabled: true,
        })
    })
}

/// A drop-down style control.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuControl {
    /// Bound parameter.
    pub param: String,
    /// Available options.
    pub options: Vec<ParamOption>,
    /// Currently selected value.
    pub selected: ParamValue,
    /// Whether the control accepts input.
    pub enabled: bool,
}

impl MenuControl {
    /// The option matching the selected value, if any.
    pub fn selected_option(&self) -> Option<&ParamOption> {
        self.options.iter().find(|option| option.value == self.selected)
    }
}

/// A free-text input control.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldControl {
    /// Bound parameter.
    pub param: String,
    /// Current text.
    pub text: String,
    /// Placeholder shown when empty.
    pub placeholder: Option<String>,
    /// Whether the control accepts input.
    pub enabled: bool,
}

/// Control state bound to one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Choice from a fixed option set.
    Menu(MenuControl),
    /// Free text.
    Field(FieldControl),
}

impl Control {
    /// The bound parameter name.
    pub fn param(&self) -> &str {
        match self {
            Self::Menu(menu) => &menu.param,
            Self::Field(field) => &field.param,
        }
    }

    /// Whether the control accepts input.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Menu(menu) => menu.enabled,
            Self::Field(field) => field.enabled,
        }
    }

    /// Enable or disable the control. Returns true on change.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let slot = match self {
            Self::Menu(menu) => &mut menu.enabled,
            Self::Field(field) => &mut field.enabled,
        };
        let changed = *slot != enabled;
        *slot = enabled;
        changed
    }

    /// Reflect an applied value.
    pub fn sync(&mut self, value: &ParamValue) {
        match self {
            Self::Menu(menu) => menu.selected = value.clone(),
            Self::Field(field) => field.text = value.to_string(),
        }
    }

    /// Replace the option set. Fields ignore options.
    pub fn set_options(&mut self, options: &[ParamOption]) {
        if let Self::Menu(menu) = self {
            menu.options = options.to_vec();
        }
    }

    /// The partial parameter map representing a user change to `value`.
    pub fn change(&self, value: impl Into<ParamValue>) -> SearchParams {
        SearchParams::new().with(self.param(), value)
    }
}
