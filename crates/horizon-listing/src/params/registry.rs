//! Registry of recognized search parameters.

use std::collections::{BTreeSet, HashMap};

use horizon_listing_core::logging::targets;

use super::control::{Control, ControlBuilder, ParamOption};
use super::value::{ParamValue, SearchParams};
use crate::error::{ListingError, Result};

/// The value domain of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text.
    Text,
    /// Integer.
    Number,
    /// One of a fixed option set.
    Choice,
}

/// Declaration of a recognized parameter.
#[derive(Clone)]
pub struct ParamConfig {
    name: String,
    kind: ParamKind,
    default: ParamValue,
    values: Vec<ParamOption>,
    control: Option<ControlBuilder>,
}

impl ParamConfig {
    /// Declare a parameter with no default, options, or control.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: ParamValue::Unset,
            values: Vec::new(),
            control: None,
        }
    }

    /// Set the value used before anything is applied.
    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = value.into();
        self
    }

    /// Set the option set.
    pub fn with_values(mut self, values: Vec<ParamOption>) -> Self {
        self.values = values;
        self
    }

    /// Attach a control factory.
    pub fn with_control(mut self, builder: ControlBuilder) -> Self {
        self.control = Some(builder);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn default_value(&self) -> &ParamValue {
        &self.default
    }

    pub fn values(&self) -> &[ParamOption] {
        &self.values
    }

    /// Whether a control factory is attached.
    pub fn has_control(&self) -> bool {
        self.control.is_some()
    }

    pub(crate) fn build_control(&self) -> Option<Control> {
        self.control.as_ref().map(|builder| builder(self))
    }
}

impl std::fmt::Debug for ParamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("values", &self.values.len())
            .field("has_control", &self.control.is_some())
            .finish()
    }
}

/// Tracks recognized parameters, their applied values, and their controls.
///
/// Controls are built lazily on first access and then kept in sync with the
/// applied values after every apply cycle.
#[derive(Debug, Default)]
pub struct ParamRegistry {
    order: Vec<String>,
    configs: HashMap<String, ParamConfig>,
    applied: SearchParams,
    controls: HashMap<String, Control>,
}

impl ParamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register parameter declarations.
    ///
    /// Fails with a validation error if a name is already registered; in that
    /// case nothing from this batch is registered.
    pub fn register(&mut self, configs: impl IntoIterator<Item = ParamConfig>) -> Result<()> {
        let configs: Vec<ParamConfig> = configs.into_iter().collect();
        let mut seen = BTreeSet::new();
        for config in &configs {
            if self.configs.contains_key(config.name()) || !seen.insert(config.name()) {
                return Err(ListingError::validation(format!(
                    "search param '{}' is registered twice",
                    config.name()
                )));
            }
        }
        for config in configs {
            tracing::trace!(target: targets::PARAMS, name = config.name(), "registering search param");
            self.applied.set(config.name(), config.default_value().clone());
            self.order.push(config.name.clone());
            self.configs.insert(config.name.clone(), config);
        }
        Ok(())
    }

    /// Whether `name` is recognized.
    pub fn is_registered(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    /// Declaration for `name`.
    pub fn config(&self, name: &str) -> Option<&ParamConfig> {
        self.configs.get(name)
    }

    /// Recognized names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The applied snapshot. Holds an entry for every recognized name.
    pub fn values(&self) -> &SearchParams {
        &self.applied
    }

    /// Drop names that are not recognized, logging each one.
    pub fn recognized(&self, partial: SearchParams) -> SearchParams {
        partial
            .iter()
            .filter(|(name, _)| {
                let known = self.is_registered(name);
                if !known {
                    tracing::warn!(target: targets::PARAMS, name, "ignoring unrecognized search param");
                }
                known
            })
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Names whose value in `resolved` differs from the applied snapshot.
    pub fn initiators(&self, resolved: &SearchParams) -> BTreeSet<String> {
        resolved
            .iter()
            .filter(|(name, value)| self.applied.get(name) != *value)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Fold values into the applied snapshot. Unrecognized names are skipped.
    pub fn merge_applied(&mut self, params: &SearchParams) {
        for (name, value) in params.iter() {
            if self.is_registered(name) {
                self.applied.set(name, value.clone());
            } else {
                tracing::trace!(target: targets::PARAMS, name, "source reported unrecognized param");
            }
        }
    }

    /// Replace the option set of `name`, updating a built control.
    ///
    /// Returns true if the option set changed.
    pub fn set_param_values(&mut self, name: &str, values: Vec<ParamOption>) -> bool {
        let Some(config) = self.configs.get_mut(name) else {
            return false;
        };
        if config.values == values {
            return false;
        }
        if let Some(control) = self.controls.get_mut(name) {
            control.set_options(&values);
        }
        config.values = values;
        true
    }

    /// The control for `name`, built on first access.
    pub fn control(&mut self, name: &str) -> Option<&Control> {
        self.control_mut(name).map(|control| &*control)
    }

    /// Mutable access to the control for `name`, built on first access.
    pub fn control_mut(&mut self, name: &str) -> Option<&mut Control> {
        if !self.controls.contains_key(name) {
            let config = self.configs.get(name)?;
            let mut control = config.build_control()?;
            control.sync(self.applied.get(name));
            self.controls.insert(name.to_string(), control);
        }
        self.controls.get_mut(name)
    }

    /// Whether the control for `name` has been built.
    pub fn has_built_control(&self, name: &str) -> bool {
        self.controls.contains_key(name)
    }

    /// Names of controls built so far.
    pub fn built_controls(&self) -> Vec<String> {
        self.controls.keys().cloned().collect()
    }

    /// Reflect the applied snapshot in every built control.
    pub fn sync_controls(&mut self) {
        for (name, control) in &mut self.controls {
            control.sync(self.applied.get(name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::control::{field_control, menu_control};

    fn registry() -> ParamRegistry {
        let mut registry = ParamRegistry::new();
        registry
            .register([
                ParamConfig::new("page", ParamKind::Number).with_default(1i64),
                ParamConfig::new("search", ParamKind::Text).with_control(field_control(None)),
                ParamConfig::new("per_page", ParamKind::Choice)
                    .with_default(10i64)
                    .with_values(vec![ParamOption::plain(10i64)])
                    .with_control(menu_control()),
            ])
            .unwrap();
        registry
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry
            .register([ParamConfig::new("page", ParamKind::Number)])
            .unwrap_err();
        assert!(matches!(err, ListingError::Validation(_)));
    }

    #[test]
    fn test_duplicate_within_batch_registers_nothing() {
        let mut registry = ParamRegistry::new();
        let result = registry.register([
            ParamConfig::new("sort", ParamKind::Choice),
            ParamConfig::new("sort", ParamKind::Choice),
        ]);
        assert!(result.is_err());
        assert!(!registry.is_registered("sort"));
    }

    #[test]
    fn test_defaults_seed_snapshot() {
        let registry = registry();
        assert_eq!(registry.values().number("page"), Some(1));
        assert_eq!(registry.values().get("search"), &ParamValue::Unset);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["page", "search", "per_page"]);
    }

    #[test]
    fn test_unrecognized_names_dropped() {
        let registry = registry();
        let partial = SearchParams::new().with("page", 2i64).with("bogus", "x");
        let recognized = registry.recognized(partial);
        assert!(recognized.contains("page"));
        assert!(!recognized.contains("bogus"));
    }

    #[test]
    fn test_initiators_are_changed_names() {
        let registry = registry();
        let resolved = registry
            .values()
            .merged(&SearchParams::new().with("page", 1i64).with("search", "rust"));
        let initiators = registry.initiators(&resolved);
        assert_eq!(initiators.into_iter().collect::<Vec<_>>(), ["search"]);
    }

    #[test]
    fn test_controls_built_lazily_and_synced() {
        let mut registry = registry();
        assert!(!registry.has_built_control("search"));
        assert!(registry.control("page").is_none());

        registry.merge_applied(&SearchParams::new().with("search", "rust"));
        let Some(Control::Field(field)) = registry.control("search") else {
            panic!("expected field");
        };
        assert_eq!(field.text, "rust");

        registry.merge_applied(&SearchParams::new().with("search", "serde"));
        registry.sync_controls();
        let Some(Control::Field(field)) = registry.control("search") else {
            panic!("expected field");
        };
        assert_eq!(field.text, "serde");
    }

    #[test]
    fn test_set_param_values_updates_control() {
        let mut registry = registry();
        registry.control("per_page");
        let changed = registry.set_param_values(
            "per_page",
            vec![ParamOption::plain(10i64), ParamOption::plain(50i64)],
        );
        assert!(changed);

        let Some(Control::Menu(menu)) = registry.control("per_page") else {
            panic!("expected menu");
        };
        assert_eq!(menu.options.len(), 2);
        assert!(!registry.set_param_values("per_page", vec![ParamOption::plain(10i64), ParamOption::plain(50i64)]));
    }
}
