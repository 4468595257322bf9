//! Per-item action endpoints reported by an API.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use crate::error::{ListingError, Result};
use crate::items::ItemKey;

/// URL templates by action name (`visit`, `edit`, `delete`, `delete_many`,
/// or anything else the API defines).
///
/// `{key}` is replaced by the first key and `{keys}` by all keys joined
/// with commas. Relative templates resolve against the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Endpoints(BTreeMap<String, String>);

impl Endpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: impl Into<String>, template: impl Into<String>) -> Self {
        self.0.insert(action.into(), template.into());
        self
    }

    pub fn template(&self, action: &str) -> Option<&str> {
        self.0.get(action).map(String::as_str)
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Expand the template for `action`. `None` when the action is unknown.
    pub fn resolve(&self, base: &Url, action: &str, keys: &[ItemKey]) -> Result<Option<Url>> {
        let Some(template) = self.template(action) else {
            return Ok(None);
        };
        let encoded: Vec<String> = keys
            .iter()
            .map(|key| url::form_urlencoded::byte_serialize(key.as_str().as_bytes()).collect())
            .collect();
        let expanded = template
            .replace("{keys}", &encoded.join(","))
            .replace("{key}", encoded.first().map(String::as_str).unwrap_or_default());
        base.join(&expanded).map(Some).map_err(|err| {
            ListingError::validation(format!("invalid '{action}' endpoint '{expanded}': {err}"))
        })
    }
}
