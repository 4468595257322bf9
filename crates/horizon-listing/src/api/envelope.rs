//! The JSON envelope returned by listing APIs.

use std::collections::{BTreeMap, HashMap};

use horizon_listing_core::logging::targets;
use serde::Deserialize;
use serde_json::Value;

use super::endpoints::Endpoints;
use crate::error::{ListingError, Result};
use crate::items::{ItemKey, ListingItem};
use crate::params::{ParamOption, ParamValue};
use crate::source::{CustomParam, ListingMetadata};

/// An option given either as a bare value or as `{ value, label }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OptionSpec {
    Labeled { value: ParamValue, label: String },
    Plain(ParamValue),
}

impl From<OptionSpec> for ParamOption {
    fn from(spec: OptionSpec) -> Self {
        match spec {
            OptionSpec::Labeled { value, label } => ParamOption::new(value, label),
            OptionSpec::Plain(value) => ParamOption::plain(value),
        }
    }
}

/// A custom parameter given by name, or by name with its option set.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum CustomParamSpec {
    Named(String),
    Full {
        name: String,
        #[serde(default)]
        values: Vec<OptionSpec>,
    },
}

impl From<CustomParamSpec> for CustomParam {
    fn from(spec: CustomParamSpec) -> Self {
        match spec {
            CustomParamSpec::Named(name) => CustomParam {
                name,
                values: Vec::new(),
            },
            CustomParamSpec::Full { name, values } => CustomParam {
                name,
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope {
    pub total: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub search_params: serde_json::Map<String, Value>,
    #[serde(default)]
    pub search_param_translations: HashMap<String, String>,
    #[serde(default)]
    pub custom_search_params: Vec<CustomParamSpec>,
    #[serde(default)]
    pub sort_values: Option<Vec<OptionSpec>>,
    #[serde(default)]
    pub per_page_values: Option<Vec<OptionSpec>>,
    #[serde(default)]
    pub relevance_key: Option<String>,
    #[serde(default)]
    pub titles: BTreeMap<String, String>,
    #[serde(default)]
    pub endpoints: Option<Endpoints>,
}

impl ApiEnvelope {
    /// Entries found at `data`, or at `data.<path>` when a model path is set.
    ///
    /// Objects are keyed by their property names. Arrays are keyed by each
    /// entry's `primary_key` field, falling back to the absolute position
    /// (`offset` is the position of the first entry).
    pub fn entries(&self, data_model_path: Option<&str>, primary_key: &str, offset: usize) -> Result<Vec<ListingItem>> {
        let mut data = &self.data;
        if let Some(path) = data_model_path {
            for segment in path.split('.').filter(|s| !s.is_empty()) {
                data = data.get(segment).ok_or_else(|| {
                    ListingError::Envelope(format!("data has no '{segment}' (model path '{path}')"))
                })?;
            }
        }

        match data {
            Value::Null => Ok(Vec::new()),
            Value::Object(map) => Ok(map
                .iter()
                .map(|(key, value)| ListingItem::new(key.as_str(), value.clone()))
                .collect()),
            Value::Array(list) => Ok(list
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    let key = value.get(primary_key).and_then(ItemKey::from_json);
                    let key = key.unwrap_or_else(|| {
                        let position = offset + index;
                        tracing::warn!(target: targets::API, position, primary_key, "entry has no usable primary key, keying by position");
                        ItemKey::new(format!("#{position}"))
                    });
                    ListingItem {
                        key,
                        value: value.clone(),
                    }
                })
                .collect()),
            other => Err(ListingError::Envelope(format!(
                "data must be an object or an array, got {other}"
            ))),
        }
    }

    /// Option sets and labels carried by the envelope, if any.
    pub fn metadata(&self) -> Option<ListingMetadata> {
        let convert = |specs: &Option<Vec<OptionSpec>>| {
            specs
                .as_ref()
                .map(|specs| specs.iter().cloned().map(ParamOption::from).collect::<Vec<_>>())
        };
        let metadata = ListingMetadata {
            sort_values: convert(&self.sort_values),
            per_page_values: convert(&self.per_page_values),
            relevance_key: self.relevance_key.clone(),
            titles: self.titles.clone(),
            custom_params: self.custom_search_params.iter().cloned().map(Into::into).collect(),
        };
        (metadata != ListingMetadata::default()).then_some(metadata)
    }
}
