//! Listings backed by a remote JSON API.
//!
//! One GET per apply cycle: recognized parameters become query pairs (after
//! name translation), and the response envelope supplies the entries, the
//! total, the parameters the server applied, and optional metadata.
//!
//! ```json
//! {
//!   "total": 23,
//!   "data": { "7": { "name": "Ada" } },
//!   "search_params": { "page": 1, "sort": "name" },
//!   "sort_values": ["name", "age"],
//!   "endpoints": { "delete": "/users/{key}" }
//! }
//! ```

mod endpoints;
mod envelope;

use std::collections::HashMap;

use horizon_listing_core::logging::targets;
use horizon_listing_net::HttpClient;
use parking_lot::RwLock;
use url::Url;

pub use endpoints::Endpoints;
use envelope::ApiEnvelope;

use crate::error::{ListingError, Result};
use crate::items::ItemKey;
use crate::listing::Listing;
use crate::params::{ParamValue, SearchParams};
use crate::source::{ApplyContext, ListingSource, SourcePage};

/// A listing over a remote API.
pub type ApiListing = Listing<ApiSource>;

/// Builder for [`ApiSource`].
#[derive(Debug, Default)]
pub struct ApiSourceBuilder {
    endpoint: Option<String>,
    client: Option<HttpClient>,
    translations: HashMap<String, String>,
    data_model_path: Option<String>,
    primary_key: Option<String>,
}

impl ApiSourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the listing endpoint. Required.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// HTTP client to use. Defaults to a client with default configuration.
    pub fn client(mut self, client: HttpClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Send parameter `name` to the server as `server_name`.
    pub fn translate(mut self, name: impl Into<String>, server_name: impl Into<String>) -> Self {
        self.translations.insert(name.into(), server_name.into());
        self
    }

    /// Dotted path inside `data` where the entries live.
    pub fn data_model_path(mut self, path: impl Into<String>) -> Self {
        self.data_model_path = Some(path.into());
        self
    }

    /// Field keying array entries. Defaults to `id`.
    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = Some(key.into());
        self
    }

    pub fn build(self) -> Result<ApiSource> {
        let raw = self
            .endpoint
            .filter(|endpoint| !endpoint.trim().is_empty())
            .ok_or_else(|| ListingError::validation("API listing requires an endpoint URL"))?;
        let endpoint = Url::parse(raw.trim())
            .map_err(|err| ListingError::validation(format!("invalid endpoint URL '{raw}': {err}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ListingError::validation(format!(
                "endpoint URL '{raw}' must use http or https"
            )));
        }
        let client = match self.client {
            Some(client) => client,
            None => HttpClient::new()?,
        };
        Ok(ApiSource {
            client,
            endpoint,
            data_model_path: self.data_model_path,
            primary_key: self.primary_key.unwrap_or_else(|| "id".to_string()),
            translations: RwLock::new(self.translations),
            endpoints: RwLock::new(Endpoints::default()),
        })
    }
}

/// Fetches listing pages from a JSON API.
pub struct ApiSource {
    client: HttpClient,
    endpoint: Url,
    data_model_path: Option<String>,
    primary_key: String,
    translations: RwLock<HashMap<String, String>>,
    endpoints: RwLock<Endpoints>,
}

impl ApiSource {
    pub fn builder() -> ApiSourceBuilder {
        ApiSourceBuilder::new()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Action endpoints reported by the API so far.
    pub fn endpoints(&self) -> Endpoints {
        self.endpoints.read().clone()
    }

    /// Name sent to the server for parameter `name`.
    pub fn server_name(&self, name: &str) -> String {
        self.translations
            .read()
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Parameter name for a name received from the server.
    pub fn param_name(&self, server_name: &str) -> String {
        self.translations
            .read()
            .iter()
            .find(|(_, server)| server.as_str() == server_name)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| server_name.to_string())
    }

    /// Expand the endpoint template for `action` with `keys`.
    pub fn endpoint_url(&self, action: &str, keys: &[ItemKey]) -> Result<Option<Url>> {
        self.endpoints.read().resolve(&self.endpoint, action, keys)
    }

    fn query(&self, params: &SearchParams) -> Vec<(String, String)> {
        params
            .iter()
            .filter_map(|(name, value)| Some((self.server_name(name), value.to_query()?)))
            .collect()
    }

    fn absorb(&self, envelope: ApiEnvelope, offset: usize) -> Result<SourcePage> {
        if !envelope.search_param_translations.is_empty() {
            self.translations
                .write()
                .extend(envelope.search_param_translations.clone());
        }
        if let Some(endpoints) = &envelope.endpoints {
            *self.endpoints.write() = endpoints.clone();
        }

        let entries = envelope.entries(self.data_model_path.as_deref(), &self.primary_key, offset)?;
        let applied_params = envelope
            .search_params
            .iter()
            .map(|(name, value)| (self.param_name(name), ParamValue::from_json(value)))
            .collect();

        Ok(SourcePage {
            entries,
            total: Some(envelope.total),
            applied_params,
            metadata: envelope.metadata(),
        })
    }
}

impl ListingSource for ApiSource {
    async fn set_params_request(&self, params: &SearchParams, ctx: &ApplyContext) -> Result<SourcePage> {
        let query = self.query(params);
        tracing::debug!(
            target: targets::API,
            endpoint = %self.endpoint,
            process = %ctx.process.id(),
            params = query.len(),
            "requesting listing page"
        );
        let envelope: ApiEnvelope = self
            .client
            .get(self.endpoint.as_str())
            .query_pairs(query)
            .json_response(ctx.process.token())
            .await?;
        self.absorb(envelope, ctx.offset)
    }
}

impl std::fmt::Debug for ApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSource")
            .field("endpoint", &self.endpoint.as_str())
            .field("data_model_path", &self.data_model_path)
            .field("primary_key", &self.primary_key)
            .finish()
    }
}

impl Listing<ApiSource> {
    /// URL of `action` for one item, when the API reported that action.
    pub fn endpoint_url(&self, action: &str, key: &ItemKey) -> Result<Option<Url>> {
        self.source().endpoint_url(action, std::slice::from_ref(key))
    }

    /// Delete items through the API's delete endpoints, then reload.
    ///
    /// Several keys use `delete_many` when available, otherwise one `delete`
    /// request per key.
    pub async fn delete_items(&self, keys: &[ItemKey]) -> Result<SearchParams> {
        if keys.is_empty() {
            return Ok(self.search_params());
        }
        let source = self.source();
        let batch = match keys.len() {
            1 => None,
            _ => source.endpoint_url("delete_many", keys)?,
        };
        let urls = match batch {
            Some(url) => vec![url],
            None => keys
                .iter()
                .map(|key| {
                    source
                        .endpoint_url("delete", std::slice::from_ref(key))?
                        .ok_or_else(|| ListingError::validation("API did not report a delete endpoint"))
                })
                .collect::<Result<Vec<_>>>()?,
        };

        for url in urls {
            tracing::debug!(target: targets::API, %url, "deleting");
            source.client().delete(url.as_str()).send().await?.error_for_status().await?;
        }
        tracing::info!(target: targets::API, listing = %self.name(), count = keys.len(), "items deleted");
        self.reload().await
    }
}
