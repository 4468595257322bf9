//! The shared HTTP client.

use std::sync::Arc;
use std::time::Duration;

use horizon_listing_core::logging::targets;
use http::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;

use super::request::{HttpMethod, HttpRequestBuilder};
use crate::error::{NetworkError, Result};

const MAX_REDIRECTS: usize = 10;

/// Settings a client was built with.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub follow_redirects: bool,
    /// Keep cookies between requests, for session-authenticated APIs.
    pub cookies_enabled: bool,
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            follow_redirects: true,
            cookies_enabled: true,
            user_agent: Some(concat!("HorizonListing/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

/// Builder for [`HttpClient`].
///
/// Every client sends `Accept: application/json` unless a default header
/// overrides it.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    headers: HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            config: HttpClientConfig::default(),
            headers,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn no_redirects(mut self) -> Self {
        self.config.follow_redirects = false;
        self
    }

    pub fn no_cookies(mut self) -> Self {
        self.config.cookies_enabled = false;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Send `name: value` with every request, e.g. an API token.
    pub fn default_header(
        mut self,
        name: impl TryInto<HeaderName>,
        value: impl TryInto<HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader("bad default header name".to_string()))?;
        let value = value.try_into().map_err(|_| {
            NetworkError::InvalidHeader(format!("bad value for default header '{name}'"))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn build(self) -> Result<HttpClient> {
        let HttpClientBuilder { config, headers } = self;

        let redirects = match config.follow_redirects {
            true => Policy::limited(MAX_REDIRECTS),
            false => Policy::none(),
        };
        let mut builder = reqwest::Client::builder()
            .redirect(redirects)
            .cookie_store(config.cookies_enabled)
            .default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build()?;
        tracing::trace!(target: targets::NET, ?config, "http client built");
        Ok(HttpClient {
            shared: Arc::new(Shared { client, config }),
        })
    }
}

struct Shared {
    client: reqwest::Client,
    config: HttpClientConfig,
}

/// HTTP client shared by the listings of an application.
///
/// Clones share one connection pool.
///
/// ```ignore
/// let client = HttpClient::builder().no_cookies().build()?;
/// let source = ApiSource::builder()
///     .endpoint("https://api.example.com/users")
///     .client(client.clone())
///     .build()?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    shared: Arc<Shared>,
}

impl HttpClient {
    /// A client with default settings.
    pub fn new() -> Result<Self> {
        HttpClientBuilder::new().build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.shared.config
    }

    pub fn get(&self, url: impl AsRef<str>) -> HttpRequestBuilder {
        self.request(HttpMethod::Get, url)
    }

    pub fn post(&self, url: impl AsRef<str>) -> HttpRequestBuilder {
        self.request(HttpMethod::Post, url)
    }

    pub fn delete(&self, url: impl AsRef<str>) -> HttpRequestBuilder {
        self.request(HttpMethod::Delete, url)
    }

    pub fn request(&self, method: HttpMethod, url: impl AsRef<str>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(self.clone(), method, url.as_ref().to_string())
    }

    pub(crate) fn reqwest_client(&self) -> &reqwest::Client {
        &self.shared.client
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.shared.config)
            .finish()
    }
}
