//! Requests and the cancellable send path.

use std::fmt;
use std::time::Duration;

use horizon_listing_core::CancellationToken;
use horizon_listing_core::logging::targets;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::client::HttpClient;
use super::response::HttpResponse;
use crate::error::{NetworkError, Result};

/// Methods listing sources need: fetching pages, posting actions, deleting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default)]
pub enum RequestBody {
    #[default]
    None,
    Json(serde_json::Value),
}

/// A request as it will be sent.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    /// Query pairs appended to `url`, in order.
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Overrides the client timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// `url` with the query pairs form-encoded onto it.
    pub fn full_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// Builder returned by the [`HttpClient`] verb methods.
pub struct HttpRequestBuilder {
    client: HttpClient,
    request: HttpRequest,
}

impl HttpRequestBuilder {
    pub(crate) fn new(client: HttpClient, method: HttpMethod, url: String) -> Self {
        Self {
            client,
            request: HttpRequest {
                method,
                url,
                headers: HeaderMap::new(),
                query: Vec::new(),
                body: RequestBody::None,
                timeout: None,
            },
        }
    }

    /// Set a header. Invalid names or values are skipped with a warning.
    pub fn header(
        mut self,
        name: impl TryInto<HeaderName>,
        value: impl TryInto<HeaderValue>,
    ) -> Self {
        match (name.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.request.headers.insert(name, value);
            }
            _ => tracing::warn!(target: targets::NET, url = %self.request.url, "skipping invalid header"),
        }
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.push((key.into(), value.into()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.request.query.extend(pairs);
        self
    }

    /// Send `body` as JSON.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.request.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> HttpRequest {
        self.request
    }

    /// Send and wait for the response, whatever its status.
    pub async fn send(self) -> Result<HttpResponse> {
        let HttpRequestBuilder { client, request } = self;
        let url = request.full_url()?;
        tracing::debug!(target: targets::NET, method = %request.method, %url, "sending request");

        let mut outgoing = client
            .reqwest_client()
            .request(request.method.to_reqwest(), url)
            .headers(request.headers);
        if let Some(timeout) = request.timeout {
            outgoing = outgoing.timeout(timeout);
        }
        if let RequestBody::Json(value) = &request.body {
            outgoing = outgoing.json(value);
        }
        Ok(HttpResponse::from_reqwest(outgoing.send().await?))
    }

    /// Like [`send`](Self::send), but resolves with
    /// [`NetworkError::Cancelled`] as soon as `token` fires. The in-flight
    /// request is dropped, which closes its connection.
    pub async fn send_cancellable(self, token: &CancellationToken) -> Result<HttpResponse> {
        if token.is_cancelled() {
            return Err(NetworkError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(target: targets::NET, "request cancelled");
                Err(NetworkError::Cancelled)
            }
            result = self.send() => result,
        }
    }

    /// Send with cancellation, reject error statuses, and decode the JSON
    /// body. The token is observed while the body downloads too.
    pub async fn json_response<T: DeserializeOwned>(self, token: &CancellationToken) -> Result<T> {
        let response = self.send_cancellable(token).await?.error_for_status().await?;
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(NetworkError::Cancelled),
            body = response.json() => body,
        }
    }
}
