//! Responses.

use serde::de::DeserializeOwned;

use crate::error::{NetworkError, Result};

/// A received response; the body is read by the consuming methods.
pub struct HttpResponse {
    inner: reqwest::Response,
}

impl HttpResponse {
    pub(crate) fn from_reqwest(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Header value, if present and valid UTF-8.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.inner.headers().get(name.as_ref())?.to_str().ok()
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &str {
        self.inner.url().as_str()
    }

    pub async fn text(self) -> Result<String> {
        Ok(self.inner.text().await?)
    }

    /// Decode the body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.inner.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Turn a 4xx/5xx response into [`NetworkError::HttpStatus`], carrying
    /// the body text as the message when there is one.
    pub async fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = self.inner.text().await.ok().filter(|body| !body.is_empty());
        Err(NetworkError::HttpStatus { status, message })
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status())
            .field("url", &self.url())
            .finish()
    }
}
