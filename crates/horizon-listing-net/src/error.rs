//! Errors raised by the HTTP layer.

use thiserror::Error;

/// Failure of an HTTP exchange.
///
/// Transport errors are flattened to strings so the error stays `Clone`.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("HTTP request error: {0}")]
    Request(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("JSON error: {0}")]
    Json(String),
    /// The request's cancellation token fired first.
    #[error("request was cancelled")]
    Cancelled,
    /// 4xx or 5xx answer, with the body text when there was one.
    #[error("HTTP {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    HttpStatus { status: u16, message: Option<String> },
    #[error("too many redirects")]
    TooManyRedirects,
}

impl NetworkError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else if err.is_decode() {
            Self::Json(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let bare = NetworkError::HttpStatus { status: 502, message: None };
        assert_eq!(bare.to_string(), "HTTP 502");
        let with_body = NetworkError::HttpStatus {
            status: 404,
            message: Some("missing".into()),
        };
        assert_eq!(with_body.to_string(), "HTTP 404: missing");
    }
}
