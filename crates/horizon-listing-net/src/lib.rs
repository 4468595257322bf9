//! Networking module for Horizon Listing.
//!
//! This crate provides the cancellable HTTP client used by API-backed
//! listings:
//!
//! - `HttpClient` / `HttpClientBuilder`: configured `reqwest` client
//! - `HttpRequestBuilder`: query pairs, headers, JSON bodies
//! - `send_cancellable` / `json_response`: requests bound to a
//!   [`horizon_listing_core::CancellationToken`]
//!
//! ## Configuration
//!
//! ```ignore
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(60))
//!     .user_agent("MyApp/1.0")
//!     .no_cookies()
//!     .build()?;
//! ```

mod error;
pub mod http;

pub use error::{NetworkError, Result};

pub use http::{
    HttpClient, HttpClientBuilder, HttpClientConfig, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponse, RequestBody,
};
