//! HTTP client for Horizon Listing.
//!
//! A thin layer over `reqwest` that adds cooperative cancellation, so a
//! superseded listing load can drop its request.
//!
//! # Example
//!
//! ```ignore
//! use horizon_listing_core::CancellationToken;
//! use horizon_listing_net::http::HttpClient;
//!
//! let client = HttpClient::new()?;
//! let token = CancellationToken::new();
//!
//! let body: serde_json::Value = client
//!     .get("https://api.example.com/users")
//!     .query("page", "1")
//!     .json_response(&token)
//!     .await?;
//! ```

mod client;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use request::{HttpMethod, HttpRequest, HttpRequestBuilder, RequestBody};
pub use response::HttpResponse;
