//! Error types for listings.

use horizon_listing_net::NetworkError;

/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, ListingError>;

/// Errors that can occur while building or driving a listing.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// Malformed source or configuration detected while building.
    #[error("Invalid listing configuration: {0}")]
    Validation(String),

    /// The apply cycle was superseded by a newer one or cancelled.
    #[error("Apply cycle was superseded or cancelled")]
    Aborted,

    /// The in-flight apply cycle this call waited for failed.
    #[error("Joined apply cycle failed: {0}")]
    JoinedCycleFailed(String),

    /// A paging value was out of range (negative total, zero per-page).
    #[error("Value out of range: {0}")]
    Range(String),

    /// The HTTP layer failed.
    #[error("Network error: {0}")]
    Network(#[source] NetworkError),

    /// The local store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// The API response did not have the expected shape.
    #[error("Malformed API envelope: {0}")]
    Envelope(String),

    /// A TOML configuration could not be parsed.
    #[error("Failed to parse listing configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl ListingError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a range error.
    pub fn range(message: impl Into<String>) -> Self {
        Self::Range(message.into())
    }

    /// Whether this is the abort condition of a superseded apply cycle.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

impl From<NetworkError> for ListingError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Cancelled => Self::Aborted,
            other => Self::Network(other),
        }
    }
}

impl From<serde_json::Error> for ListingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Envelope(err.to_string())
    }
}
