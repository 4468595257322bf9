//! Logging facilities for Horizon Listing.
//!
//! Horizon Listing uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_listing=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_listing_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_listing_core::signal";
    /// Listing base and apply cycles.
    pub const LISTING: &str = "horizon_listing::listing";
    /// Paging calculator and paged capability.
    pub const PAGING: &str = "horizon_listing::paging";
    /// Parameter registry and negotiation.
    pub const PARAMS: &str = "horizon_listing::params";
    /// Selection state.
    pub const SELECTION: &str = "horizon_listing::selection";
    /// Remote API listing.
    pub const API: &str = "horizon_listing::api";
    /// Local store listing.
    pub const STORE: &str = "horizon_listing::store";
    /// HTTP client.
    pub const NET: &str = "horizon_listing_net::http";
}
