//! Core systems for Horizon Listing.
//!
//! This crate provides the foundational pieces shared by the listing crates:
//!
//! - **Signal/Slot System**: Type-safe notifications between components
//! - **Property System**: Values with change detection
//! - **Cancellation**: Cooperative cancellation tokens for async work
//! - **Logging**: `tracing` targets used across the workspace
//!
//! # Property Example
//!
//! ```
//! use horizon_listing_core::{Property, Signal};
//!
//! struct Pager {
//!     page: Property<usize>,
//!     page_changed: Signal<usize>,
//! }
//!
//! impl Pager {
//!     fn go_to(&self, page: usize) {
//!         if self.page.set(page) {
//!             self.page_changed.emit(page);
//!         }
//!     }
//! }
//!
//! let pager = Pager { page: Property::new(1), page_changed: Signal::new() };
//! pager.go_to(2);
//! assert_eq!(pager.page.get(), 2);
//! ```

mod cancellation;
pub mod logging;
pub mod property;
pub mod signal;

pub use cancellation::CancellationToken;
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
