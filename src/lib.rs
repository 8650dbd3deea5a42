//! State management core for the Tiffin food subscription app
//!
//! The workspace splits into three layers re-exported here:
//!
//! - [`storage`]: the persistence adapter trait and its sled-backed and
//!   in-memory implementations
//! - [`app_state`]: the state store itself, covering session,
//!   subscription, addresses, and order tracking
//! - [`app_core`]: bridges from the store to external services, namely
//!   auth providers and local notifications

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use app_core;
pub use app_state;
pub use storage;

/// Install the process-wide tracing subscriber
///
/// Filter defaults to `info` and is overridable through `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
