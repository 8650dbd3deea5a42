//! Service bridges for the tiffin app
//!
//! This crate connects the state store to the outside world: an auth
//! provider abstraction whose pushed identity changes flow into the
//! store, and a notifier abstraction fed from store events. Both sides
//! talk to [`app_state::AppStore`] only through its public surface.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod notifications;

pub use auth::{spawn_auth_listener, AuthAccount, AuthError, AuthProvider, AuthStateChange, MockAuthProvider};
pub use notifications::{notification_for, spawn_notification_bridge, LocalNotification, Notifier};
