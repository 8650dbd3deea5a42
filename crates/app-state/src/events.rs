//! Store events
//!
//! State changes that collaborators care about are broadcast as events
//! rather than invoked inline, so a failing observer (for example the
//! notification service) can never affect store correctness.

use crate::order::Order;
use crate::session::User;

/// Capacity of the store's broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Events emitted by the store after a state change is applied
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A user signed in (credential or guest)
    SignedIn(User),
    /// The session ended and all state was reset
    SignedOut,
    /// The subscription was paused
    SubscriptionPaused,
    /// The subscription was resumed
    SubscriptionResumed,
    /// An order was placed
    OrderPlaced(Order),
    /// The active order moved to a new stage
    OrderStatusChanged(Order),
}
