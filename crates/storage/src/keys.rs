//! Snapshot keys used by the application state store
//!
//! Every piece of persisted state lives under one of these keys. `ALL`
//! drives the bulk removal on sign-out.

/// Current user record
pub const USER: &str = "user";

/// Selected subscription plan
pub const SUBSCRIPTION_PLAN: &str = "subscriptionPlan";

/// Subscription pause/resume status
pub const SUBSCRIPTION_STATUS: &str = "subscriptionStatus";

/// Meal type and time preference
pub const MEAL_PREFERENCE: &str = "mealPreference";

/// Address book
pub const ADDRESSES: &str = "addresses";

/// Active order snapshot
pub const ACTIVE_ORDER: &str = "activeOrder";

/// Every snapshot key, in load order
pub const ALL: &[&str] = &[
    USER,
    SUBSCRIPTION_PLAN,
    SUBSCRIPTION_STATUS,
    MEAL_PREFERENCE,
    ADDRESSES,
    ACTIVE_ORDER,
];
