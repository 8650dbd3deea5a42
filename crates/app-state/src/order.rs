//! Orders and their delivery progression
//!
//! An order moves through four stages in a fixed forward-only sequence.
//! On device the progression is driven by the simulated cadence in
//! [`STAGE_SCHEDULE`], standing in for real dispatch telemetry.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::subscription::SubscriptionPlan;

/// Minutes from placement to the estimated delivery time
pub const DELIVERY_ESTIMATE_MINUTES: i64 = 45;

/// Simulated stage transitions: offset from placement and target status
pub const STAGE_SCHEDULE: [(Duration, OrderStatus); 3] = [
    (Duration::from_secs(5), OrderStatus::Preparing),
    (Duration::from_secs(15), OrderStatus::OutForDelivery),
    (Duration::from_secs(30), OrderStatus::Delivered),
];

/// Pool of delivery partners an order is assigned from
pub const DELIVERY_PARTNERS: &[&str] = &["Ravi Kumar", "Suresh Patel", "Amit Sharma", "Priya Singh"];

/// Delivery stage of an order
///
/// Variants are declared in progression order, so the derived `Ord`
/// matches the 0..3 stage ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Order received by the kitchen
    Received,
    /// Meal being prepared
    Preparing,
    /// Delivery partner on the way
    OutForDelivery,
    /// Order delivered
    Delivered,
}

impl OrderStatus {
    /// Stage ordinal, 0 through 3
    pub fn ordinal(&self) -> u8 {
        match self {
            OrderStatus::Received => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::OutForDelivery => 2,
            OrderStatus::Delivered => 3,
        }
    }

    /// Check if this is the terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Get a human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Order Received",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

/// Checkout details captured when placing an order
#[derive(Debug, Clone, Default)]
pub struct OrderDetails {
    /// Plan the order was placed under
    pub plan: Option<SubscriptionPlan>,
    /// Delivery address id chosen at checkout
    pub address_id: Option<String>,
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order id
    pub id: String,

    /// Current delivery stage
    pub status: OrderStatus,

    /// When the order was placed
    pub created_at: DateTime<Utc>,

    /// Estimated delivery time
    pub estimated_time: DateTime<Utc>,

    /// Delivery partner assigned at placement
    pub delivery_partner: String,

    /// Plan the order was placed under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<SubscriptionPlan>,

    /// Delivery address id chosen at checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
}

impl Order {
    /// Create a freshly placed order
    pub fn place(id: String, details: OrderDetails, now: DateTime<Utc>) -> Self {
        Self {
            delivery_partner: pick_partner(&id),
            id,
            status: OrderStatus::Received,
            created_at: now,
            estimated_time: now + ChronoDuration::minutes(DELIVERY_ESTIMATE_MINUTES),
            plan: details.plan,
            address_id: details.address_id,
        }
    }
}

/// Pick a partner from the pool, keyed off the order id
fn pick_partner(order_id: &str) -> String {
    let seed: usize = order_id.bytes().map(usize::from).sum();
    DELIVERY_PARTNERS[seed % DELIVERY_PARTNERS.len()].to_string()
}
