//! Subscription plans, status, and meal preferences

use serde::{Deserialize, Serialize};

/// Available subscription plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionPlan {
    /// One fresh meal every day
    Daily,
    /// Meals on weekdays, weekends off
    Weekly,
    /// A full month of meals at the best price
    Monthly,
}

impl SubscriptionPlan {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            SubscriptionPlan::Daily => "Fresh meals delivered every day",
            SubscriptionPlan::Weekly => "Meals for the whole week, delivered daily",
            SubscriptionPlan::Monthly => "A month of meals at the best value",
        }
    }
}

/// Whether the subscription is currently delivering
///
/// Status is meaningful only while a plan is set; it stays at the
/// `Active` default otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Deliveries are running
    #[default]
    Active,
    /// Deliveries are paused until resumed
    Paused,
}

impl SubscriptionStatus {
    /// Check if the subscription is paused
    pub fn is_paused(&self) -> bool {
        matches!(self, SubscriptionStatus::Paused)
    }
}

/// Meal type choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    /// Vegetarian meals only
    Veg,
    /// Non-vegetarian meals only
    #[serde(rename = "Non-Veg")]
    NonVeg,
    /// A mix of both
    Both,
}

/// Meal time choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealTime {
    /// Lunch delivery
    Lunch,
    /// Dinner delivery
    Dinner,
    /// Both deliveries
    Both,
}

/// The user's meal preference
///
/// Type and time are always set together as one record; neither can exist
/// without the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPreference {
    /// What kind of meals to deliver
    #[serde(rename = "type")]
    pub meal_type: MealType,

    /// When to deliver them
    pub time: MealTime,
}

impl MealPreference {
    /// Create a preference with both fields set
    pub fn new(meal_type: MealType, time: MealTime) -> Self {
        Self { meal_type, time }
    }
}
