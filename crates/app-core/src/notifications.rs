//! Local notification bridge
//!
//! Notifications are derived from store events rather than fired inside
//! mutations, so the store never blocks on notification delivery and a
//! failed notification never affects state. [`notification_for`] holds
//! the message templates; [`spawn_notification_bridge`] subscribes to a
//! store and forwards each event's notification to a [`Notifier`].

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use app_state::{AppStore, OrderStatus, StoreEvent};
use OrderStatus::{Delivered, OutForDelivery, Preparing, Received};

/// Notification errors
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The platform notification service refused the request
    #[error("Notification rejected: {0}")]
    Rejected(String),

    /// The platform notification service could not be reached
    #[error("Notification service unavailable: {0}")]
    Unavailable(String),
}

/// Result type for notification delivery
pub type Result<T> = std::result::Result<T, NotificationError>;

/// A notification ready for the platform tray
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNotification {
    /// Tray title
    pub title: String,
    /// Tray body
    pub body: String,
}

impl LocalNotification {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Platform notification service
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification to the tray
    async fn deliver(&self, notification: LocalNotification) -> Result<()>;
}

/// The notification for an order reaching `status`, if that stage is
/// announced
pub fn order_stage_notification(
    order_id: &str,
    status: OrderStatus,
    delivery_partner: &str,
) -> Option<LocalNotification> {
    match status {
        Received => Some(LocalNotification::new(
            "Order Confirmed!",
            format!("Your order #{order_id} has been confirmed. We're preparing your delicious meal!"),
        )),
        Preparing => Some(LocalNotification::new(
            "Preparing Your Meal",
            format!("Your order #{order_id} is being freshly prepared with love!"),
        )),
        OutForDelivery => Some(LocalNotification::new(
            "Out for Delivery!",
            format!("{delivery_partner} is on the way with your order #{order_id}. ETA: 20 mins"),
        )),
        Delivered => Some(LocalNotification::new(
            "Order Delivered!",
            format!("Your order #{order_id} has been delivered. Enjoy your meal!"),
        )),
    }
}

/// Reminder sent ahead of a subscription renewal
pub fn renewal_reminder(days_left: u32) -> LocalNotification {
    LocalNotification::new(
        "Subscription Renewal Reminder",
        format!(
            "Your subscription will renew in {days_left} days. \
             Make sure your payment method is up to date!"
        ),
    )
}

/// The notification a store event should produce, if any
pub fn notification_for(event: &StoreEvent) -> Option<LocalNotification> {
    match event {
        StoreEvent::OrderPlaced(order) => {
            order_stage_notification(&order.id, order.status, &order.delivery_partner)
        }
        StoreEvent::OrderStatusChanged(order) => {
            order_stage_notification(&order.id, order.status, &order.delivery_partner)
        }
        StoreEvent::SubscriptionPaused => Some(LocalNotification::new(
            "Subscription Paused",
            "Your subscription has been paused. You can resume it anytime from your profile.",
        )),
        StoreEvent::SubscriptionResumed => Some(LocalNotification::new(
            "Subscription Resumed",
            "Welcome back! Your subscription has been resumed. Fresh meals coming your way!",
        )),
        StoreEvent::SignedIn(_) | StoreEvent::SignedOut => None,
    }
}

/// Forward store events to the notifier as tray notifications
///
/// Runs until the store's event channel closes. Delivery failures are
/// logged and never fed back into the store; a lagged receiver drops the
/// missed events.
pub fn spawn_notification_bridge(store: AppStore, notifier: Arc<dyn Notifier>) -> JoinHandle<()> {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let Some(notification) = notification_for(&event) else {
                        continue;
                    };
                    if let Err(error) = notifier.deliver(notification).await {
                        tracing::warn!(%error, "failed to deliver notification");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification bridge lagged, dropping missed events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_state::{MealTime, MealType, OrderDetails};
    use std::sync::Arc;
    use storage::{MemoryStore, StorageAdapter};
    use tokio::sync::Mutex;

    struct RecordingNotifier {
        delivered: Mutex<Vec<LocalNotification>>,
        fail: std::sync::atomic::AtomicBool,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                fail: std::sync::atomic::AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, notification: LocalNotification) -> Result<()> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(NotificationError::Unavailable("injected".to_string()));
            }
            self.delivered.lock().await.push(notification);
            Ok(())
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn test_store() -> AppStore {
        AppStore::new(Arc::new(MemoryStore::new()) as Arc<dyn StorageAdapter>)
    }

    #[test]
    fn test_every_order_stage_is_announced() {
        for status in [Received, Preparing, OutForDelivery, Delivered] {
            let notification = order_stage_notification("ORD-1", status, "Ravi Kumar");
            assert!(notification.is_some(), "stage {status:?} has no template");
        }
    }

    #[test]
    fn test_out_for_delivery_names_the_partner() {
        let notification = order_stage_notification("ORD-1", OutForDelivery, "Priya Singh").unwrap();
        assert!(notification.body.contains("Priya Singh"));
        assert!(notification.body.contains("ORD-1"));
    }

    #[test]
    fn test_renewal_reminder_counts_down() {
        let notification = renewal_reminder(3);
        assert!(notification.body.contains("renew in 3 days"));
    }

    #[test]
    fn test_session_events_produce_no_notification() {
        assert_eq!(notification_for(&StoreEvent::SignedOut), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bridge_announces_order_lifecycle() {
        let store = test_store();
        store.load().await.unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let bridge = spawn_notification_bridge(store.clone(), notifier.clone());

        store.place_order(OrderDetails::default()).await.unwrap();
        // Let the spawned stage tasks register their timers before moving the clock
        settle().await;
        for step in [5, 10, 15] {
            tokio::time::advance(std::time::Duration::from_secs(step)).await;
            settle().await;
        }

        let delivered = notifier.delivered.lock().await;
        let titles: Vec<&str> = delivered.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Order Confirmed!",
                "Preparing Your Meal",
                "Out for Delivery!",
                "Order Delivered!",
            ]
        );
        drop(delivered);

        bridge.abort();
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_affect_store() {
        let store = test_store();
        store.load().await.unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        notifier.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let bridge = spawn_notification_bridge(store.clone(), notifier.clone());

        store.pause_subscription().await.unwrap();
        store
            .update_meal_preference(MealType::Veg, MealTime::Lunch)
            .await
            .unwrap();
        settle().await;

        assert!(store.subscription_status().await.is_paused());
        assert!(notifier.delivered.lock().await.is_empty());

        bridge.abort();
    }
}
