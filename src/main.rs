//! Console walkthrough of the store lifecycle
//!
//! Opens a sled-backed store, signs in, sets up a subscription, and
//! places an order, then watches the simulated delivery run to
//! completion. State survives across runs; a second invocation restores
//! the previous session from disk.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use app_core::{spawn_notification_bridge, LocalNotification, Notifier};
use app_state::{
    AddressKind, AppStore, MealTime, MealType, NewAddress, OrderDetails, SubscriptionPlan,
};
use async_trait::async_trait;
use storage::{KvConfig, KvStore, StorageAdapter};

struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn deliver(&self, notification: LocalNotification) -> app_core::notifications::Result<()> {
        println!("[notification] {}: {}", notification.title, notification.body);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tiffin::init_tracing();

    let kv = KvStore::new(KvConfig::new("tiffin-data"))?;
    let store = AppStore::new(Arc::new(kv) as Arc<dyn StorageAdapter>);
    store.load().await?;

    let bridge = spawn_notification_bridge(store.clone(), Arc::new(ConsoleNotifier));

    match store.current_user().await {
        Some(user) => println!("Welcome back, {}", user.display_name),
        None => {
            let user = store.login("9876543210", "demo@example.com").await?;
            println!("Signed in as {} ({})", user.display_name, user.id);
        }
    }

    store.update_subscription(Some(SubscriptionPlan::Weekly)).await?;
    store.update_meal_preference(MealType::Veg, MealTime::Lunch).await?;

    if store.addresses().await.is_empty() {
        store
            .add_address(NewAddress {
                kind: AddressKind::Home,
                name: "Demo User".to_string(),
                phone: "9876543210".to_string(),
                address_line1: "12 MG Road".to_string(),
                address_line2: None,
                landmark: Some("Opposite City Park".to_string()),
                city: "Pune".to_string(),
                pincode: "411001".to_string(),
            })
            .await?;
    }

    let order = store
        .place_order(OrderDetails {
            plan: store.subscription_plan().await,
            address_id: store.delivery_address().await.map(|a| a.id),
        })
        .await?;
    println!(
        "Placed {} with {}, estimated delivery {}",
        order.id,
        order.delivery_partner,
        order.estimated_time.format("%H:%M")
    );

    // Let the staged delivery simulation run to the terminal stage
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        match store.active_order().await {
            Some(order) if order.status.is_terminal() => {
                println!("{} reached: {}", order.id, order.status.label());
                break;
            }
            Some(order) => println!("{} status: {}", order.id, order.status.label()),
            None => break,
        }
    }

    bridge.abort();
    Ok(())
}
