//! The application state store
//!
//! [`AppStore`] is the single surface the presentation layer calls; no
//! other mutation path exists. It is an explicit, injectable object
//! constructed once at app start and handed to consumers by clone.
//!
//! Every mutation follows the same shape: apply the change to in-memory
//! state, emit an event for observers, then persist the affected snapshot.
//! The in-memory update is authoritative; a failed persistence write is
//! reported to the caller (or logged, for timer-driven order transitions)
//! but never rolled back.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

use storage::{keys, StorageAdapter};

use crate::address::{Address, AddressBook, AddressError, AddressPatch, NewAddress};
use crate::events::{StoreEvent, EVENT_CHANNEL_CAPACITY};
use crate::ids::IdGenerator;
use crate::order::{Order, OrderDetails, OrderStatus, STAGE_SCHEDULE};
use crate::scheduler::StageScheduler;
use crate::session::User;
use crate::subscription::{MealPreference, MealTime, MealType, SubscriptionPlan, SubscriptionStatus};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Persistence adapter failure
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    /// Snapshot serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Address book error
    #[error(transparent)]
    Address(#[from] AddressError),

    /// The id does not match the current active order
    #[error("No active order with id {0}")]
    OrderNotFound(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// In-memory application state
#[derive(Debug, Default)]
struct AppState {
    user: Option<User>,
    subscription_plan: Option<SubscriptionPlan>,
    subscription_status: SubscriptionStatus,
    meal_preference: Option<MealPreference>,
    addresses: AddressBook,
    active_order: Option<Order>,
}

struct StoreInner {
    state: RwLock<AppState>,
    storage: Arc<dyn StorageAdapter>,
    scheduler: StageScheduler,
    events: broadcast::Sender<StoreEvent>,
    ids: IdGenerator,
    is_loading: AtomicBool,
}

/// The application state store
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<StoreInner>,
}

impl AppStore {
    /// Create a store over the given persistence adapter
    ///
    /// The store starts in the loading state; call [`AppStore::load`]
    /// before invoking mutations.
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(AppState::default()),
                storage,
                scheduler: StageScheduler::new(),
                events,
                ids: IdGenerator::new(),
                is_loading: AtomicBool::new(true),
            }),
        }
    }

    /// One-shot bulk read of all persisted snapshots
    ///
    /// Unreadable snapshots are dropped with a warning rather than failing
    /// the whole startup. `is_loading` turns false once this completes,
    /// whether or not the read succeeded.
    pub async fn load(&self) -> Result<()> {
        let result = self.load_snapshots().await;
        self.inner.is_loading.store(false, Ordering::SeqCst);
        result
    }

    async fn load_snapshots(&self) -> Result<()> {
        let user: Option<User> = self.read_snapshot(keys::USER).await?;
        let plan: Option<SubscriptionPlan> = self.read_snapshot(keys::SUBSCRIPTION_PLAN).await?;
        let status: Option<SubscriptionStatus> =
            self.read_snapshot(keys::SUBSCRIPTION_STATUS).await?;
        let preference: Option<MealPreference> = self.read_snapshot(keys::MEAL_PREFERENCE).await?;
        let addresses: Option<Vec<Address>> = self.read_snapshot(keys::ADDRESSES).await?;
        let order: Option<Order> = self.read_snapshot(keys::ACTIVE_ORDER).await?;

        let mut state = self.inner.state.write().await;
        state.user = user;
        state.subscription_plan = plan;
        state.subscription_status = status.unwrap_or_default();
        state.meal_preference = preference;
        state.addresses = AddressBook::from_addresses(addresses.unwrap_or_default());
        state.active_order = order;
        Ok(())
    }

    async fn read_snapshot<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.inner.storage.get(key).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(error) => {
                    tracing::warn!(key, %error, "dropping unreadable snapshot");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Whether the startup load is still in flight
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading.load(Ordering::SeqCst)
    }

    /// Subscribe to store events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is fine
        let _ = self.inner.events.send(event);
    }

    async fn persist<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.inner.storage.set(key, json).await?;
        Ok(())
    }

    async fn persist_best_effort<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(error) = self.persist(key, value).await {
            tracing::warn!(key, %error, "failed to persist snapshot");
        }
    }

    // --- Session ---

    /// Sign in with a phone number and email
    ///
    /// Always constructs a fresh user record; signing in over an existing
    /// session simply replaces it.
    pub async fn login(
        &self,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<User> {
        let user = User::new(self.inner.ids.user_id(), Some(phone.into()), Some(email.into()));
        self.install_session(user).await
    }

    /// Sign in as a guest without contacting any provider
    pub async fn login_as_guest(&self) -> Result<User> {
        self.install_session(User::guest()).await
    }

    /// Adopt an identity pushed by the external auth provider
    ///
    /// Provider-pushed identity changes are authoritative over any locally
    /// cached session.
    pub async fn adopt_session(&self, user: User) -> Result<User> {
        self.install_session(user).await
    }

    async fn install_session(&self, user: User) -> Result<User> {
        {
            let mut state = self.inner.state.write().await;
            state.user = Some(user.clone());
        }
        self.emit(StoreEvent::SignedIn(user.clone()));
        self.persist(keys::USER, &user).await?;
        Ok(user)
    }

    /// Sign out and reset everything to the pre-login default state
    ///
    /// Clears the session, subscription, preference, address book, and
    /// active order, cancels pending stage transitions, and removes every
    /// persisted snapshot.
    pub async fn logout(&self) -> Result<()> {
        self.inner.scheduler.cancel_all().await;
        {
            let mut state = self.inner.state.write().await;
            *state = AppState::default();
        }
        self.emit(StoreEvent::SignedOut);
        self.inner.storage.remove_many(keys::ALL).await?;
        Ok(())
    }

    /// The signed-in user, if any
    pub async fn current_user(&self) -> Option<User> {
        self.inner.state.read().await.user.clone()
    }

    /// Whether a session exists
    pub async fn is_logged_in(&self) -> bool {
        self.inner.state.read().await.user.is_some()
    }

    // --- Subscription & preferences ---

    /// Set or clear the subscription plan
    ///
    /// Setting writes the snapshot; clearing removes the key entirely
    /// rather than writing a null.
    pub async fn update_subscription(&self, plan: Option<SubscriptionPlan>) -> Result<()> {
        {
            let mut state = self.inner.state.write().await;
            state.subscription_plan = plan;
        }
        match plan {
            Some(plan) => self.persist(keys::SUBSCRIPTION_PLAN, &plan).await,
            None => {
                self.inner.storage.remove(keys::SUBSCRIPTION_PLAN).await?;
                Ok(())
            }
        }
    }

    /// The current subscription plan
    pub async fn subscription_plan(&self) -> Option<SubscriptionPlan> {
        self.inner.state.read().await.subscription_plan
    }

    /// Set the meal preference
    ///
    /// Type and time are one record; they can never diverge.
    pub async fn update_meal_preference(&self, meal_type: MealType, time: MealTime) -> Result<()> {
        let preference = MealPreference::new(meal_type, time);
        {
            let mut state = self.inner.state.write().await;
            state.meal_preference = Some(preference);
        }
        self.persist(keys::MEAL_PREFERENCE, &preference).await
    }

    /// The current meal preference
    pub async fn meal_preference(&self) -> Option<MealPreference> {
        self.inner.state.read().await.meal_preference
    }

    /// Pause the subscription
    pub async fn pause_subscription(&self) -> Result<()> {
        self.set_subscription_status(SubscriptionStatus::Paused, StoreEvent::SubscriptionPaused)
            .await
    }

    /// Resume the subscription
    pub async fn resume_subscription(&self) -> Result<()> {
        self.set_subscription_status(SubscriptionStatus::Active, StoreEvent::SubscriptionResumed)
            .await
    }

    async fn set_subscription_status(
        &self,
        status: SubscriptionStatus,
        event: StoreEvent,
    ) -> Result<()> {
        {
            let mut state = self.inner.state.write().await;
            state.subscription_status = status;
        }
        self.emit(event);
        self.persist(keys::SUBSCRIPTION_STATUS, &status).await
    }

    /// The current subscription status
    pub async fn subscription_status(&self) -> SubscriptionStatus {
        self.inner.state.read().await.subscription_status
    }

    // --- Addresses ---

    /// Add a new address
    ///
    /// The first address added becomes the default.
    pub async fn add_address(&self, fields: NewAddress) -> Result<Address> {
        let id = self.inner.ids.address_id();
        let (address, list) = {
            let mut state = self.inner.state.write().await;
            let address = state.addresses.add(id, fields);
            (address, state.addresses.addresses().to_vec())
        };
        self.persist(keys::ADDRESSES, &list).await?;
        Ok(address)
    }

    /// Merge a patch into an existing address
    ///
    /// Setting `is_default` promotes the address and demotes every other
    /// one, keeping exactly one default.
    pub async fn update_address(&self, id: &str, patch: AddressPatch) -> Result<()> {
        let list = {
            let mut state = self.inner.state.write().await;
            state.addresses.update(id, patch)?;
            state.addresses.addresses().to_vec()
        };
        self.persist(keys::ADDRESSES, &list).await
    }

    /// Delete an address
    pub async fn delete_address(&self, id: &str) -> Result<()> {
        let list = {
            let mut state = self.inner.state.write().await;
            state.addresses.remove(id)?;
            state.addresses.addresses().to_vec()
        };
        self.persist(keys::ADDRESSES, &list).await
    }

    /// Choose the address for the in-progress checkout
    ///
    /// Session-local; does not touch the default flag and is not persisted.
    pub async fn select_address(&self, id: &str) -> Result<()> {
        let mut state = self.inner.state.write().await;
        state.addresses.select(id)?;
        Ok(())
    }

    /// All saved addresses
    pub async fn addresses(&self) -> Vec<Address> {
        self.inner.state.read().await.addresses.addresses().to_vec()
    }

    /// The address selected for checkout, if any
    pub async fn selected_address(&self) -> Option<Address> {
        self.inner.state.read().await.addresses.selected().cloned()
    }

    /// The address to deliver to: the selection, or the default absent one
    pub async fn delivery_address(&self) -> Option<Address> {
        self.inner.state.read().await.addresses.delivery_address().cloned()
    }

    // --- Orders ---

    /// Place an order
    ///
    /// The order starts at `Received` with a generated id, an assigned
    /// delivery partner, and a 45-minute estimate. Three stage transitions
    /// are scheduled at fixed offsets; any previously active order's
    /// pending transitions are cancelled.
    pub async fn place_order(&self, details: OrderDetails) -> Result<Order> {
        let id = self.inner.ids.order_id();
        let order = Order::place(id.clone(), details, Utc::now());

        let previous = {
            let mut state = self.inner.state.write().await;
            state.active_order.replace(order.clone())
        };
        if let Some(previous) = previous {
            self.inner.scheduler.cancel(&previous.id).await;
        }

        self.emit(StoreEvent::OrderPlaced(order.clone()));

        for (offset, status) in STAGE_SCHEDULE {
            let store = self.clone();
            let order_id = id.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(offset).await;
                store.apply_scheduled_stage(&order_id, status).await;
            });
            self.inner.scheduler.register(&id, handle).await;
        }

        self.persist(keys::ACTIVE_ORDER, &order).await?;
        Ok(order)
    }

    /// Advance the active order to the given stage
    ///
    /// The id must match the active order. Status never moves backward: a
    /// stage at or below the current one is a no-op.
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
        let updated = {
            let mut state = self.inner.state.write().await;
            let order = state
                .active_order
                .as_mut()
                .filter(|o| o.id == order_id)
                .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;
            if status > order.status {
                order.status = status;
                Some(order.clone())
            } else {
                None
            }
        };

        match updated {
            Some(order) => self.finish_stage_change(order).await,
            None => Ok(()),
        }
    }

    /// Stage transition fired by the scheduler
    ///
    /// A cancelled or superseded order is an expected race here, so a
    /// mismatched id skips quietly and persistence is best-effort: the
    /// in-memory stage still advances if the write fails.
    async fn apply_scheduled_stage(&self, order_id: &str, status: OrderStatus) {
        let updated = {
            let mut state = self.inner.state.write().await;
            match state.active_order.as_mut() {
                Some(order) if order.id == order_id => {
                    if status > order.status {
                        order.status = status;
                        Some(order.clone())
                    } else {
                        None
                    }
                }
                _ => {
                    tracing::debug!(order_id, "skipping stage transition for inactive order");
                    None
                }
            }
        };

        if let Some(order) = updated {
            self.emit(StoreEvent::OrderStatusChanged(order.clone()));
            // Persist before the terminal cleanup: cancelling the order's
            // tasks aborts this one too, so anything after the cancel may
            // never run once the adapter actually suspends.
            self.persist_best_effort(keys::ACTIVE_ORDER, &order).await;
            if order.status.is_terminal() {
                self.inner.scheduler.cancel(&order.id).await;
            }
        }
    }

    async fn finish_stage_change(&self, order: Order) -> Result<()> {
        self.emit(StoreEvent::OrderStatusChanged(order.clone()));
        if order.status.is_terminal() {
            self.inner.scheduler.cancel(&order.id).await;
        }
        self.persist(keys::ACTIVE_ORDER, &order).await
    }

    /// The active order, if any
    pub async fn active_order(&self) -> Option<Order> {
        self.inner.state.read().await.active_order.clone()
    }
}
