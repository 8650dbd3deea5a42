//! Application state management for Tiffin
//!
//! This crate owns all client-side state: the signed-in user, subscription
//! plan and meal preference, the address book, and the active order with
//! its simulated delivery progression. Every mutation goes through
//! [`store::AppStore`], which applies the change in memory first and then
//! persists a snapshot through the storage adapter.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod events;
pub mod ids;
pub mod order;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod subscription;

pub use address::{Address, AddressBook, AddressError, AddressKind, AddressPatch, NewAddress};
pub use events::StoreEvent;
pub use order::{Order, OrderDetails, OrderStatus};
pub use session::User;
pub use store::{AppStore, StoreError};
pub use subscription::{MealPreference, MealTime, MealType, SubscriptionPlan, SubscriptionStatus};
