//! Auth provider bridge
//!
//! [`AuthProvider`] abstracts the external identity service. Providers
//! push identity changes over a broadcast channel, and
//! [`spawn_auth_listener`] forwards those changes into the store, where
//! they override any locally cached session.
//!
//! [`MockAuthProvider`] is an in-process implementation used by tests
//! and for offline development builds.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use app_state::{AppStore, User};

/// Capacity of the provider's identity change channel
const AUTH_CHANNEL_CAPACITY: usize = 16;

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The presented credentials do not match any account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An account with this phone number already exists
    #[error("Account already exists for {0}")]
    AccountExists(String),

    /// The provider could not be reached
    #[error("Auth provider unavailable: {0}")]
    Unavailable(String),
}

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// An identity held by the external provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAccount {
    /// Provider-assigned id
    pub uid: String,
    /// Registered display name
    pub display_name: String,
    /// Registered phone number
    pub phone: String,
    /// Registered email
    pub email: String,
}

impl AuthAccount {
    /// The store-side user record for this account
    pub fn to_user(&self) -> User {
        User {
            id: self.uid.clone(),
            display_name: self.display_name.clone(),
            phone: Some(self.phone.clone()),
            email: Some(self.email.clone()),
            is_guest: false,
        }
    }
}

/// An identity change pushed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStateChange {
    /// A session was established
    SignedIn(AuthAccount),
    /// The session ended
    SignedOut,
}

/// External identity service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with a phone number and email
    async fn sign_in(&self, phone: &str, email: &str) -> Result<AuthAccount>;

    /// Register a new account
    async fn register(&self, display_name: &str, phone: &str, email: &str) -> Result<AuthAccount>;

    /// End the current session
    async fn sign_out(&self) -> Result<()>;

    /// Subscribe to pushed identity changes
    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange>;
}

/// In-process auth provider backed by a map of registered accounts
pub struct MockAuthProvider {
    accounts: RwLock<HashMap<String, AuthAccount>>,
    changes: broadcast::Sender<AuthStateChange>,
    next_uid: std::sync::atomic::AtomicU64,
}

impl MockAuthProvider {
    /// Create a provider with no registered accounts
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(AUTH_CHANNEL_CAPACITY);
        Self {
            accounts: RwLock::new(HashMap::new()),
            changes,
            next_uid: std::sync::atomic::AtomicU64::new(1),
        }
    }

    fn push(&self, change: AuthStateChange) {
        let _ = self.changes.send(change);
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_in(&self, phone: &str, email: &str) -> Result<AuthAccount> {
        if phone.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let account = {
            let accounts = self.accounts.read().await;
            accounts.get(phone).cloned()
        };
        let account = match account {
            Some(account) if account.email == email => account,
            Some(_) => return Err(AuthError::InvalidCredentials),
            None => return Err(AuthError::InvalidCredentials),
        };
        self.push(AuthStateChange::SignedIn(account.clone()));
        Ok(account)
    }

    async fn register(&self, display_name: &str, phone: &str, email: &str) -> Result<AuthAccount> {
        if phone.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(phone) {
            return Err(AuthError::AccountExists(phone.to_string()));
        }
        let uid = self
            .next_uid
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let account = AuthAccount {
            uid: format!("AUTH-{uid}"),
            display_name: display_name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        };
        accounts.insert(phone.to_string(), account.clone());
        drop(accounts);
        self.push(AuthStateChange::SignedIn(account.clone()));
        Ok(account)
    }

    async fn sign_out(&self) -> Result<()> {
        self.push(AuthStateChange::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.changes.subscribe()
    }
}

/// Forward provider identity changes into the store
///
/// Runs until the provider's channel closes. Store failures are logged;
/// a lagged receiver resubscribes to the latest state rather than
/// replaying missed changes.
pub fn spawn_auth_listener(store: AppStore, provider: Arc<dyn AuthProvider>) -> JoinHandle<()> {
    let mut changes = provider.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(AuthStateChange::SignedIn(account)) => {
                    if let Err(error) = store.adopt_session(account.to_user()).await {
                        tracing::warn!(%error, "failed to adopt provider session");
                    }
                }
                Ok(AuthStateChange::SignedOut) => {
                    if let Err(error) = store.logout().await {
                        tracing::warn!(%error, "failed to clear session on provider sign-out");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth listener lagged, resubscribing");
                    changes = changes.resubscribe();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
