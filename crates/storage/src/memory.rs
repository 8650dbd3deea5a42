//! In-memory snapshot store
//!
//! A [`StorageAdapter`] backed by a map, used in tests and as a stand-in
//! when no durable backend is available. Supports write-failure injection
//! so callers can exercise their persistence error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::adapter::{Result, StorageAdapter, StorageError};

/// Map-backed snapshot store
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (for testing error reporting)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.check_writable()?;
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.check_writable()?;
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();

        store.set("user", "alice".to_string()).await.unwrap();
        assert_eq!(store.get("user").await.unwrap(), Some("alice".to_string()));
        assert_eq!(store.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_many_clears_only_named_keys() {
        let store = MemoryStore::new();

        store.set("a", "1".to_string()).await.unwrap();
        store.set("b", "2".to_string()).await.unwrap();
        store.set("c", "3".to_string()).await.unwrap();

        store.remove_many(&["a", "c"]).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("b").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let store = MemoryStore::new();

        store.set("key", "before".to_string()).await.unwrap();
        store.fail_writes(true);

        let err = store.set("key", "after".to_string()).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));

        // Reads still work and the old value is untouched
        assert_eq!(store.get("key").await.unwrap(), Some("before".to_string()));

        store.fail_writes(false);
        store.set("key", "after".to_string()).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some("after".to_string()));
    }
}
