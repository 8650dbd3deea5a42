//! Monotonic time-based identifiers
//!
//! Ids are derived from the wall clock in milliseconds but kept strictly
//! increasing even when several are requested within the same millisecond.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Generator for strictly increasing ids
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    /// Create a new generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Next raw id value
    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        loop {
            let last = self.last.load(Ordering::SeqCst);
            let next = now.max(last + 1);
            if self
                .last
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return next;
            }
        }
    }

    /// Next user id
    pub fn user_id(&self) -> String {
        format!("USR-{}", self.next())
    }

    /// Next address id
    pub fn address_id(&self) -> String {
        self.next().to_string()
    }

    /// Next order id
    pub fn order_id(&self) -> String {
        format!("ORD-{}", self.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let ids = IdGenerator::new();
        let mut previous = ids.next();
        for _ in 0..1000 {
            let next = ids.next();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_ids_are_unique_across_threads() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let ids = Arc::new(IdGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let ids = Arc::clone(&ids);
            handles.push(std::thread::spawn(move || {
                (0..250).map(|_| ids.next()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_prefixed_forms() {
        let ids = IdGenerator::new();
        assert!(ids.user_id().starts_with("USR-"));
        assert!(ids.order_id().starts_with("ORD-"));
        assert!(ids.address_id().parse::<i64>().is_ok());
    }
}
