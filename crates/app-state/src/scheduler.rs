//! Cancellable stage scheduling
//!
//! Pending stage transitions are tracked per order id so that signing out
//! or superseding an order invalidates them instead of relying on the
//! id-match guard alone.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Registry of pending stage-transition tasks, keyed by order id
#[derive(Debug, Default)]
pub struct StageScheduler {
    tasks: Mutex<HashMap<String, Vec<JoinHandle<()>>>>,
}

impl StageScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a spawned transition task for the given order
    pub async fn register(&self, order_id: &str, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().await;
        tasks.entry(order_id.to_string()).or_default().push(handle);
    }

    /// Abort every pending transition for the given order
    ///
    /// Returns the number of tasks that were still tracked.
    pub async fn cancel(&self, order_id: &str) -> usize {
        let mut tasks = self.tasks.lock().await;
        match tasks.remove(order_id) {
            Some(handles) => {
                let count = handles.len();
                for handle in handles {
                    handle.abort();
                }
                count
            }
            None => 0,
        }
    }

    /// Abort every pending transition for every order
    pub async fn cancel_all(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        let mut count = 0;
        for (_, handles) in tasks.drain() {
            count += handles.len();
            for handle in handles {
                handle.abort();
            }
        }
        count
    }

    /// Number of orders with tracked transitions
    pub async fn tracked_orders(&self) -> usize {
        self.tasks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_pending_tasks() {
        let scheduler = StageScheduler::new();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            flag.store(true, Ordering::SeqCst);
        });
        scheduler.register("ORD-1", handle).await;

        assert_eq!(scheduler.cancel("ORD-1").await, 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_scoped_to_one_order() {
        let scheduler = StageScheduler::new();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        let keep = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            flag.store(true, Ordering::SeqCst);
        });
        let drop_me = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
        });

        scheduler.register("ORD-keep", keep).await;
        scheduler.register("ORD-drop", drop_me).await;

        // Let the spawned tasks register their timers before moving the clock
        tokio::task::yield_now().await;

        scheduler.cancel("ORD-drop").await;
        assert_eq!(scheduler.tracked_orders().await, 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_all_empties_registry() {
        let scheduler = StageScheduler::new();

        for i in 0..3 {
            let handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
            });
            scheduler.register(&format!("ORD-{i}"), handle).await;
        }

        assert_eq!(scheduler.cancel_all().await, 3);
        assert_eq!(scheduler.tracked_orders().await, 0);
        assert_eq!(scheduler.cancel("ORD-0").await, 0);
    }
}
