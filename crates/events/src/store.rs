//! In-process recent-activity log backed by DashMap.
//! Each user maps to a bounded, most-recent-first list of item ids.

use dashmap::DashMap;
use recs_core::{ItemId, UserId};
use std::collections::VecDeque;
use tracing::trace;

/// Bounded per-user event history.
///
/// `put` runs under the shard write lock of the user's entry, so concurrent
/// inserts for the same user are serialized and none are lost.
pub struct EventStore {
    events: DashMap<UserId, VecDeque<ItemId>>,
    max_history: usize,
}

impl EventStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            events: DashMap::new(),
            max_history,
        }
    }

    /// Record that `user_id` interacted with `item_id`. Oldest entries are
    /// dropped once the history exceeds `max_history`.
    pub fn put(&self, user_id: UserId, item_id: ItemId) {
        let mut history = self.events.entry(user_id).or_default();
        history.push_front(item_id);
        history.truncate(self.max_history);
        trace!(user_id, item_id, len = history.len(), "Event recorded");
        metrics::counter!("events.put").increment(1);
    }

    /// Up to `k` most recent items for `user_id`, newest first. Unknown users
    /// have an empty history.
    pub fn get(&self, user_id: UserId, k: usize) -> Vec<ItemId> {
        self.events
            .get(&user_id)
            .map(|history| history.iter().take(k).copied().collect())
            .unwrap_or_default()
    }

}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_put_get_most_recent_first() {
        let store = EventStore::new(10);
        for item in [3911, 1168, 109123, 8449] {
            store.put(54633, item);
        }
        assert_eq!(store.get(54633, 10), vec![8449, 109123, 1168, 3911]);
    }

    #[test]
    fn test_get_truncates_to_k() {
        let store = EventStore::new(10);
        for item in 1..=5 {
            store.put(1, item);
        }
        assert_eq!(store.get(1, 2), vec![5, 4]);
        assert_eq!(store.get(1, 0), Vec::<ItemId>::new());
    }

    #[test]
    fn test_unknown_user_is_empty() {
        let store = EventStore::new(10);
        assert!(store.get(42, 5).is_empty());
    }

    #[test]
    fn test_history_capped_at_max() {
        let store = EventStore::new(3);
        for item in 1..=7 {
            store.put(9, item);
        }
        assert_eq!(store.get(9, 3), vec![7, 6, 5]);
        assert_eq!(store.get(9, 100), vec![7, 6, 5]);
    }

    #[test]
    fn test_duplicates_kept() {
        let store = EventStore::new(10);
        store.put(1, 7);
        store.put(1, 7);
        assert_eq!(store.get(1, 10), vec![7, 7]);
    }

    #[test]
    fn test_users_are_isolated() {
        let store = EventStore::new(10);
        store.put(1, 100);
        store.put(2, 200);
        assert_eq!(store.get(1, 10), vec![100]);
        assert_eq!(store.get(2, 10), vec![200]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_are_not_lost() {
        let store = Arc::new(EventStore::new(1000));
        let mut handles = Vec::new();
        for worker in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    store.put(7, worker * 1000 + i);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.get(7, 1000).len(), 400);
    }
}
