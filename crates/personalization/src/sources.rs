//! Async seams between the composer and the stores it reads from.
//!
//! The in-process stores implement these directly and never fail; a remote
//! implementation reports transport problems as `UpstreamUnreachable`.

use crate::offline::OfflineStore;
use crate::similarity::SimilarityStore;
use async_trait::async_trait;
use recs_core::{ItemId, RecsResult, RequestStats, SimilarItems, UserId};
use recs_events::EventStore;

#[async_trait]
pub trait EventSource: Send + Sync {
    async fn put(&self, user_id: UserId, item_id: ItemId) -> RecsResult<()>;
    async fn recent(&self, user_id: UserId, k: usize) -> RecsResult<Vec<ItemId>>;
    async fn ping(&self) -> RecsResult<()>;
}

#[async_trait]
pub trait SimilaritySource: Send + Sync {
    async fn similar_items(&self, item_id: ItemId, k: usize) -> RecsResult<SimilarItems>;
    async fn ping(&self) -> RecsResult<()>;
}

#[async_trait]
pub trait OfflineSource: Send + Sync {
    async fn recommendations(&self, user_id: UserId, k: usize) -> RecsResult<Vec<ItemId>>;
    async fn stats(&self) -> RecsResult<RequestStats>;
    async fn ping(&self) -> RecsResult<()>;
}

#[async_trait]
impl EventSource for EventStore {
    async fn put(&self, user_id: UserId, item_id: ItemId) -> RecsResult<()> {
        EventStore::put(self, user_id, item_id);
        Ok(())
    }

    async fn recent(&self, user_id: UserId, k: usize) -> RecsResult<Vec<ItemId>> {
        Ok(self.get(user_id, k))
    }

    async fn ping(&self) -> RecsResult<()> {
        Ok(())
    }
}

#[async_trait]
impl SimilaritySource for SimilarityStore {
    async fn similar_items(&self, item_id: ItemId, k: usize) -> RecsResult<SimilarItems> {
        Ok(self.get(item_id, k))
    }

    async fn ping(&self) -> RecsResult<()> {
        Ok(())
    }
}

#[async_trait]
impl OfflineSource for OfflineStore {
    async fn recommendations(&self, user_id: UserId, k: usize) -> RecsResult<Vec<ItemId>> {
        Ok(self.get(user_id, k))
    }

    async fn stats(&self) -> RecsResult<RequestStats> {
        Ok(OfflineStore::stats(self))
    }

    async fn ping(&self) -> RecsResult<()> {
        Ok(())
    }
}
