//! Turns the three stores into offline, online, and blended recommendation
//! lists.
//!
//! Every store call is bounded by the configured upstream timeout. A store
//! error or timeout fails the whole composed request as
//! `UpstreamUnreachable`; no partial result is synthesized.

use crate::blend::{dedup_ids, interleave, rank_candidates};
use crate::sources::{EventSource, OfflineSource, SimilaritySource};
use recs_core::types::{ComponentHealth, HealthReport, ProbeResult, RecommendationKind, StoreKind};
use recs_core::{ItemId, RecsError, RecsResult, RequestStats, SimilarItems, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct Composer {
    events: Arc<dyn EventSource>,
    similarity: Arc<dyn SimilaritySource>,
    offline: Arc<dyn OfflineSource>,
    upstream_timeout: Duration,
    default_num_events: usize,
}

impl Composer {
    pub fn new(
        events: Arc<dyn EventSource>,
        similarity: Arc<dyn SimilaritySource>,
        offline: Arc<dyn OfflineSource>,
        upstream_timeout: Duration,
        default_num_events: usize,
    ) -> Self {
        Self {
            events,
            similarity,
            offline,
            upstream_timeout,
            default_num_events,
        }
    }

    /// Offline list: personal ranking or popularity fallback.
    pub async fn offline(&self, user_id: UserId, k: usize) -> RecsResult<Vec<ItemId>> {
        self.timed(RecommendationKind::Offline, self.offline_inner(user_id, k))
            .await
    }

    /// Online list built from the user's `num_events` most recent events.
    pub async fn online(
        &self,
        user_id: UserId,
        k: usize,
        num_events: usize,
    ) -> RecsResult<Vec<ItemId>> {
        self.timed(
            RecommendationKind::Online,
            self.online_inner(user_id, k, num_events),
        )
        .await
    }

    /// Online and offline lists interleaved, deduplicated, and cut to `k`.
    /// Falls back to the offline list when there is no online signal.
    pub async fn blended(&self, user_id: UserId, k: usize) -> RecsResult<Vec<ItemId>> {
        self.timed(RecommendationKind::Blended, async {
            let online = self
                .online_inner(user_id, k, self.default_num_events)
                .await?;
            let offline = self.offline_inner(user_id, k).await?;

            if online.is_empty() {
                debug!(user_id, "No online history, serving offline recommendations");
                return Ok(offline);
            }

            let mut recs = dedup_ids(interleave(&online, &offline));
            recs.truncate(k);
            Ok(recs)
        })
        .await
    }

    pub async fn record_event(&self, user_id: UserId, item_id: ItemId) -> RecsResult<()> {
        self.call(StoreKind::Events, self.events.put(user_id, item_id))
            .await
    }

    pub async fn recent_events(&self, user_id: UserId, k: usize) -> RecsResult<Vec<ItemId>> {
        self.call(StoreKind::Events, self.events.recent(user_id, k))
            .await
    }

    pub async fn similar_items(&self, item_id: ItemId, k: usize) -> RecsResult<SimilarItems> {
        self.call(StoreKind::Similarity, self.similarity.similar_items(item_id, k))
            .await
    }

    pub async fn offline_stats(&self) -> RecsResult<RequestStats> {
        self.call(StoreKind::Offline, self.offline.stats()).await
    }

    /// Probe all three stores. Never fails; unreachable stores are reported.
    pub async fn health(&self) -> HealthReport {
        let probes = vec![
            self.probe(StoreKind::Events, self.events.ping()).await,
            self.probe(StoreKind::Similarity, self.similarity.ping()).await,
            self.probe(StoreKind::Offline, self.offline.ping()).await,
        ];
        let report = HealthReport::from_probes(probes);
        if !report.is_healthy() {
            warn!(status = ?report.status, "Upstream stores degraded");
        }
        report
    }

    async fn offline_inner(&self, user_id: UserId, k: usize) -> RecsResult<Vec<ItemId>> {
        self.call(StoreKind::Offline, self.offline.recommendations(user_id, k))
            .await
    }

    async fn online_inner(
        &self,
        user_id: UserId,
        k: usize,
        num_events: usize,
    ) -> RecsResult<Vec<ItemId>> {
        let events = self
            .call(StoreKind::Events, self.events.recent(user_id, num_events))
            .await?;
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<(ItemId, f64)> = Vec::new();
        for item_id in &events {
            let similar = self
                .call(StoreKind::Similarity, self.similarity.similar_items(*item_id, k))
                .await?;
            candidates.extend(similar.pairs());
        }

        debug!(
            user_id,
            events = events.len(),
            candidates = candidates.len(),
            "Ranking online candidates"
        );

        let mut recs = dedup_ids(rank_candidates(candidates));
        recs.truncate(k);
        Ok(recs)
    }

    /// Bound a store call by the upstream timeout and tag failures with the store.
    async fn call<T, F>(&self, store: StoreKind, fut: F) -> RecsResult<T>
    where
        F: Future<Output = RecsResult<T>>,
    {
        let err = match tokio::time::timeout(self.upstream_timeout, fut).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(RecsError::UpstreamUnreachable { reason, .. })) => {
                RecsError::unreachable(store, reason)
            }
            Ok(Err(other)) => RecsError::unreachable(store, other.to_string()),
            Err(_) => RecsError::unreachable(
                store,
                format!("timed out after {}ms", self.upstream_timeout.as_millis()),
            ),
        };
        warn!(store = %store, error = %err, "Upstream store call failed");
        metrics::counter!("composer.upstream_errors", "store" => store.as_str()).increment(1);
        Err(err)
    }

    async fn timed<T, F>(&self, kind: RecommendationKind, fut: F) -> RecsResult<T>
    where
        F: Future<Output = RecsResult<T>>,
    {
        let start = Instant::now();
        metrics::counter!("composer.requests", "kind" => kind.as_str()).increment(1);
        let result = fut.await;
        metrics::histogram!("composer.latency_us", "kind" => kind.as_str())
            .record(start.elapsed().as_micros() as f64);
        result
    }

    async fn probe<F>(&self, store: StoreKind, fut: F) -> ProbeResult
    where
        F: Future<Output = RecsResult<()>>,
    {
        let start = Instant::now();
        let outcome = self.call(store, fut).await;
        let latency_us = start.elapsed().as_micros() as u64;
        match outcome {
            Ok(()) => ProbeResult {
                store,
                status: ComponentHealth::Healthy,
                latency_us,
                message: None,
            },
            Err(e) => ProbeResult {
                store,
                status: ComponentHealth::Unreachable,
                latency_us,
                message: Some(e.to_string()),
            },
        }
    }
}
