use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// User identifier as it appears in the snapshot tables and request params.
pub type UserId = i64;

/// Item (track) identifier.
pub type ItemId = i64;

/// Result of a keyed lookup against an immutable table.
///
/// Stores branch on this explicitly instead of treating a missing key as a
/// failure; `NotFound` always resolves to a documented fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Similar items for one source item as two index-aligned sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SimilarItems {
    #[schema(value_type = Vec<i64>)]
    pub item_ids: Vec<ItemId>,
    pub scores: Vec<f64>,
}

impl SimilarItems {
    /// "No signal" result for an unknown source item.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(target, score)` pairs, keeping their order.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ItemId, f64)>,
    {
        let (item_ids, scores) = pairs.into_iter().unzip();
        Self { item_ids, scores }
    }

    /// Iterate `(target, score)` pairs in stored order.
    pub fn pairs(&self) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.item_ids
            .iter()
            .copied()
            .zip(self.scores.iter().copied())
    }
}

/// Snapshot of the offline store request counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestStats {
    pub personal_hits: u64,
    pub default_hits: u64,
}

impl RequestStats {
    pub fn total(&self) -> u64 {
        self.personal_hits + self.default_hits
    }
}

/// The three upstream stores a composed request depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Events,
    Similarity,
    Offline,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Events => "events",
            StoreKind::Similarity => "similarity",
            StoreKind::Offline => "offline",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which recommendation list a request asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Offline,
    Online,
    Blended,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Offline => "offline",
            RecommendationKind::Online => "online",
            RecommendationKind::Blended => "blended",
        }
    }
}

/// Reachability of a single store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentHealth {
    Healthy,
    Unreachable,
}

/// Aggregate status across all stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverallHealth {
    Healthy,
    Degraded,
}

/// A single store probe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProbeResult {
    pub store: StoreKind,
    pub status: ComponentHealth,
    pub latency_us: u64,
    pub message: Option<String>,
}

/// Aggregated reachability report for the composer's upstream stores.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: OverallHealth,
    pub components: Vec<ProbeResult>,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    /// Degraded as soon as any probe is unreachable.
    pub fn from_probes(components: Vec<ProbeResult>) -> Self {
        let status = if components
            .iter()
            .all(|p| p.status == ComponentHealth::Healthy)
        {
            OverallHealth::Healthy
        } else {
            OverallHealth::Degraded
        };
        Self {
            status,
            components,
            checked_at: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == OverallHealth::Healthy
    }
}
