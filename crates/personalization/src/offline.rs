//! Offline recommendations: precomputed personal rankings with a global
//! popularity fallback, plus per-path request counters.

use crate::snapshot::{self, PersonalRow, PopularRow};
use recs_core::{ItemId, Lookup, RecsResult, RequestStats, UserId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

pub struct OfflineStore {
    personal: HashMap<UserId, Vec<ItemId>>,
    popular: Vec<ItemId>,
    personal_hits: AtomicU64,
    default_hits: AtomicU64,
}

impl OfflineStore {
    pub fn new(personal: HashMap<UserId, Vec<ItemId>>, popular: Vec<ItemId>) -> Self {
        Self {
            personal,
            popular,
            personal_hits: AtomicU64::new(0),
            default_hits: AtomicU64::new(0),
        }
    }

    /// Load both ranking snapshots. Fails if either file is missing or malformed.
    pub fn load(personal_path: &Path, popular_path: &Path) -> RecsResult<Self> {
        info!(path = %personal_path.display(), "Loading recommendations: personal");
        let personal: Vec<PersonalRow> = snapshot::read_table(personal_path)?;
        info!(path = %popular_path.display(), "Loading recommendations: default");
        let popular: Vec<PopularRow> = snapshot::read_table(popular_path)?;

        let store = Self::from_rows(personal, popular);
        info!(
            users = store.personal_users(),
            popular = store.popular_len(),
            "Recommendations loaded"
        );
        Ok(store)
    }

    /// Group personal rows by user, keeping rank order within each user.
    pub fn from_rows<P, Q>(personal: P, popular: Q) -> Self
    where
        P: IntoIterator<Item = PersonalRow>,
        Q: IntoIterator<Item = PopularRow>,
    {
        let mut by_user: HashMap<UserId, Vec<ItemId>> = HashMap::new();
        for row in personal {
            by_user.entry(row.user_id).or_default().push(row.item_id);
        }
        let popular = popular.into_iter().map(|r| r.item_id).collect();
        Self::new(by_user, popular)
    }

    pub fn lookup(&self, user_id: UserId) -> Lookup<&[ItemId]> {
        Lookup::from_option(self.personal.get(&user_id).map(Vec::as_slice))
    }

    /// First `k` personal items for a known user, otherwise the first `k`
    /// popular items. Exactly one counter is incremented per call.
    pub fn get(&self, user_id: UserId, k: usize) -> Vec<ItemId> {
        match self.lookup(user_id) {
            Lookup::Found(items) => {
                self.personal_hits.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("offline.personal_hits").increment(1);
                debug!(user_id, "Using personal history");
                items.iter().take(k).copied().collect()
            }
            Lookup::NotFound => {
                self.default_hits.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("offline.default_hits").increment(1);
                debug!(user_id, "Using default");
                self.popular.iter().take(k).copied().collect()
            }
        }
    }

    pub fn stats(&self) -> RequestStats {
        RequestStats {
            personal_hits: self.personal_hits.load(Ordering::Relaxed),
            default_hits: self.default_hits.load(Ordering::Relaxed),
        }
    }

    /// Emit the request counters, called once at shutdown.
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            personal_hits = stats.personal_hits,
            default_hits = stats.default_hits,
            total = stats.total(),
            "Stats for recommendations"
        );
    }

    pub fn personal_users(&self) -> usize {
        self.personal.len()
    }

    pub fn popular_len(&self) -> usize {
        self.popular.len()
    }
}
