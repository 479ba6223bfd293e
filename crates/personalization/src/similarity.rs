//! Precomputed item-to-item similarity table.

use crate::snapshot::{self, SimilarRow};
use recs_core::{ItemId, Lookup, RecsResult, SimilarItems};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read-only index from a source item to its similar items, in source order.
pub struct SimilarityStore {
    rows: HashMap<ItemId, SimilarItems>,
}

impl SimilarityStore {
    /// Load the similarity snapshot. Fails if any row is malformed.
    pub fn load(path: &Path) -> RecsResult<Self> {
        info!(path = %path.display(), "Loading similarity data");
        let rows: Vec<SimilarRow> = snapshot::read_table(path)?;
        let store = Self::from_rows(rows);
        if store.is_empty() {
            warn!(path = %path.display(), "Similarity table is empty, online recs will be empty");
        }
        info!(items = store.len(), "Loaded similarity data");
        Ok(store)
    }

    /// Group rows by source item. Row order within a group is preserved.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = SimilarRow>,
    {
        let mut index: HashMap<ItemId, SimilarItems> = HashMap::new();
        for row in rows {
            let entry = index.entry(row.item_id_1).or_default();
            entry.item_ids.push(row.item_id_2);
            entry.scores.push(row.score);
        }
        Self { rows: index }
    }

    pub fn lookup(&self, item_id: ItemId) -> Lookup<&SimilarItems> {
        Lookup::from_option(self.rows.get(&item_id))
    }

    /// First `k` similar items for `item_id`; empty when the item is unknown.
    pub fn get(&self, item_id: ItemId, k: usize) -> SimilarItems {
        match self.lookup(item_id) {
            Lookup::Found(row) => SimilarItems {
                item_ids: row.item_ids.iter().take(k).copied().collect(),
                scores: row.scores.iter().take(k).copied().collect(),
            },
            Lookup::NotFound => {
                debug!(item_id, "No similar items found");
                metrics::counter!("similarity.miss").increment(1);
                SimilarItems::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
