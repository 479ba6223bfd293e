//! Pure list operations used by the composer. None of these suspend.

use recs_core::ItemId;
use std::collections::HashSet;

/// Remove later duplicates, keeping each id at its first position.
pub fn dedup_ids(ids: Vec<ItemId>) -> Vec<ItemId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Order candidates by descending score. The sort is stable, so equal
/// scores keep the order in which candidates were collected.
pub fn rank_candidates(mut candidates: Vec<(ItemId, f64)>) -> Vec<ItemId> {
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.into_iter().map(|(id, _)| id).collect()
}

/// Alternate `online[i]`, `offline[i]` for every index both lists share.
/// Entries past the shorter list's length are not emitted.
pub fn interleave(online: &[ItemId], offline: &[ItemId]) -> Vec<ItemId> {
    online
        .iter()
        .zip(offline)
        .flat_map(|(on, off)| [*on, *off])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_first_occurrence_wins() {
        assert_eq!(dedup_ids(vec![3, 1, 3, 2, 1, 4]), vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_dedup_idempotent() {
        let once = dedup_ids(vec![5, 5, 6, 7, 6, 5, 8]);
        assert_eq!(dedup_ids(once.clone()), once);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_ids(Vec::new()).is_empty());
    }

    #[test]
    fn test_rank_descending_score() {
        let ranked = rank_candidates(vec![(1, 0.2), (2, 0.9), (3, 0.5)]);
        assert_eq!(ranked, vec![2, 3, 1]);
    }

    #[test]
    fn test_rank_ties_keep_collection_order() {
        let ranked = rank_candidates(vec![(7, 0.5), (3, 0.9), (9, 0.5), (1, 0.5)]);
        assert_eq!(ranked, vec![3, 7, 9, 1]);
    }

    #[test]
    fn test_interleave_alternates() {
        assert_eq!(interleave(&[1, 2], &[10, 20]), vec![1, 10, 2, 20]);
    }

    #[test]
    fn test_interleave_drops_longer_tail() {
        assert_eq!(interleave(&[1, 2, 3, 4], &[10]), vec![1, 10]);
        assert_eq!(interleave(&[1], &[10, 20, 30]), vec![1, 10]);
        assert!(interleave(&[1, 2], &[]).is_empty());
    }
}
