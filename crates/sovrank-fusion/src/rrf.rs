//! Reciprocal rank fusion over per-account search observations.
//!
//! Each item's fused score is `Σ 1/(k + rank)` over the accounts that
//! actually observed it. Accounts that never saw an item contribute no
//! term for it, so the formula rewards both broad coverage and good
//! positions without inventing a penalty for gaps in coverage.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use sovrank_core::{FusedRanking, SearchObservation};

/// Fuses per-account rank observations for one keyword into a single ranking.
///
/// Observations are grouped by `item_id`; the fused score accumulates one
/// reciprocal term per observing account. The result is sorted by score
/// descending and `final_rank` is the dense 1-based position in that order.
/// Ties keep the order in which items first appeared in `observations`.
///
/// Ranks are 1-based: an observation with `observed_rank == 0` is logged and
/// skipped, and an item whose only observations were invalid never appears in
/// the output. When the same account reports the same item twice, the first
/// report wins and later ones are logged and dropped.
#[must_use]
pub fn fuse(observations: &[SearchObservation], k: f64) -> Vec<FusedRanking> {
    let mut fused: Vec<FusedRanking> = Vec::new();
    let mut by_item: HashMap<String, usize> = HashMap::new();

    for obs in observations {
        if obs.observed_rank == 0 {
            tracing::warn!(
                account = %obs.source_account,
                item = %obs.item_id,
                "skipping observation with rank 0; ranks are 1-based"
            );
            continue;
        }

        let idx = match by_item.get(obs.item_id.as_str()) {
            Some(&idx) => idx,
            None => {
                fused.push(FusedRanking {
                    item_id: obs.item_id.clone(),
                    fusion_score: 0.0,
                    final_rank: 0,
                    per_account_rank: BTreeMap::new(),
                });
                by_item.insert(obs.item_id.clone(), fused.len() - 1);
                fused.len() - 1
            }
        };

        match fused[idx].per_account_rank.entry(obs.source_account.clone()) {
            Entry::Occupied(first) => {
                tracing::warn!(
                    account = %obs.source_account,
                    item = %obs.item_id,
                    kept_rank = *first.get(),
                    dropped_rank = obs.observed_rank,
                    "duplicate observation for account/item pair; keeping the first"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(obs.observed_rank);
                fused[idx].fusion_score += 1.0 / (k + f64::from(obs.observed_rank));
            }
        }
    }

    // Stable sort, so equal scores preserve first-encounter order.
    fused.sort_by(|a, b| b.fusion_score.total_cmp(&a.fusion_score));
    for (rank, ranking) in (1..).zip(fused.iter_mut()) {
        ranking.final_rank = rank;
    }

    tracing::debug!(
        observations = observations.len(),
        items = fused.len(),
        "fused rank observations"
    );
    fused
}

/// Distinct source accounts appearing in a batch of observations.
///
/// This is the universe an absent item is judged against when reading
/// `per_account_rank`: an account in this set but missing from an item's
/// map simply never observed that item.
#[must_use]
pub fn account_universe(observations: &[SearchObservation]) -> BTreeSet<String> {
    observations
        .iter()
        .map(|obs| obs.source_account.clone())
        .collect()
}
