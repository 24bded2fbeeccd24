// Frequent Itemset Miner - level-wise Apriori search
// Candidates at level k come from joining frequent (k-1)-itemsets that
// share a (k-2)-prefix, then pruning any candidate with an infrequent
// (k-1)-subset (anti-monotonicity). Support counting per level is
// data-parallel: each candidate is an independent scan of the matrix.

use crate::basket::BasketMatrix;
use crate::config::EngineConfig;
use crate::error::EngineError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// ITEMSET
// ============================================================================

/// A frequent itemset. `items` is the canonical key: sorted item ids,
/// so equality and lookup are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itemset {
    pub items: Vec<u32>,
    pub support_count: u32,
    pub support: f64,
}

/// Candidate/frequent counts for one Apriori level, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCount {
    pub level: usize,
    pub candidates: usize,
    pub frequent: usize,
}

/// Everything mining produced: the frequent itemsets across all
/// levels, a count index keyed by canonical item-id vectors (for rule
/// generation lookups), and per-level diagnostics.
#[derive(Debug, Clone)]
pub struct FrequentItemsets {
    pub itemsets: Vec<Itemset>,
    pub support_index: HashMap<Vec<u32>, u32>,
    pub per_level: Vec<LevelCount>,
    pub total_baskets: usize,
}

impl FrequentItemsets {
    /// Support fraction for a frequent itemset, by canonical key.
    pub fn support_of(&self, items: &[u32]) -> Option<f64> {
        self.support_index
            .get(items)
            .map(|&count| count as f64 / self.total_baskets as f64)
    }

    /// Support count for a frequent itemset, by canonical key.
    pub fn count_of(&self, items: &[u32]) -> Option<u32> {
        self.support_index.get(items).copied()
    }
}

// ============================================================================
// MINER
// ============================================================================

/// Mine every itemset whose support meets `config.min_support`.
///
/// The frequent table of level k-1 is fully built before level k
/// starts; that barrier is what makes the subset prune sound.
pub fn mine(
    matrix: &BasketMatrix,
    config: &EngineConfig,
) -> Result<FrequentItemsets, EngineError> {
    let n_baskets = matrix.n_baskets();
    let min_support = config.min_support;

    let mut all_itemsets: Vec<Itemset> = Vec::new();
    let mut support_index: HashMap<Vec<u32>, u32> = HashMap::new();
    let mut per_level: Vec<LevelCount> = Vec::new();

    // Level 1: every item is a candidate
    let singles: Vec<Vec<u32>> = (0..matrix.n_items() as u32).map(|id| vec![id]).collect();
    let mut frequent = count_and_filter(matrix, singles, min_support, 1, &mut per_level);

    if frequent.is_empty() {
        return Err(EngineError::NoFrequentItemsets {
            reason: format!(
                "no single item reaches min_support {} over {} baskets \
                 (threshold too high or dataset too sparse)",
                min_support, n_baskets
            ),
        });
    }

    let mut level = 1;
    while !frequent.is_empty() {
        for itemset in &frequent {
            support_index.insert(itemset.items.clone(), itemset.support_count);
        }

        let keys: Vec<Vec<u32>> = frequent.iter().map(|s| s.items.clone()).collect();
        all_itemsets.extend(frequent);

        level += 1;
        let candidates = generate_candidates(&keys);
        if candidates.is_empty() {
            break;
        }

        frequent = count_and_filter(matrix, candidates, min_support, level, &mut per_level);
    }

    Ok(FrequentItemsets {
        itemsets: all_itemsets,
        support_index,
        per_level,
        total_baskets: n_baskets,
    })
}

/// Count support for each candidate in parallel and keep those meeting
/// the threshold. Workers return independent counts; the reduction is
/// just the ordered collect.
fn count_and_filter(
    matrix: &BasketMatrix,
    candidates: Vec<Vec<u32>>,
    min_support: f64,
    level: usize,
    per_level: &mut Vec<LevelCount>,
) -> Vec<Itemset> {
    let n_baskets = matrix.n_baskets() as f64;
    let n_candidates = candidates.len();

    let frequent: Vec<Itemset> = candidates
        .into_par_iter()
        .filter_map(|items| {
            let support_count = matrix.support_count(&items);
            let support = support_count as f64 / n_baskets;
            (support >= min_support).then_some(Itemset {
                items,
                support_count,
                support,
            })
        })
        .collect();

    tracing::debug!(
        level,
        candidates = n_candidates,
        frequent = frequent.len(),
        "apriori level complete"
    );

    if n_candidates > 0 {
        per_level.push(LevelCount {
            level,
            candidates: n_candidates,
            frequent: frequent.len(),
        });
    }

    frequent
}

/// Join frequent (k-1)-itemsets sharing a (k-2)-prefix into k-item
/// candidates, then prune any candidate with an infrequent
/// (k-1)-subset.
fn generate_candidates(frequent: &[Vec<u32>]) -> Vec<Vec<u32>> {
    let mut sorted: Vec<&Vec<u32>> = frequent.iter().collect();
    sorted.sort_unstable();

    let frequent_set: HashSet<&[u32]> = frequent.iter().map(Vec::as_slice).collect();
    let prefix_len = match sorted.first() {
        Some(first) => first.len() - 1,
        None => return Vec::new(),
    };

    let mut candidates = Vec::new();
    for i in 0..sorted.len() {
        for j in (i + 1)..sorted.len() {
            // Lexicographic order means a shared prefix is contiguous;
            // stop as soon as it diverges
            if sorted[i][..prefix_len] != sorted[j][..prefix_len] {
                break;
            }

            let mut candidate = sorted[i].clone();
            candidate.push(sorted[j][prefix_len]);

            if has_all_frequent_subsets(&candidate, &frequent_set) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

/// Anti-monotonicity prune: every (k-1)-subset of a viable candidate
/// must itself be frequent.
fn has_all_frequent_subsets(candidate: &[u32], frequent_set: &HashSet<&[u32]>) -> bool {
    let mut subset = Vec::with_capacity(candidate.len() - 1);
    for skip in 0..candidate.len() {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, &id)| id),
        );
        if !frequent_set.contains(subset.as_slice()) {
            return false;
        }
    }
    true
}

// ============================================================================
// TESTS
// ============================================================================
