// Rule Generator - directional association rules from frequent itemsets
// Every proper non-empty subset of a frequent itemset becomes an
// antecedent; the complement is the consequent. Both directions of a
// pair are distinct rules and are scored independently.

use crate::apriori::FrequentItemsets;
use crate::basket::BasketMatrix;
use crate::config::EngineConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// RULE
// ============================================================================

/// One scored association rule: "baskets containing the antecedent
/// tend to contain the consequent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Antecedent item names, in canonical (universe id) order
    pub antecedent: Vec<String>,

    /// Consequent item names, in canonical (universe id) order
    pub consequent: Vec<String>,

    /// Support of antecedent ∪ consequent
    pub support: f64,

    /// support(union) / support(antecedent)
    pub confidence: f64,

    /// confidence / support(consequent); > 1 means positive association
    pub lift: f64,
}

// ============================================================================
// GENERATION
// ============================================================================

/// Expand frequent itemsets into rules, keeping those whose lift meets
/// `config.min_lift_threshold`. Independent across itemsets, so the
/// expansion runs in parallel.
pub fn generate(
    frequent: &FrequentItemsets,
    matrix: &BasketMatrix,
    config: &EngineConfig,
) -> Vec<Rule> {
    let rules: Vec<Rule> = frequent
        .itemsets
        .par_iter()
        .filter(|itemset| itemset.items.len() >= 2)
        .flat_map_iter(|itemset| expand_itemset(itemset, frequent, matrix, config))
        .collect();

    tracing::debug!(rules = rules.len(), "rule generation complete");
    rules
}

/// Enumerate every proper non-empty antecedent of one itemset by
/// bitmask. Subset supports come from the frequent table; they are
/// always present there by anti-monotonicity.
fn expand_itemset(
    itemset: &crate::apriori::Itemset,
    frequent: &FrequentItemsets,
    matrix: &BasketMatrix,
    config: &EngineConfig,
) -> Vec<Rule> {
    let k = itemset.items.len();
    let union_count = itemset.support_count as f64;
    let total = frequent.total_baskets as f64;

    let mut rules = Vec::new();
    let full_mask: u32 = (1u32 << k) - 1;

    for mask in 1..full_mask {
        let antecedent: Vec<u32> = (0..k)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| itemset.items[i])
            .collect();
        let consequent: Vec<u32> = (0..k)
            .filter(|i| mask & (1 << i) == 0)
            .map(|i| itemset.items[i])
            .collect();

        let Some(antecedent_count) = frequent.count_of(&antecedent) else {
            continue;
        };
        let Some(consequent_count) = frequent.count_of(&consequent) else {
            continue;
        };

        let confidence = union_count / antecedent_count as f64;
        let consequent_support = consequent_count as f64 / total;
        let lift = confidence / consequent_support;

        if lift < config.min_lift_threshold {
            continue;
        }

        rules.push(Rule {
            antecedent: matrix.item_names_for(&antecedent),
            consequent: matrix.item_names_for(&consequent),
            support: itemset.support,
            confidence,
            lift,
        });
    }

    rules
}

// ============================================================================
// TESTS
// ============================================================================
