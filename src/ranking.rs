// Rule Classifier & Ranker - strength buckets and report ordering
// Lift thresholds (20 / 10) are empirical constants carried over from
// the reference dataset; they bucket rules for reporting and nothing
// else depends on them.

use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// STRENGTH CATEGORY
// ============================================================================

/// Reporting bucket derived from lift. Variant order is the report
/// order: strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrengthCategory {
    Strong,
    Moderate,
    Mild,
}

impl StrengthCategory {
    /// lift > 20 → Strong; 10 <= lift <= 20 → Moderate; else Mild.
    pub fn from_lift(lift: f64) -> Self {
        if lift > 20.0 {
            StrengthCategory::Strong
        } else if lift >= 10.0 {
            StrengthCategory::Moderate
        } else {
            StrengthCategory::Mild
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrengthCategory::Strong => "Strongly associated",
            StrengthCategory::Moderate => "Moderately associated",
            StrengthCategory::Mild => "Mildly associated",
        }
    }
}

impl fmt::Display for StrengthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// RANKED RULE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRule {
    #[serde(flatten)]
    pub rule: Rule,
    pub strength: StrengthCategory,
}

// ============================================================================
// RANKING
// ============================================================================

/// Classify and order rules for reporting: category first (Strong,
/// Moderate, Mild), lift descending within a category, then item names
/// so equal-lift rules land in a stable order run to run.
///
/// `dedup_by_lift` collapses the sorted list to one representative per
/// distinct lift value. Opt-in only: it can silently discard distinct
/// antecedent/consequent pairs that happen to share a lift score.
pub fn rank(rules: Vec<Rule>, dedup_by_lift: bool) -> Vec<RankedRule> {
    let mut ranked: Vec<RankedRule> = rules
        .into_iter()
        .map(|rule| RankedRule {
            strength: StrengthCategory::from_lift(rule.lift),
            rule,
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.strength
            .cmp(&b.strength)
            .then_with(|| b.rule.lift.partial_cmp(&a.rule.lift).unwrap_or(Ordering::Equal))
            .then_with(|| a.rule.antecedent.cmp(&b.rule.antecedent))
            .then_with(|| a.rule.consequent.cmp(&b.rule.consequent))
    });

    if dedup_by_lift {
        let mut seen: HashSet<u64> = HashSet::new();
        ranked.retain(|r| seen.insert(r.rule.lift.to_bits()));
    }

    ranked
}

// ============================================================================
// TESTS
// ============================================================================
