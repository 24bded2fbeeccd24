// Engine configuration
// Thresholds are empirical defaults carried over from the reference
// dataset, not hard invariants; callers can tune them per batch.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum support fraction an itemset must reach to count as
    /// frequent (default: 0.002)
    pub min_support: f64,

    /// Minimum lift a rule must reach to be kept; lift below 1
    /// indicates negative or no association (default: 1.0)
    pub min_lift_threshold: f64,

    /// Collapse the ranked rule list to one representative per
    /// distinct lift value. Reporting convenience only — it can hide
    /// distinct antecedent/consequent pairs, so it is never the
    /// default (default: false)
    pub dedup_by_lift: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            min_support: 0.002,
            min_lift_threshold: 1.0,
            dedup_by_lift: false,
        }
    }
}

impl EngineConfig {
    /// Check bounds once at pipeline entry.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.min_support.is_finite() || self.min_support <= 0.0 || self.min_support > 1.0 {
            return Err(EngineError::invalid_config(format!(
                "min_support must be in (0, 1], got {}",
                self.min_support
            )));
        }

        if !self.min_lift_threshold.is_finite() || self.min_lift_threshold < 0.0 {
            return Err(EngineError::invalid_config(format!(
                "min_lift_threshold must be a finite non-negative number, got {}",
                self.min_lift_threshold
            )));
        }

        Ok(())
    }
}
