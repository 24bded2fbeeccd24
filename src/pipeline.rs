// Pipeline - one engine invocation over one finite transaction batch
// Stages hand each other immutable snapshots: normalize, build the
// matrix, mine, generate, rank, assemble the report. A mining run that
// finds nothing frequent still yields a report with the matrix-derived
// tables intact.

use crate::apriori;
use crate::basket::BasketMatrix;
use crate::config::EngineConfig;
use crate::csv_input::RawRow;
use crate::error::EngineError;
use crate::normalizer::{self, NormalizedBatch};
use crate::ranking;
use crate::report::{self, AnalysisReport, Diagnostics};
use crate::rules;
use std::time::Instant;

/// Run the full analysis over a batch of raw rows.
///
/// Fatal errors: `InvalidConfiguration` (checked at entry) and
/// `EmptyDataset` (nothing to mine). `NoFrequentItemsets` is not
/// fatal: the report comes back with an empty rule list and a reason.
pub fn run_analysis(rows: &[RawRow], config: &EngineConfig) -> Result<AnalysisReport, EngineError> {
    config.validate()?;
    let started = Instant::now();

    let batch = normalizer::normalize(rows);
    let matrix = BasketMatrix::build(&batch.records)?;

    tracing::info!(
        rows_in = batch.rows_in,
        rows_dropped = batch.rows_dropped(),
        baskets = matrix.n_baskets(),
        items = matrix.n_items(),
        "matrix ready"
    );

    let (ranked, no_rules_reason, frequent_per_level) =
        match apriori::mine(&matrix, config) {
            Ok(frequent) => {
                let per_level = frequent.per_level.clone();
                let generated = rules::generate(&frequent, &matrix, config);
                let ranked = ranking::rank(generated, config.dedup_by_lift);
                let reason = if ranked.is_empty() {
                    Some(format!(
                        "no rule reached min_lift_threshold {}",
                        config.min_lift_threshold
                    ))
                } else {
                    None
                };
                (ranked, reason, per_level)
            }
            Err(EngineError::NoFrequentItemsets { reason }) => {
                tracing::info!(%reason, "mining found nothing frequent");
                (Vec::new(), Some(reason), Vec::new())
            }
            Err(other) => return Err(other),
        };

    let report = AnalysisReport {
        item_frequency: report::item_frequency_table(&matrix),
        transactions_by_date: report::transactions_by_date(&matrix),
        revenue_by_product: report::revenue_by_product(&batch),
        diagnostics: diagnostics(&batch, &matrix, frequent_per_level),
        rules: ranked,
        no_rules_reason,
    };

    tracing::info!(
        rules = report.rules.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis complete"
    );

    Ok(report)
}

fn diagnostics(
    batch: &NormalizedBatch,
    matrix: &BasketMatrix,
    frequent_per_level: Vec<apriori::LevelCount>,
) -> Diagnostics {
    Diagnostics {
        rows_in: batch.rows_in,
        rows_dropped_missing_invoice: batch.dropped_missing_invoice,
        rows_dropped_credit: batch.dropped_credit,
        rows_malformed: batch.malformed.len(),
        total_baskets: matrix.n_baskets(),
        distinct_items: matrix.n_items(),
        frequent_per_level,
    }
}

// ============================================================================
// TESTS
// ============================================================================
