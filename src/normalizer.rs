// Transaction Normalizer - raw rows to canonical transaction records
// Pure transform: bad rows are counted and skipped, never fatal to the
// batch. Credit/reversal invoices (marker "C") represent returns and
// are filtered out entirely.

use crate::csv_input::RawRow;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

// ============================================================================
// CLEANED RECORD
// ============================================================================

/// One cleaned transaction row: a single item line within an invoice.
/// Duplicate (invoice, item) pairs are summed later by the matrix
/// builder, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Canonical invoice identifier (trimmed, string-coerced)
    pub invoice_id: String,

    /// Item name, trimmed of surrounding whitespace
    pub item: String,

    /// Net quantity for this row; may be negative (partial return
    /// inside a regular invoice)
    pub quantity: f64,

    /// Invoice date as supplied by the feed, untouched
    pub date: Option<String>,

    /// Unit rate, reporting only; None when absent or non-numeric
    pub unit_rate: Option<f64>,
}

// ============================================================================
// BATCH RESULT
// ============================================================================

/// A row the normalizer had to skip, with its 1-based data-row number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalformedRow {
    pub line: usize,
    pub reason: String,
}

impl MalformedRow {
    /// View as the engine's error type (per-row, recoverable).
    pub fn to_error(&self) -> EngineError {
        EngineError::MalformedRow {
            line: self.line,
            reason: self.reason.clone(),
        }
    }
}

/// Output of one normalization pass: the cleaned records plus an
/// accounting of everything that was dropped or skipped.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<TransactionRecord>,

    /// Total raw rows seen
    pub rows_in: usize,

    /// Rows dropped for a missing/empty invoice identifier
    pub dropped_missing_invoice: usize,

    /// Rows dropped because the invoice carried the credit marker "C"
    pub dropped_credit: usize,

    /// Rows skipped as malformed (missing item, missing or
    /// non-numeric quantity)
    pub malformed: Vec<MalformedRow>,
}

impl NormalizedBatch {
    /// Total rows that did not make it into `records`.
    pub fn rows_dropped(&self) -> usize {
        self.dropped_missing_invoice + self.dropped_credit + self.malformed.len()
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Invoice ids containing this marker are credit/reversal documents,
/// not purchases.
const CREDIT_MARKER: char = 'C';

/// Clean a batch of raw rows into transaction records.
///
/// Ordering of checks mirrors the ingestion contract: invoice id
/// first (missing → dropped, credit marker → dropped), then item name,
/// then quantity. Only quantity/item problems count as malformed.
pub fn normalize(rows: &[RawRow]) -> NormalizedBatch {
    let mut batch = NormalizedBatch {
        rows_in: rows.len(),
        ..Default::default()
    };

    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 1;

        // Invoice id: required, coerced to a trimmed string
        let invoice_id = match row.invoice_no.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                batch.dropped_missing_invoice += 1;
                continue;
            }
        };

        if invoice_id.contains(CREDIT_MARKER) {
            batch.dropped_credit += 1;
            continue;
        }

        // Item name: required, trimmed
        let item = match row.product_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                batch.malformed.push(MalformedRow {
                    line,
                    reason: "missing product name".to_string(),
                });
                continue;
            }
        };

        // Quantity: required, numeric
        let quantity = match row.qty.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match raw.parse::<f64>() {
                Ok(q) => q,
                Err(_) => {
                    batch.malformed.push(MalformedRow {
                        line,
                        reason: format!("non-numeric quantity {:?}", raw),
                    });
                    continue;
                }
            },
            _ => {
                batch.malformed.push(MalformedRow {
                    line,
                    reason: "missing quantity".to_string(),
                });
                continue;
            }
        };

        // Rate is optional and only feeds reporting; a bad value is
        // not worth skipping the row over
        let unit_rate = row
            .rate
            .as_deref()
            .map(str::trim)
            .and_then(|r| r.parse::<f64>().ok());

        let date = row
            .invoice_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        batch.records.push(TransactionRecord {
            invoice_id,
            item,
            quantity,
            date,
            unit_rate,
        });
    }

    tracing::debug!(
        rows_in = batch.rows_in,
        kept = batch.records.len(),
        missing_invoice = batch.dropped_missing_invoice,
        credit = batch.dropped_credit,
        malformed = batch.malformed.len(),
        "normalization complete"
    );

    batch
}

// ============================================================================
// TESTS
// ============================================================================
