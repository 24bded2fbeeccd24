// Reporting tables and diagnostic counters
// Everything the downstream presentation layer consumes: the ranked
// rule list, item-frequency table, per-date transaction counts, the
// revenue table, and batch diagnostics. Exportable as CSV (rules) and
// JSON (whole report).

use crate::apriori::LevelCount;
use crate::basket::BasketMatrix;
use crate::normalizer::NormalizedBatch;
use crate::ranking::RankedRule;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

// ============================================================================
// TABLE ROWS
// ============================================================================

/// Item name with the number of baskets containing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFrequency {
    pub item: String,
    pub baskets: u32,
}

/// Distinct invoices per invoice date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: String,
    pub invoices: u32,
}

/// Summed unit rate per product, for the revenue table. Reporting
/// only; never feeds the mining itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub item: String,
    pub revenue: f64,
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// Counters surfaced alongside the rule list so callers can report
/// what happened to the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub rows_in: usize,
    pub rows_dropped_missing_invoice: usize,
    pub rows_dropped_credit: usize,
    pub rows_malformed: usize,
    pub total_baskets: usize,
    pub distinct_items: usize,
    pub frequent_per_level: Vec<LevelCount>,
}

impl Diagnostics {
    pub fn rows_dropped(&self) -> usize {
        self.rows_dropped_missing_invoice + self.rows_dropped_credit + self.rows_malformed
    }
}

// ============================================================================
// ANALYSIS REPORT
// ============================================================================

/// Full output of one engine invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Ranked rules, strongest first; empty when nothing met the
    /// thresholds
    pub rules: Vec<RankedRule>,

    /// Why the rule list is empty, when it is (e.g. no frequent
    /// itemsets at the configured support)
    pub no_rules_reason: Option<String>,

    /// Items by basket count, descending
    pub item_frequency: Vec<ItemFrequency>,

    /// Distinct invoices per date, chronological where dates parse
    pub transactions_by_date: Vec<DateCount>,

    /// Products by summed rate, descending
    pub revenue_by_product: Vec<ProductRevenue>,

    pub diagnostics: Diagnostics,
}

impl AnalysisReport {
    /// Head of the item-frequency table.
    pub fn top_items(&self, n: usize) -> &[ItemFrequency] {
        &self.item_frequency[..self.item_frequency.len().min(n)]
    }

    /// Serialize the whole report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report as JSON")
    }

    /// Write the ranked rule table as CSV.
    pub fn write_rules_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record(["antecedent", "consequent", "support", "confidence", "lift", "strength"])
            .context("Failed to write rules CSV header")?;

        for ranked in &self.rules {
            csv_writer
                .write_record([
                    ranked.rule.antecedent.join("; ").as_str(),
                    ranked.rule.consequent.join("; ").as_str(),
                    format!("{:.6}", ranked.rule.support).as_str(),
                    format!("{:.6}", ranked.rule.confidence).as_str(),
                    format!("{:.6}", ranked.rule.lift).as_str(),
                    ranked.strength.label(),
                ])
                .context("Failed to write rules CSV row")?;
        }

        csv_writer.flush().context("Failed to flush rules CSV")?;
        Ok(())
    }

    /// Write the ranked rule table to a CSV file.
    pub fn export_rules_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())
            .with_context(|| format!("Failed to create rules CSV: {:?}", path.as_ref()))?;
        self.write_rules_csv(file)
    }
}

// ============================================================================
// TABLE BUILDERS
// ============================================================================

/// Item-frequency table from the matrix, basket counts descending.
/// Ties keep first-seen universe order (stable sort).
pub fn item_frequency_table(matrix: &BasketMatrix) -> Vec<ItemFrequency> {
    let mut table: Vec<ItemFrequency> = matrix
        .item_frequency()
        .into_iter()
        .map(|(item, baskets)| ItemFrequency { item, baskets })
        .collect();
    table.sort_by(|a, b| b.baskets.cmp(&a.baskets));
    table
}

/// Distinct invoices per invoice date, over the baskets that survived
/// filtering. Chronological when every date parses; otherwise the
/// raw strings sort lexically at the end.
pub fn transactions_by_date(matrix: &BasketMatrix) -> Vec<DateCount> {
    let mut counts: IndexMap<&str, u32> = IndexMap::new();
    for date in matrix.basket_dates().iter().flatten() {
        *counts.entry(date.as_str()).or_insert(0) += 1;
    }

    let mut table: Vec<DateCount> = counts
        .into_iter()
        .map(|(date, invoices)| DateCount {
            date: date.to_string(),
            invoices,
        })
        .collect();

    table.sort_by(|a, b| match (parse_date(&a.date), parse_date(&b.date)) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.date.cmp(&b.date),
    });

    table
}

/// Summed unit rate per product over the cleaned records, descending.
pub fn revenue_by_product(batch: &NormalizedBatch) -> Vec<ProductRevenue> {
    let mut totals: IndexMap<&str, f64> = IndexMap::new();
    for record in &batch.records {
        if let Some(rate) = record.unit_rate {
            *totals.entry(record.item.as_str()).or_insert(0.0) += rate;
        }
    }

    let mut table: Vec<ProductRevenue> = totals
        .into_iter()
        .map(|(item, revenue)| ProductRevenue {
            item: item.to_string(),
            revenue,
        })
        .collect();
    table.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    table
}

/// Invoice dates arrive in whatever format the feed uses; try the
/// common ones and fall back to string order.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

// ============================================================================
// TESTS
// ============================================================================
