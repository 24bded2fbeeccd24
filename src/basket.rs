// Basket Matrix Builder - invoices become boolean item-presence rows
// Records are grouped by (invoice, item) with quantities summed; an
// item is present in a basket iff its net quantity is strictly
// positive. The matrix is immutable once built.

use crate::error::EngineError;
use crate::normalizer::TransactionRecord;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

// ============================================================================
// BASKET
// ============================================================================

/// The set of distinct items purchased in a single invoice. Item ids
/// index into the owning matrix's item universe and are kept sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Basket {
    pub invoice_id: String,
    pub items: Vec<u32>,
}

// ============================================================================
// BASKET MATRIX
// ============================================================================

/// Presence matrix over a fixed, deduplicated item universe.
///
/// Columns are stored as bitsets (one bit per basket), so counting the
/// baskets that contain a whole itemset is an AND + popcount over the
/// member columns. Column order is first-seen order: stable and
/// deterministic for identical input, with no semantic meaning.
#[derive(Debug, Clone)]
pub struct BasketMatrix {
    /// Item universe; position = item id
    item_names: IndexSet<String>,

    /// One presence bitset per item, aligned with `item_names`
    columns: Vec<Vec<u64>>,

    /// One basket per distinct valid invoice, in first-seen order
    baskets: Vec<Basket>,

    /// First non-empty invoice date seen per basket, for reporting
    basket_dates: Vec<Option<String>>,
}

impl BasketMatrix {
    /// Aggregate cleaned records into a presence matrix.
    ///
    /// Returns `EmptyDataset` when no basket survives filtering.
    pub fn build(records: &[TransactionRecord]) -> Result<BasketMatrix, EngineError> {
        // Group by invoice, then by item, summing net quantity.
        // IndexMap keeps first-seen order on both levels.
        let mut by_invoice: IndexMap<&str, IndexMap<&str, f64>> = IndexMap::new();
        let mut invoice_dates: IndexMap<&str, Option<&str>> = IndexMap::new();

        for record in records {
            let items = by_invoice.entry(record.invoice_id.as_str()).or_default();
            *items.entry(record.item.as_str()).or_insert(0.0) += record.quantity;

            let date = invoice_dates.entry(record.invoice_id.as_str()).or_insert(None);
            if date.is_none() {
                *date = record.date.as_deref();
            }
        }

        // Keep items with strictly positive net quantity; a basket
        // with nothing left is dropped entirely
        let mut item_names: IndexSet<String> = IndexSet::new();
        let mut baskets = Vec::new();
        let mut basket_dates = Vec::new();

        for (invoice_id, items) in &by_invoice {
            let mut ids: Vec<u32> = items
                .iter()
                .filter(|(_, &net)| net > 0.0)
                .map(|(item, _)| {
                    let (id, _) = item_names.insert_full((*item).to_string());
                    id as u32
                })
                .collect();

            if ids.is_empty() {
                continue;
            }

            ids.sort_unstable();
            baskets.push(Basket {
                invoice_id: (*invoice_id).to_string(),
                items: ids,
            });
            basket_dates.push(invoice_dates[invoice_id].map(str::to_string));
        }

        if baskets.is_empty() {
            return Err(EngineError::EmptyDataset);
        }

        // Column bitsets: bit i of column c set iff basket i contains
        // item c
        let blocks = baskets.len().div_ceil(64);
        let mut columns = vec![vec![0u64; blocks]; item_names.len()];
        for (row, basket) in baskets.iter().enumerate() {
            for &id in &basket.items {
                columns[id as usize][row / 64] |= 1u64 << (row % 64);
            }
        }

        tracing::debug!(
            baskets = baskets.len(),
            items = item_names.len(),
            "basket matrix built"
        );

        Ok(BasketMatrix {
            item_names,
            columns,
            baskets,
            basket_dates,
        })
    }

    /// Number of baskets (rows).
    pub fn n_baskets(&self) -> usize {
        self.baskets.len()
    }

    /// Number of distinct items (columns).
    pub fn n_items(&self) -> usize {
        self.item_names.len()
    }

    /// Item name for a column id.
    pub fn item_name(&self, id: u32) -> &str {
        self.item_names
            .get_index(id as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Resolve a sorted id slice to item names.
    pub fn item_names_for(&self, ids: &[u32]) -> Vec<String> {
        ids.iter().map(|&id| self.item_name(id).to_string()).collect()
    }

    pub fn baskets(&self) -> &[Basket] {
        &self.baskets
    }

    /// First-seen invoice date per basket, aligned with `baskets()`.
    pub fn basket_dates(&self) -> &[Option<String>] {
        &self.basket_dates
    }

    /// Count the baskets containing every item in `items`.
    ///
    /// This is the hot path of support counting: one AND + popcount
    /// pass over the member columns.
    pub fn support_count(&self, items: &[u32]) -> u32 {
        let Some((&first, rest)) = items.split_first() else {
            return self.n_baskets() as u32;
        };

        if rest.is_empty() {
            return self.columns[first as usize]
                .iter()
                .map(|b| b.count_ones())
                .sum();
        }

        let mut acc = self.columns[first as usize].clone();
        for &id in rest {
            for (a, b) in acc.iter_mut().zip(&self.columns[id as usize]) {
                *a &= b;
            }
        }
        acc.iter().map(|b| b.count_ones()).sum()
    }

    /// Support fraction for an itemset.
    pub fn support(&self, items: &[u32]) -> f64 {
        self.support_count(items) as f64 / self.n_baskets() as f64
    }

    /// Per-item basket counts, in universe (first-seen) order.
    pub fn item_frequency(&self) -> Vec<(String, u32)> {
        (0..self.n_items() as u32)
            .map(|id| (self.item_name(id).to_string(), self.support_count(&[id])))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(invoice: &str, item: &str, qty: f64) -> TransactionRecord {
        TransactionRecord {
            invoice_id: invoice.to_string(),
            item: item.to_string(),
            quantity: qty,
            date: Some("2010-12-01".to_string()),
            unit_rate: None,
        }
    }

    #[test]
    fn test_basic_aggregation() {
        let records = vec![
            record("1", "A", 2.0),
            record("1", "B", 1.0),
            record("2", "A", 3.0),
        ];
        let matrix = BasketMatrix::build(&records).unwrap();

        assert_eq!(matrix.n_baskets(), 2);
        assert_eq!(matrix.n_items(), 2);
        assert_eq!(matrix.support_count(&[0]), 2); // A
        assert_eq!(matrix.support_count(&[1]), 1); // B
    }

    #[test]
    fn test_duplicate_rows_sum_quantity() {
        // Same (invoice, item) twice: net 3, present once
        let records = vec![record("1", "A", 1.0), record("1", "A", 2.0)];
        let matrix = BasketMatrix::build(&records).unwrap();

        assert_eq!(matrix.n_baskets(), 1);
        assert_eq!(matrix.baskets()[0].items, vec![0]);
    }

    #[test]
    fn test_negative_net_quantity_excludes_item() {
        // A partial return cancels the purchase: net 0, item absent
        let records = vec![
            record("1", "A", 2.0),
            record("1", "A", -2.0),
            record("1", "B", 1.0),
        ];
        let matrix = BasketMatrix::build(&records).unwrap();

        assert_eq!(matrix.n_items(), 1);
        assert_eq!(matrix.item_name(0), "B");
    }

    #[test]
    fn test_basket_with_no_positive_items_is_dropped() {
        let records = vec![record("1", "A", -5.0), record("2", "B", 1.0)];
        let matrix = BasketMatrix::build(&records).unwrap();

        assert_eq!(matrix.n_baskets(), 1);
        assert_eq!(matrix.baskets()[0].invoice_id, "2");
    }

    #[test]
    fn test_empty_dataset_error() {
        let err = BasketMatrix::build(&[]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset));

        let all_negative = vec![record("1", "A", -1.0)];
        let err = BasketMatrix::build(&all_negative).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset));
    }

    #[test]
    fn test_universe_is_first_seen_order_and_stable() {
        let records = vec![
            record("1", "ZEBRA", 1.0),
            record("1", "APPLE", 1.0),
            record("2", "MANGO", 1.0),
            record("2", "ZEBRA", 1.0),
        ];
        let matrix = BasketMatrix::build(&records).unwrap();

        assert_eq!(matrix.item_name(0), "ZEBRA");
        assert_eq!(matrix.item_name(1), "APPLE");
        assert_eq!(matrix.item_name(2), "MANGO");

        // Identical input, identical universe
        let again = BasketMatrix::build(&records).unwrap();
        assert_eq!(matrix.item_frequency(), again.item_frequency());
    }

    #[test]
    fn test_pair_support_count() {
        let records = vec![
            record("1", "A", 1.0),
            record("1", "B", 1.0),
            record("2", "A", 1.0),
            record("3", "A", 1.0),
            record("3", "B", 1.0),
        ];
        let matrix = BasketMatrix::build(&records).unwrap();

        assert_eq!(matrix.support_count(&[0, 1]), 2);
        assert_eq!(matrix.support(&[0, 1]), 2.0 / 3.0);
    }

    #[test]
    fn test_more_than_64_baskets() {
        // Exercise the multi-block bitset path
        let mut records = Vec::new();
        for i in 0..130 {
            records.push(record(&format!("inv{i}"), "A", 1.0));
            if i % 2 == 0 {
                records.push(record(&format!("inv{i}"), "B", 1.0));
            }
        }
        let matrix = BasketMatrix::build(&records).unwrap();

        assert_eq!(matrix.n_baskets(), 130);
        assert_eq!(matrix.support_count(&[0]), 130);
        assert_eq!(matrix.support_count(&[1]), 65);
        assert_eq!(matrix.support_count(&[0, 1]), 65);
    }
}
