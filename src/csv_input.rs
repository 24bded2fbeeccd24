// CSV boundary - raw tabular rows before any typing or validation
// Recognized column names are case-sensitive and match the upstream
// export format; extra columns are ignored, missing ones become None.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One untyped row as it arrives from the tabular feed. Everything is
/// optional here: the normalizer decides what is required and what
/// merely tolerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRow {
    #[serde(rename = "Invoice No.")]
    pub invoice_no: Option<String>,

    #[serde(rename = "Product Name")]
    pub product_name: Option<String>,

    /// Kept as a string so non-numeric values reach the normalizer as
    /// malformed rows instead of failing the whole batch at parse time.
    #[serde(rename = "QTY")]
    pub qty: Option<String>,

    #[serde(rename = "Invoice Date")]
    pub invoice_date: Option<String>,

    /// Unit rate, used only by downstream reporting (revenue table).
    #[serde(rename = "RATE")]
    pub rate: Option<String>,
}

/// Load raw rows from a CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("Failed to open transaction file: {:?}", path.as_ref()))?;
    read_csv(file)
}

/// Load raw rows from any reader (used by tests and embedding callers).
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        let row: RawRow = result.context("Failed to read CSV row")?;
        rows.push(row);
    }

    Ok(rows)
}
