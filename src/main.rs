// basket-miner CLI - load a transaction CSV, mine association rules,
// print the report tables, optionally export them

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use basket_miner::{load_csv, run_analysis, AnalysisReport, EngineConfig, EngineError};

/// Market-basket analysis over a retail transaction CSV
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input CSV file (Invoice No., Product Name, QTY,
    /// Invoice Date, RATE)
    input: String,

    /// Minimum support fraction for frequent itemsets
    #[arg(long, default_value = "0.002")]
    min_support: f64,

    /// Minimum lift for a rule to be kept
    #[arg(long, default_value = "1.0")]
    min_lift: f64,

    /// Collapse the rule list to one representative per distinct lift
    /// value (reporting convenience; hides same-lift rule pairs)
    #[arg(long)]
    dedup_by_lift: bool,

    /// How many rows of the item-frequency table to print
    #[arg(long, default_value = "25")]
    top: usize,

    /// Write the ranked rule table to this CSV file
    #[arg(long)]
    rules_csv: Option<String>,

    /// Write the full report to this JSON file
    #[arg(long)]
    json: Option<String>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = EngineConfig {
        min_support: args.min_support,
        min_lift_threshold: args.min_lift,
        dedup_by_lift: args.dedup_by_lift,
    };

    let rows = load_csv(&args.input)?;
    println!("Loaded {} rows from {}", rows.len(), args.input);

    let report = match run_analysis(&rows, &config) {
        Ok(report) => report,
        Err(EngineError::EmptyDataset) => {
            anyhow::bail!("no valid baskets remain after normalization; nothing to mine")
        }
        Err(err) => return Err(err).context("analysis failed"),
    };

    print_report(&report, args.top);

    if let Some(path) = &args.rules_csv {
        report.export_rules_csv(path)?;
        println!("\nRules written to {path}");
    }

    if let Some(path) = &args.json {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write JSON report: {path}"))?;
        println!("Report written to {path}");
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_report(report: &AnalysisReport, top: usize) {
    let d = &report.diagnostics;
    println!("\n=== Batch summary ===");
    println!("Rows in:           {}", d.rows_in);
    println!(
        "Rows dropped:      {} (missing invoice: {}, credit: {}, malformed: {})",
        d.rows_dropped(),
        d.rows_dropped_missing_invoice,
        d.rows_dropped_credit,
        d.rows_malformed
    );
    println!("Baskets:           {}", d.total_baskets);
    println!("Distinct items:    {}", d.distinct_items);
    for level in &d.frequent_per_level {
        println!(
            "Level {}:           {} candidates, {} frequent",
            level.level, level.candidates, level.frequent
        );
    }

    println!("\n=== Top {} items by basket count ===", top);
    for entry in report.top_items(top) {
        println!("{:>6}  {}", entry.baskets, entry.item);
    }

    if !report.transactions_by_date.is_empty() {
        println!("\n=== Invoices by date ===");
        for entry in &report.transactions_by_date {
            println!("{:>6}  {}", entry.invoices, entry.date);
        }
    }

    if !report.revenue_by_product.is_empty() {
        println!("\n=== Top products by revenue ===");
        for entry in report.revenue_by_product.iter().take(top) {
            println!("{:>12.2}  {}", entry.revenue, entry.item);
        }
    }

    println!("\n=== Association rules ===");
    if report.rules.is_empty() {
        let reason = report
            .no_rules_reason
            .as_deref()
            .unwrap_or("no associations found");
        println!("No associations found: {reason}");
        return;
    }

    println!(
        "{:<40} {:<40} {:>8} {:>10} {:>8}  strength",
        "antecedent", "consequent", "support", "confidence", "lift"
    );
    for ranked in &report.rules {
        println!(
            "{:<40} {:<40} {:>8.4} {:>10.4} {:>8.2}  {}",
            ranked.rule.antecedent.join(", "),
            ranked.rule.consequent.join(", "),
            ranked.rule.support,
            ranked.rule.confidence,
            ranked.rule.lift,
            ranked.strength
        );
    }
}
