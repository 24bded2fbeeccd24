// End-to-end tests: CSV file in, analysis report out

use basket_miner::{load_csv, run_analysis, EngineConfig, EngineError, StrengthCategory};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

const HEADER: &str = "Invoice No.,Product Name,QTY,Invoice Date,RATE\n";

fn config(min_support: f64, min_lift: f64) -> EngineConfig {
    EngineConfig {
        min_support,
        min_lift_threshold: min_lift,
        dedup_by_lift: false,
    }
}

#[test]
fn test_csv_to_report() {
    let file = write_csv(&format!(
        "{HEADER}\
536365, WHITE LANTERN ,2,2010-12-01,3.39
536365,HEART HOLDER,1,2010-12-01,2.55
536366,WHITE LANTERN,1,2010-12-01,3.39
536366,HEART HOLDER,2,2010-12-01,2.55
536367,MUG,1,2010-12-02,1.25
536368,TRAY,1,2010-12-02,4.10
"
    ));

    let rows = load_csv(file.path()).unwrap();
    assert_eq!(rows.len(), 6);

    let report = run_analysis(&rows, &config(0.25, 1.0)).unwrap();

    assert_eq!(report.diagnostics.total_baskets, 4);
    assert_eq!(report.diagnostics.distinct_items, 4);

    // Item names were trimmed during normalization
    assert!(report
        .item_frequency
        .iter()
        .any(|f| f.item == "WHITE LANTERN" && f.baskets == 2));

    // LANTERN and HOLDER always co-occur: two directional rules,
    // confidence 1.0, lift 2.0, both Mildly associated
    assert_eq!(report.rules.len(), 2);
    for ranked in &report.rules {
        assert!((ranked.rule.confidence - 1.0).abs() < 1e-12);
        assert!((ranked.rule.lift - 2.0).abs() < 1e-12);
        assert_eq!(ranked.strength, StrengthCategory::Mild);
    }

    // Reporting tables from the original feed
    assert_eq!(report.transactions_by_date.len(), 2);
    assert_eq!(report.transactions_by_date[0].date, "2010-12-01");
    assert_eq!(report.transactions_by_date[0].invoices, 2);
    assert_eq!(report.revenue_by_product[0].item, "WHITE LANTERN");
}

#[test]
fn test_credit_invoices_and_malformed_rows_are_accounted() {
    let file = write_csv(&format!(
        "{HEADER}\
C536365,WHITE LANTERN,2,2010-12-01,3.39
536366,WHITE LANTERN,two,2010-12-01,3.39
536367,WHITE LANTERN,1,2010-12-01,3.39
,HEART HOLDER,1,2010-12-01,2.55
"
    ));

    let rows = load_csv(file.path()).unwrap();
    let report = run_analysis(&rows, &EngineConfig::default()).unwrap();

    let d = &report.diagnostics;
    assert_eq!(d.rows_in, 4);
    assert_eq!(d.rows_dropped_credit, 1);
    assert_eq!(d.rows_malformed, 1);
    assert_eq!(d.rows_dropped_missing_invoice, 1);
    assert_eq!(d.total_baskets, 1);
}

#[test]
fn test_empty_input_fails_with_empty_dataset() {
    // All rows are credits, so nothing survives normalization
    let file = write_csv(&format!(
        "{HEADER}\
C536365,WHITE LANTERN,2,2010-12-01,3.39
C536366,HEART HOLDER,1,2010-12-01,2.55
"
    ));

    let rows = load_csv(file.path()).unwrap();
    let err = run_analysis(&rows, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::EmptyDataset));
}

#[test]
fn test_threshold_too_high_reports_reason_with_partial_output() {
    let file = write_csv(&format!(
        "{HEADER}\
536365,WHITE LANTERN,2,2010-12-01,3.39
536366,HEART HOLDER,1,2010-12-01,2.55
"
    ));

    let rows = load_csv(file.path()).unwrap();
    let report = run_analysis(&rows, &config(1.0, 1.0)).unwrap();

    assert!(report.rules.is_empty());
    assert!(report.no_rules_reason.is_some());
    // Matrix-derived output is still available for partial reporting
    assert_eq!(report.item_frequency.len(), 2);
    assert_eq!(report.diagnostics.total_baskets, 2);
}

#[test]
fn test_rules_csv_export_to_file() {
    let file = write_csv(&format!(
        "{HEADER}\
536365,X,1,2010-12-01,1.00
536365,Y,1,2010-12-01,1.00
536366,X,1,2010-12-01,1.00
536366,Y,1,2010-12-01,1.00
536367,N,1,2010-12-01,1.00
536368,M,1,2010-12-01,1.00
"
    ));

    let rows = load_csv(file.path()).unwrap();
    let report = run_analysis(&rows, &config(0.25, 1.0)).unwrap();
    assert_eq!(report.rules.len(), 2);

    let out = NamedTempFile::new().unwrap();
    report.export_rules_csv(out.path()).unwrap();

    let text = std::fs::read_to_string(out.path()).unwrap();
    assert!(text.starts_with("antecedent,consequent,support,confidence,lift,strength"));
    assert_eq!(text.lines().count(), 3);

    let json = report.to_json().unwrap();
    assert!(json.contains("\"lift\""));
}

#[test]
fn test_identical_input_identical_report() {
    let csv = format!(
        "{HEADER}\
536365,A,1,2010-12-01,1.00
536365,B,1,2010-12-01,1.00
536366,A,1,2010-12-01,1.00
536367,B,1,2010-12-02,1.00
536368,A,1,2010-12-02,1.00
536368,B,1,2010-12-02,1.00
"
    );
    let file = write_csv(&csv);
    let rows = load_csv(file.path()).unwrap();

    let first = run_analysis(&rows, &config(0.2, 0.0)).unwrap();
    let second = run_analysis(&rows, &config(0.2, 0.0)).unwrap();

    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}
