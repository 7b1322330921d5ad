use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;

use kiabi_po_to_report::{
    DocumentExtraction, ExtractOptions, ExtractedRow, MergePolicy, Metadata,
};
use kiabi_po_worker::report_pipeline::{download_filename, fold_extractions};
use kiabi_po_worker::routes::{merge_policy_from_env, report_timestamp, upload_page};

fn row(order_no: &str, color: &str, size: &str, quantity: u32) -> ExtractedRow {
    ExtractedRow {
        order_no: order_no.to_string(),
        color: color.to_string(),
        size: size.to_string(),
        quantity,
    }
}

fn extraction(rows: Vec<ExtractedRow>, metadata: Metadata) -> DocumentExtraction {
    DocumentExtraction {
        metadata,
        rows,
        booking_sheet: false,
        warnings: Vec::new(),
    }
}

fn metadata_with_season(season: &str) -> Metadata {
    Metadata {
        season: season.to_string(),
        ..Metadata::default()
    }
}

#[test]
fn merge_policy_env_parsing_defaults_to_last_wins() {
    assert_eq!(merge_policy_from_env(None), MergePolicy::LastWins);
    assert_eq!(
        merge_policy_from_env(Some("fill-missing".to_string())),
        MergePolicy::FillMissing
    );
    assert_eq!(
        merge_policy_from_env(Some("nonsense".to_string())),
        MergePolicy::LastWins
    );
}

#[test]
fn later_file_metadata_overwrites_under_last_wins() {
    let extractions = vec![
        extraction(vec![], metadata_with_season("SS25")),
        extraction(vec![], metadata_with_season("AW25")),
    ];

    let options = ExtractOptions::default();
    let (report, _) = fold_extractions(&extractions, &options);
    assert_eq!(report.metadata.season, "AW25");

    let options = ExtractOptions {
        merge_policy: MergePolicy::FillMissing,
        ..ExtractOptions::default()
    };
    let (report, _) = fold_extractions(&extractions, &options);
    assert_eq!(report.metadata.season, "SS25");
}

#[test]
fn batch_folding_sums_duplicate_triples() {
    let extractions = vec![
        extraction(vec![row("1001", "Red", "S", 5)], Metadata::default()),
        extraction(vec![row("1001", "Red", "S", 3)], Metadata::default()),
    ];

    let (report, row_count) = fold_extractions(&extractions, &ExtractOptions::default());
    assert_eq!(row_count, 2);
    assert_eq!(report.pivots.len(), 1);
    assert_eq!(report.pivots[0].order_rows[0].quantities, vec![8]);
    assert_eq!(report.grand_total, 8);
}

#[test]
fn download_filename_percent_encodes_booking() {
    assert_eq!(download_filename("BK-101"), "po-summary-BK-101.csv");
    assert_eq!(download_filename("N/A"), "po-summary-N%2FA.csv");
}

#[test]
fn report_timestamp_is_minute_precise_utc() {
    let now: DateTime<Utc> = "2026-08-06T09:30:00Z".parse().expect("valid datetime");
    assert_eq!(report_timestamp(now), "2026-08-06 09:30 UTC");
}

#[test]
fn upload_page_carries_notice_on_empty_result() {
    let page = upload_page("Cotton Clothing BD Limited", Some("No PO data extracted."));
    assert!(page.contains("No PO data extracted."));
    assert!(page.contains("name=\"pdf_files\""));
    assert!(page.contains("Cotton Clothing BD Limited"));

    let plain = upload_page("Cotton Clothing BD Limited", None);
    assert!(!plain.contains("class=\"message\""));
}
