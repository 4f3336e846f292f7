//! Export and batch tests
//!
//! Exercises the flat record view end to end: CSV in, analysis per row,
//! CSV out, and the JSON export of a set of results.

use stewart_analyzer::batch::{BatchError, BatchOutcome};
use stewart_analyzer::export::{
    export_analysis_json_to, flatten, read_flat_records_from_path, CsvExporter, FLAT_KEYS,
    LIST_DELIMITER,
};
use stewart_analyzer::{
    analyze, AnalysisMode, BatchRunner, MeasurementInput, StewartAnalyzer,
};

const PANELS: &str = "\
ph,pco2,na,cl,hco3,be,lactate,albumin_gl,k,ca,mg,po4
7.40,40,140,100,,,1.0,40,4.0,1.2,0.8,1.0
7.28,30,138,115,,,1.5,40,,,,
7.25 , 28 , 140 , 100 ,,,\"8,0\",40,,,,
7.40,40,140,,,,1.0,40,,,,
7.40,40,140,100,,,n/a,forty,,,,
";

// ============================================================================
// Flat record
// ============================================================================

#[test]
fn test_flat_record_has_every_key_in_order() {
    let result = analyze(
        &MeasurementInput::new(7.40, 40.0, 140.0, 100.0)
            .with_lactate(1.0)
            .with_albumin_gl(40.0),
        AnalysisMode::Quick,
    );
    let record = flatten(&result);
    let keys: Vec<&str> = record.keys().collect();
    assert_eq!(keys, FLAT_KEYS);
    assert_eq!(record.get("sid_simple"), Some("40"));
    assert_eq!(record.get("dominant_disorder"), Some("normal"));
}

#[test]
fn test_flat_respiratory_effect_at_set_point_is_zero() {
    let result = analyze(
        &MeasurementInput::new(7.40, 40.0, 140.0, 100.0),
        AnalysisMode::Quick,
    );
    let record = flatten(&result);
    assert_eq!(record.get("respiratory_effect"), Some("0"));
}

#[test]
fn test_rejected_result_keeps_column_count() {
    let mut input = MeasurementInput::new(7.40, 40.0, 140.0, 100.0);
    input.cl = None;
    let result = analyze(&input, AnalysisMode::Quick);
    let record = flatten(&result);

    assert_eq!(record.len(), FLAT_KEYS.len());
    assert_eq!(record.get("is_valid"), Some("false"));
    assert_eq!(record.get("sid_simple"), Some(""));
    assert!(!record.get("errors").unwrap_or_default().is_empty());
}

#[test]
fn test_findings_are_joined() {
    let result = analyze(
        &MeasurementInput::new(7.40, 40.0, 140.0, 100.0),
        AnalysisMode::Quick,
    );
    let record = flatten(&result);
    let findings = record.get("findings").unwrap_or_default();
    let codes: Vec<&str> = findings.split(LIST_DELIMITER).collect();
    assert_eq!(codes, vec!["MISSING_ALBUMIN_GL", "MISSING_LACTATE"]);
}

// ============================================================================
// Batch
// ============================================================================

#[test]
fn test_batch_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("panels.csv");
    std::fs::write(&input_path, PANELS).unwrap();

    let runner = BatchRunner::new(StewartAnalyzer::default(), AnalysisMode::Advanced);
    let report = runner.run_path(&input_path).unwrap();

    let statuses: Vec<&str> = report.rows.iter().map(|r| r.outcome.status()).collect();
    assert_eq!(statuses, vec!["ok", "ok", "ok", "rejected", "parse_error"]);

    let summary = report.summary();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.analyzed, 3);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.parse_errors, 1);

    // Padded cells and a comma decimal are accepted
    let BatchOutcome::Analyzed(third) = &report.rows[2].outcome else {
        panic!("row 3 should be analysed");
    };
    assert_eq!(third.input.lactate, Some(8.0));
    assert_eq!(third.input.ph, Some(7.25));

    let output_path = dir.path().join("results").join("out.csv");
    let written = report.write_csv(&output_path).unwrap();
    assert_eq!(written, output_path);

    let rows = read_flat_records_from_path(&output_path).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].get("row_number"), Some("1"));
    assert_eq!(rows[3].get("status"), Some("rejected"));
    assert_eq!(rows[4].get("status"), Some("parse_error"));
    assert!(rows[4].get("detail").unwrap_or_default().contains("albumin_gl"));

    // Analysed rows read back into the same inputs
    for (row, batch_row) in rows.iter().zip(&report.rows).take(3) {
        let original = batch_row.outcome.result().map(|r| r.input.clone());
        assert_eq!(MeasurementInput::from_flat(row).ok(), original);
    }
}

#[test]
fn test_batch_missing_file() {
    let err = BatchRunner::default()
        .run_path("does/not/exist.csv")
        .unwrap_err();
    assert!(matches!(err, BatchError::Open { .. }));
}

// ============================================================================
// CSV and JSON export
// ============================================================================

#[test]
fn test_csv_exporter_follows_first_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.csv");

    let valid = analyze(
        &MeasurementInput::new(7.28, 30.0, 138.0, 115.0),
        AnalysisMode::Quick,
    );
    let mut rejected_input = MeasurementInput::new(7.28, 30.0, 138.0, 115.0);
    rejected_input.ph = None;
    let rejected = analyze(&rejected_input, AnalysisMode::Quick);

    let mut exporter = CsvExporter::create(&path).unwrap();
    exporter.record_result(&valid).unwrap();
    exporter.record_result(&rejected).unwrap();
    exporter.finish().unwrap();

    let rows = read_flat_records_from_path(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("is_valid"), Some("false"));
    assert_eq!(rows[1].get("ph"), Some(""));
    assert_eq!(rows[0].get("sid_simple"), Some("23"));
}

#[test]
fn test_json_export_contains_each_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.json");

    let results = vec![
        analyze(
            &MeasurementInput::new(7.25, 28.0, 140.0, 100.0).with_lactate(8.0),
            AnalysisMode::Quick,
        ),
        analyze(&MeasurementInput::default(), AnalysisMode::Quick),
    ];
    export_analysis_json_to(&results, &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let exported = value["results"].as_array().unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0]["report"]["effects"]["lactate_effect"], -8.0);
    assert!(exported[1]["report"].is_null());
    assert_eq!(exported[1]["errors"].as_array().unwrap().len(), 4);
}
