//! Batch analysis of CSV panels.
//!
//! Each row is analysed on its own; one bad row never stops the batch.
//! Rows are processed in file order.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::analysis::{
    AnalysisMode, AnalysisResult, Finding, FindingKind, MeasurementInput, StewartAnalyzer,
    SwapConfidence,
};
use crate::export::{flatten, read_flat_records, CsvExporter, FlatRecord, FlatRecordError, INPUT_KEYS};

/// Batch I/O failure
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("no input columns found (expected some of: {expected})")]
    NoInputColumns { expected: String },
}

/// What happened to one row
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Analyzed(AnalysisResult),
    Rejected(AnalysisResult),
    ParseError(FlatRecordError),
}

impl BatchOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            BatchOutcome::Analyzed(_) => "ok",
            BatchOutcome::Rejected(_) => "rejected",
            BatchOutcome::ParseError(_) => "parse_error",
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            BatchOutcome::Analyzed(r) | BatchOutcome::Rejected(r) => Some(r),
            BatchOutcome::ParseError(_) => None,
        }
    }

    /// Findings that question the entered data itself
    pub fn review_findings(&self) -> impl Iterator<Item = &Finding> {
        self.result()
            .into_iter()
            .flat_map(|r| r.findings.iter())
            .filter(|f| f.needs_review())
    }

    fn has_finding_of(&self, kind: FindingKind) -> bool {
        self.review_findings().any(|f| f.kind() == kind)
    }
}

/// One input row and its outcome
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    /// 1-based data row number
    pub row_number: usize,
    pub outcome: BatchOutcome,
}

/// Counts per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub analyzed: usize,
    pub rejected: usize,
    pub parse_errors: usize,
    /// Rows whose Na/Cl pair looks transposed
    pub swap_suspected: usize,
    /// Rows with at least one critical or severe value
    pub extreme_values: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub rows: Vec<BatchRow>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.rows.len(),
            ..Default::default()
        };
        for row in &self.rows {
            match row.outcome {
                BatchOutcome::Analyzed(_) => summary.analyzed += 1,
                BatchOutcome::Rejected(_) => summary.rejected += 1,
                BatchOutcome::ParseError(_) => summary.parse_errors += 1,
            }
            if row.outcome.has_finding_of(FindingKind::Plausibility) {
                summary.swap_suspected += 1;
            }
            if row.outcome.has_finding_of(FindingKind::ExtremeValue) {
                summary.extreme_values += 1;
            }
        }
        summary
    }

    /// Flat record for a row, led by row number, status and detail
    ///
    /// The detail holds rejection reasons followed by any data-review
    /// warnings (suspected Na/Cl swap, extreme values).
    pub fn flat_row(row: &BatchRow) -> FlatRecord {
        let mut record = FlatRecord::new();
        record.push("row_number", row.row_number.to_string());
        record.push("status", row.outcome.status());
        let (mut detail, body) = match &row.outcome {
            BatchOutcome::ParseError(e) => (vec![e.to_string()], FlatRecord::blank()),
            BatchOutcome::Rejected(r) => (r.error_messages(), flatten(r)),
            BatchOutcome::Analyzed(r) => (Vec::new(), flatten(r)),
        };
        detail.extend(row.outcome.review_findings().map(ToString::to_string));
        record.push("detail", detail.join("; "));
        for (key, value) in body.keys().zip(body.values()) {
            record.push(key, value);
        }
        record
    }

    /// Write every row, including failures, to a CSV file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<PathBuf> {
        let mut exporter = CsvExporter::create(path)?;
        for row in &self.rows {
            exporter.record(&Self::flat_row(row))?;
        }
        exporter.finish()
    }
}

/// Runs the analyzer over many rows
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    analyzer: StewartAnalyzer,
    mode: AnalysisMode,
}

impl BatchRunner {
    pub fn new(analyzer: StewartAnalyzer, mode: AnalysisMode) -> Self {
        Self { analyzer, mode }
    }

    pub fn analyze_record(&self, record: &FlatRecord) -> BatchOutcome {
        match MeasurementInput::from_flat(record) {
            Ok(input) => {
                let result = self.analyzer.analyze(&input, self.mode);
                if result.is_valid() {
                    BatchOutcome::Analyzed(result)
                } else {
                    BatchOutcome::Rejected(result)
                }
            }
            Err(e) => BatchOutcome::ParseError(e),
        }
    }

    pub fn run_records(&self, records: &[FlatRecord]) -> BatchReport {
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let outcome = self.analyze_record(record);
                for finding in outcome.review_findings() {
                    if matches!(
                        finding,
                        Finding::SwapSuspicion {
                            confidence: SwapConfidence::High,
                            ..
                        }
                    ) {
                        log::warn!("Row {}: {}", i + 1, finding);
                    } else {
                        log::debug!("Row {}: {}", i + 1, finding.code());
                    }
                }
                BatchRow {
                    row_number: i + 1,
                    outcome,
                }
            })
            .collect();
        let report = BatchReport { rows };
        let summary = report.summary();
        log::info!(
            "Batch finished: {} rows, {} analysed, {} rejected, {} unparsable, \
             {} suspected Na/Cl swaps, {} with extreme values",
            summary.total,
            summary.analyzed,
            summary.rejected,
            summary.parse_errors,
            summary.swap_suspected,
            summary.extreme_values
        );
        report
    }

    /// Analyse CSV read from `reader`
    pub fn run_reader<R: Read>(&self, reader: R) -> Result<BatchReport, BatchError> {
        let records = read_flat_records(reader)?;
        let has_inputs = records
            .first()
            .map_or(true, |r| r.keys().any(|k| INPUT_KEYS.contains(&k) || k == "hco3" || k == "be"));
        if !has_inputs {
            return Err(BatchError::NoInputColumns {
                expected: INPUT_KEYS.join(", "),
            });
        }
        Ok(self.run_records(&records))
    }

    /// Analyse a CSV file
    pub fn run_path<P: AsRef<Path>>(&self, path: P) -> Result<BatchReport, BatchError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| BatchError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Batch input: {}", path.display());
        self.run_reader(file)
    }
}
