//! Export functionality for analysis results.
//!
//! Provides the flat record view, CSV export/import and JSON export.

mod csv_export;
mod flatten;
mod json_export;

pub use csv_export::{read_flat_records, read_flat_records_from_path, CsvExporter};
pub use flatten::{
    flatten, parse_number, FlatRecord, FlatRecordError, FLAT_KEYS, INPUT_KEYS, LIST_DELIMITER,
};
pub use json_export::{export_analysis_json, export_analysis_json_to, AnalysisExport, EXPORT_VERSION};
