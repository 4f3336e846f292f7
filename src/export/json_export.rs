//! JSON export of analysis results.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::analysis::AnalysisResult;

/// Export format version
pub const EXPORT_VERSION: &str = "1.0.0";

/// Full analysis export structure
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisExport<'a> {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: &'static str,
    /// Crate version that produced the analysis
    pub engine_version: &'static str,
    pub results: &'a [AnalysisResult],
}

impl<'a> AnalysisExport<'a> {
    pub fn new(results: &'a [AnalysisResult]) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: EXPORT_VERSION,
            engine_version: env!("CARGO_PKG_VERSION"),
            results,
        }
    }
}

/// Export results to JSON
///
/// Creates the exports directory if it doesn't exist.
/// Filename is auto-generated with timestamp: `analysis_YYYYMMDD_HHMMSS.json`
///
/// Returns the path to the saved JSON file.
pub fn export_analysis_json(results: &[AnalysisResult]) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir)?;

    let timestamp = Local::now();
    let filename = format!("analysis_{}.json", timestamp.format("%Y%m%d_%H%M%S"));
    let path = dir.join(&filename);

    export_analysis_json_to(results, &path)?;
    Ok(path)
}

/// Export results to a specific file
pub fn export_analysis_json_to<P: AsRef<Path>>(results: &[AnalysisResult], path: P) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &AnalysisExport::new(results))?;

    log::info!("JSON analysis exported: {}", path.display());
    Ok(())
}
