//! CSV export and import of flat analysis records.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

use super::flatten::{flatten, FlatRecord};
use crate::analysis::AnalysisResult;

/// Row-by-row CSV writer for flat records
pub struct CsvExporter {
    writer: csv::Writer<File>,
    /// Column order taken from the first record
    header: Option<Vec<String>>,
    rows: usize,
    /// Path to output file
    path: PathBuf,
}

impl CsvExporter {
    /// Create an exporter in `exports/` with a timestamped filename
    pub fn new() -> Result<Self> {
        let dir = PathBuf::from("exports");
        std::fs::create_dir_all(&dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("analysis_{}.csv", timestamp);
        Self::create(dir.join(filename))
    }

    /// Create an exporter writing to `path`, creating parent directories
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            header: None,
            rows: 0,
            path,
        })
    }

    /// Write one record; the first record fixes the header
    pub fn record(&mut self, record: &FlatRecord) -> Result<()> {
        match &self.header {
            None => {
                let header: Vec<String> = record.keys().map(str::to_string).collect();
                self.writer.write_record(&header)?;
                self.header = Some(header);
                self.writer.write_record(record.values())?;
            }
            Some(header) => {
                // Follow the header order; keys the record lacks stay empty
                let row = header.iter().map(|key| record.get(key).unwrap_or(""));
                self.writer.write_record(row)?;
            }
        }
        self.rows += 1;
        Ok(())
    }

    /// Flatten and write an analysis result
    pub fn record_result(&mut self, result: &AnalysisResult) -> Result<()> {
        self.record(&flatten(result))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("CSV export completed: {} rows to {}", self.rows, self.path.display());
        Ok(self.path)
    }

    /// Get the output path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read CSV rows as flat records keyed by the header row
pub fn read_flat_records<R: Read>(reader: R) -> Result<Vec<FlatRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(FlatRecord::from_pairs(headers.iter(), row.iter()));
    }
    Ok(records)
}

/// Read flat records from a CSV file
pub fn read_flat_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<FlatRecord>> {
    let file = File::open(path.as_ref())?;
    let records = read_flat_records(file)?;
    log::info!("Read {} rows from {}", records.len(), path.as_ref().display());
    Ok(records)
}
