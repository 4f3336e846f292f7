//! Stewart Analyzer - physicochemical acid-base analysis engine
//!
//! Takes one blood-gas and electrolyte panel and explains it with the
//! Stewart/Fencl approach: strong ion difference, weak acids and
//! unmeasured anions, alongside the classic bicarbonate view.

// Allow non-snake-case for unit suffixes in field names (mM, mmHg, mEq, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod analysis;
pub mod batch;
pub mod chemistry;
pub mod config;
pub mod export;
pub mod narrative;

pub use analysis::{
    analyze, AcidBaseReport, AnalysisMode, AnalysisResult, Analyte, Finding, MeasurementInput,
    Rejection, StewartAnalyzer,
};
pub use batch::{BatchReport, BatchRunner};
pub use chemistry::{DisorderTag, DominantDisorder};
pub use config::{BaseExcessPreset, Parameters};
pub use narrative::Narrative;
