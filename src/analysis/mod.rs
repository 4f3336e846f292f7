//! Input boundary, validation and the analysis orchestrator.

mod analyzer;
mod findings;
mod input;
mod result;
mod screening;
mod validation;

pub use analyzer::{analyze, StewartAnalyzer};
pub use findings::{
    ExtremeSeverity, ExtremeSide, Finding, FindingKind, Rejection, SwapConfidence, SwapPattern,
};
pub use input::{Analyte, Measurement, MeasurementInput};
pub use result::{AcidBaseReport, AnalysisMode, AnalysisResult};
pub use screening::{assess_band, extreme_values, na_cl_swap_suspicion};
pub use validation::validate;
