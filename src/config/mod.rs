//! Configuration module for loading analysis parameters.
//!
//! All clinical thresholds include citations to their source publications.

mod parameters;

pub use parameters::{
    BaseExcessPreset, ClinicalThresholds, ExtremeBand, ExtremeThresholds, Parameters,
    PhysiologicLimits, Range, ReferenceValues, DEFAULT_PARAMETER_PATH,
};
