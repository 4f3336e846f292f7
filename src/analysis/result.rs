//! Analysis result aggregate.

use serde::Serialize;

use super::findings::{Finding, Rejection};
use super::input::{Analyte, MeasurementInput};
use crate::chemistry::{
    AnionGap, CompensationAssessment, ComponentEffects, DerivedValues, DisorderClassification,
    DominantDisorder, EffectiveSid, MechanismRanking, SidLayers,
};
use crate::narrative::Narrative;

/// Depth of the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Fencl-style decomposition only
    #[default]
    Quick,
    /// Adds SIDe, SIG and Atot
    Advanced,
}

impl AnalysisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Quick => "quick",
            AnalysisMode::Advanced => "advanced",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "quick" => Some(AnalysisMode::Quick),
            "advanced" => Some(AnalysisMode::Advanced),
            _ => None,
        }
    }
}

/// Every computed stage for a valid panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcidBaseReport {
    pub derived: DerivedValues,
    pub sid: SidLayers,
    /// Advanced mode only
    pub effective: Option<EffectiveSid>,
    pub effects: ComponentEffects,
    pub anion_gap: AnionGap,
    pub cl_na_ratio: f64,
    pub compensation: CompensationAssessment,
    pub ranking: MechanismRanking,
    pub classification: DisorderClassification,
    pub interpretations: Vec<String>,
    /// Optional values whose absence lowers precision
    pub missing_params: Vec<Analyte>,
    pub narrative: Narrative,
}

impl AcidBaseReport {
    pub fn hco3_used(&self) -> f64 {
        self.derived.hco3.used
    }

    pub fn be_used(&self) -> f64 {
        self.derived.be.used
    }

    pub fn dominant_disorder(&self) -> DominantDisorder {
        self.classification.dominant_disorder
    }

    pub fn sig(&self) -> Option<f64> {
        self.effective.as_ref().map(|e| e.sig)
    }
}

/// Outcome of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub input: MeasurementInput,
    pub mode: AnalysisMode,
    /// One entry per rejected field; empty when the panel was analysed
    pub errors: Vec<Rejection>,
    /// Non-fatal findings in the order they were raised
    pub findings: Vec<Finding>,
    /// Absent exactly when `errors` is non-empty
    pub report: Option<AcidBaseReport>,
}

impl AnalysisResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn finding_messages(&self) -> Vec<String> {
        self.findings.iter().map(ToString::to_string).collect()
    }
}
