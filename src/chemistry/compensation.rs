//! Respiratory and metabolic compensation.
//!
//! An ordered decision procedure picks the most likely primary disorder and
//! compares the observed counter-value with the empirical expectation. The
//! first matching branch wins.
//!
//! References:
//! - Albert MS, Dell RB, Winters RW. Ann Intern Med. 1967;66:312-322
//! - Javaheri S, Kazemi H. Am Rev Respir Dis. 1987;136:1011-1016
//! - Adrogué HJ, Madias NE. N Engl J Med. 1998;338:26-34

use serde::Serialize;
use std::fmt;

use super::round_to;
use crate::config::{ClinicalThresholds, ReferenceValues};

// Winters' formula
pub const WINTERS_HCO3_COEFFICIENT: f64 = 1.5;
pub const WINTERS_CONSTANT: f64 = 8.0;

// Metabolic alkalosis
pub const ALKALOSIS_HCO3_COEFFICIENT: f64 = 0.7;
pub const ALKALOSIS_CONSTANT: f64 = 21.0;

// ΔHCO3 per ΔpCO2
pub const RESP_ACIDOSIS_ACUTE: f64 = 0.1;
pub const RESP_ACIDOSIS_CHRONIC: f64 = 0.35;
pub const RESP_ALKALOSIS_ACUTE: f64 = 0.2;
pub const RESP_ALKALOSIS_CHRONIC: f64 = 0.5;

/// Best guess at the primary process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryDisorder {
    MetabolicAcidosis,
    MetabolicAlkalosis,
    RespiratoryAcidosis,
    RespiratoryAlkalosis,
    None,
}

impl PrimaryDisorder {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimaryDisorder::MetabolicAcidosis => "metabolic_acidosis",
            PrimaryDisorder::MetabolicAlkalosis => "metabolic_alkalosis",
            PrimaryDisorder::RespiratoryAcidosis => "respiratory_acidosis",
            PrimaryDisorder::RespiratoryAlkalosis => "respiratory_alkalosis",
            PrimaryDisorder::None => "none",
        }
    }

    pub fn is_respiratory(self) -> bool {
        matches!(
            self,
            PrimaryDisorder::RespiratoryAcidosis | PrimaryDisorder::RespiratoryAlkalosis
        )
    }
}

/// Compensation verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationStatus {
    AppropriateCompensation,
    /// pCO2 higher than expected for a metabolic process
    AdditionalAcidosis,
    /// pCO2 lower than expected for a metabolic process
    AdditionalAlkalosis,
    Acute,
    Chronic,
    SubacuteIndeterminate,
    None,
}

impl CompensationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompensationStatus::AppropriateCompensation => "appropriate_compensation",
            CompensationStatus::AdditionalAcidosis => "additional_acidosis",
            CompensationStatus::AdditionalAlkalosis => "additional_alkalosis",
            CompensationStatus::Acute => "acute",
            CompensationStatus::Chronic => "chronic",
            CompensationStatus::SubacuteIndeterminate => "subacute_indeterminate",
            CompensationStatus::None => "none",
        }
    }
}

/// Result of the compensation procedure
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompensationAssessment {
    pub primary: PrimaryDisorder,
    pub status: CompensationStatus,
    /// Set for metabolic primaries (whole mmHg)
    pub expected_pco2_mmHg: Option<f64>,
    /// Set for respiratory primaries
    pub expected_hco3_mEq: Option<f64>,
    /// Observed − expected; absent in the subacute band and without a primary
    pub delta: Option<f64>,
}

impl CompensationAssessment {
    fn none() -> Self {
        Self {
            primary: PrimaryDisorder::None,
            status: CompensationStatus::None,
            expected_pco2_mmHg: None,
            expected_hco3_mEq: None,
            delta: None,
        }
    }
}

impl fmt::Display for CompensationAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CompensationStatus::*;
        let process = match self.primary {
            PrimaryDisorder::RespiratoryAcidosis => "respiratory acidosis",
            PrimaryDisorder::RespiratoryAlkalosis => "respiratory alkalosis",
            _ => "",
        };
        match (self.status, self.expected_pco2_mmHg, self.expected_hco3_mEq) {
            (AppropriateCompensation, Some(pco2), _) => {
                write!(f, "Appropriate respiratory compensation (expected pCO₂ {pco2:.0} ± 2 mmHg)")
            }
            (AdditionalAlkalosis, Some(pco2), _) => write!(
                f,
                "Additional respiratory alkalosis (pCO₂ {:.0} mmHg below the expected {pco2:.0})",
                self.delta.unwrap_or_default().abs()
            ),
            (AdditionalAcidosis, Some(pco2), _) => write!(
                f,
                "Additional respiratory acidosis (pCO₂ {:.0} mmHg above the expected {pco2:.0})",
                self.delta.unwrap_or_default().abs()
            ),
            (Acute, _, Some(hco3)) => {
                write!(f, "Acute {process} (expected HCO₃⁻ {hco3:.1} mEq/L)")
            }
            (Chronic, _, Some(hco3)) => {
                write!(f, "Chronic {process} (expected HCO₃⁻ {hco3:.1} mEq/L)")
            }
            (SubacuteIndeterminate, _, _) => write!(
                f,
                "Subacute or mixed {process} (HCO₃⁻ between the acute and chronic expectations)"
            ),
            _ => f.write_str("No primary disorder identified"),
        }
    }
}

/// Winters: expected pCO2 = 1.5 × HCO3 + 8
pub fn expected_pco2_metabolic_acidosis(hco3: f64) -> f64 {
    round_to(WINTERS_HCO3_COEFFICIENT * hco3 + WINTERS_CONSTANT, 0)
}

/// Expected pCO2 = 0.7 × HCO3 + 21
pub fn expected_pco2_metabolic_alkalosis(hco3: f64) -> f64 {
    round_to(ALKALOSIS_HCO3_COEFFICIENT * hco3 + ALKALOSIS_CONSTANT, 0)
}

/// Expected HCO3 in respiratory acidosis
pub fn expected_hco3_respiratory_acidosis(pco2: f64, chronic: bool, reference: &ReferenceValues) -> f64 {
    let coefficient = if chronic {
        RESP_ACIDOSIS_CHRONIC
    } else {
        RESP_ACIDOSIS_ACUTE
    };
    let delta_pco2 = pco2 - reference.pco2_set_point_mmHg;
    round_to(reference.hco3_set_point_mEq + coefficient * delta_pco2, 1)
}

/// Expected HCO3 in respiratory alkalosis
pub fn expected_hco3_respiratory_alkalosis(pco2: f64, chronic: bool, reference: &ReferenceValues) -> f64 {
    let coefficient = if chronic {
        RESP_ALKALOSIS_CHRONIC
    } else {
        RESP_ALKALOSIS_ACUTE
    };
    let delta_pco2 = reference.pco2_set_point_mmHg - pco2;
    round_to(reference.hco3_set_point_mEq - coefficient * delta_pco2, 1)
}

/// Metabolic branch: compare observed pCO2 with the expectation
fn metabolic(primary: PrimaryDisorder, pco2: f64, expected: f64, tolerance: f64) -> CompensationAssessment {
    let diff = pco2 - expected;
    let status = if diff.abs() <= tolerance {
        CompensationStatus::AppropriateCompensation
    } else if diff < 0.0 {
        CompensationStatus::AdditionalAlkalosis
    } else {
        CompensationStatus::AdditionalAcidosis
    };
    CompensationAssessment {
        primary,
        status,
        expected_pco2_mmHg: Some(expected),
        expected_hco3_mEq: None,
        delta: Some(round_to(diff, 1)),
    }
}

fn respiratory(primary: PrimaryDisorder, hco3: f64, expected: f64, status: CompensationStatus) -> CompensationAssessment {
    let delta = (status != CompensationStatus::SubacuteIndeterminate).then(|| round_to(hco3 - expected, 1));
    CompensationAssessment {
        primary,
        status,
        expected_pco2_mmHg: None,
        expected_hco3_mEq: Some(expected),
        delta,
    }
}

/// Run the ordered compensation procedure.
///
/// In the respiratory branches the acute band is tested first; an HCO3
/// between the acute and chronic bands is reported as subacute with the acute
/// expectation and no delta.
pub fn assess_compensation(
    ph: f64,
    pco2: f64,
    hco3: f64,
    be: f64,
    reference: &ReferenceValues,
    thresholds: &ClinicalThresholds,
) -> CompensationAssessment {
    let acidemic = ph < reference.ph_normal.min;
    let alkalemic = ph > reference.ph_normal.max;
    let tolerance = thresholds.compensation_tolerance;

    if be < -thresholds.materiality_mEq && (acidemic || ph <= reference.ph_normal.max) {
        return metabolic(
            PrimaryDisorder::MetabolicAcidosis,
            pco2,
            expected_pco2_metabolic_acidosis(hco3),
            tolerance,
        );
    }

    if be > thresholds.materiality_mEq && (alkalemic || ph >= reference.ph_normal.min) {
        return metabolic(
            PrimaryDisorder::MetabolicAlkalosis,
            pco2,
            expected_pco2_metabolic_alkalosis(hco3),
            tolerance,
        );
    }

    if pco2 > reference.pco2_normal_mmHg.max && acidemic {
        let acute = expected_hco3_respiratory_acidosis(pco2, false, reference);
        let chronic = expected_hco3_respiratory_acidosis(pco2, true, reference);
        let primary = PrimaryDisorder::RespiratoryAcidosis;
        return if hco3 <= acute + tolerance {
            respiratory(primary, hco3, acute, CompensationStatus::Acute)
        } else if hco3 >= chronic - tolerance {
            respiratory(primary, hco3, chronic, CompensationStatus::Chronic)
        } else {
            respiratory(primary, hco3, acute, CompensationStatus::SubacuteIndeterminate)
        };
    }

    if pco2 < reference.pco2_normal_mmHg.min && alkalemic {
        let acute = expected_hco3_respiratory_alkalosis(pco2, false, reference);
        let chronic = expected_hco3_respiratory_alkalosis(pco2, true, reference);
        let primary = PrimaryDisorder::RespiratoryAlkalosis;
        return if hco3 >= acute - tolerance {
            respiratory(primary, hco3, acute, CompensationStatus::Acute)
        } else if hco3 <= chronic + tolerance {
            respiratory(primary, hco3, chronic, CompensationStatus::Chronic)
        } else {
            respiratory(primary, hco3, acute, CompensationStatus::SubacuteIndeterminate)
        };
    }

    CompensationAssessment::none()
}
