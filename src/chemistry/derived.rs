//! Derived blood-gas values.
//!
//! Bicarbonate from Henderson-Hasselbalch and a Base Excess estimate from a
//! named coefficient preset. Manually entered values always win; the
//! calculated value is kept alongside for the consistency check.
//!
//! References:
//! - Henderson LJ. Am J Physiol. 1908;21:173-179
//! - Hasselbalch KA. Biochem Z. 1917;78:112-144
//! - Siggaard-Andersen O. Scand J Clin Lab Invest. 1977;37(S146):15-20

use serde::Serialize;

use super::round_to;
use crate::analysis::Measurement;
use crate::config::{BaseExcessPreset, ClinicalThresholds};

/// CO2 solubility coefficient (mmol/L per mmHg)
pub const CO2_SOLUBILITY: f64 = 0.03;

/// Apparent pKa of the carbonic acid system in plasma
pub const CARBONIC_PKA: f64 = 6.1;

/// Bicarbonate at which BE is zero (mEq/L)
pub const BE_HCO3_REFERENCE: f64 = 24.4;

/// pH at which BE is zero
pub const BE_PH_REFERENCE: f64 = 7.40;

/// Where a used value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Calculated,
    Manual,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueSource::Calculated => "calculated",
            ValueSource::Manual => "manual",
        }
    }
}

/// Calculated and used value of one derived quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedPair {
    pub calculated: f64,
    pub used: f64,
    pub source: ValueSource,
    /// |manual - calculated| when it exceeds the mismatch threshold
    pub mismatch_mEq: Option<f64>,
}

impl DerivedPair {
    fn resolve(manual: Option<f64>, calculated: f64, threshold: f64) -> Self {
        match manual {
            Some(manual) => Self {
                calculated,
                used: manual,
                source: ValueSource::Manual,
                mismatch_mEq: check_consistency(manual, calculated, threshold),
            },
            None => Self {
                calculated,
                used: calculated,
                source: ValueSource::Calculated,
                mismatch_mEq: None,
            },
        }
    }
}

/// Bicarbonate and Base Excess as used by the rest of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedValues {
    pub hco3: DerivedPair,
    pub be: DerivedPair,
}

/// HCO3 = 0.03 × pCO2 × 10^(pH − 6.1), rounded to 0.1 mEq/L
pub fn calculate_hco3(ph: f64, pco2_mmHg: f64) -> f64 {
    round_to(CO2_SOLUBILITY * pco2_mmHg * 10f64.powf(ph - CARBONIC_PKA), 1)
}

/// BE = c1 × (HCO3 − 24.4) + c2 × (pH − 7.40), rounded to 0.1 mEq/L
pub fn calculate_be(ph: f64, hco3: f64, preset: BaseExcessPreset) -> f64 {
    let (c_hco3, c_ph) = preset.coefficients();
    round_to(
        c_hco3 * (hco3 - BE_HCO3_REFERENCE) + c_ph * (ph - BE_PH_REFERENCE),
        1,
    )
}

/// Difference between a manual and a calculated value, if it exceeds `threshold`
pub fn check_consistency(manual: f64, calculated: f64, threshold: f64) -> Option<f64> {
    let difference = round_to((manual - calculated).abs(), 1);
    (difference > threshold).then_some(difference)
}

/// Resolve HCO3 and BE for a measurement.
///
/// BE is estimated from the HCO3 that is actually used, so a manual HCO3
/// feeds into the calculated BE.
pub fn derive_values(
    m: &Measurement,
    preset: BaseExcessPreset,
    thresholds: &ClinicalThresholds,
) -> DerivedValues {
    let hco3 = DerivedPair::resolve(
        m.hco3,
        calculate_hco3(m.ph, m.pco2),
        thresholds.hco3_mismatch_mEq,
    );
    let be = DerivedPair::resolve(
        m.be,
        calculate_be(m.ph, hco3.used, preset),
        thresholds.be_mismatch_mEq,
    );
    DerivedValues { hco3, be }
}
