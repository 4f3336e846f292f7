//! Three-layer strong ion difference.
//!
//! - simple: Na − Cl, always available
//! - basic: Na − Cl − Lactate
//! - full (SIDa): (Na + K + Ca + Mg) − (Cl + Lactate), summing measured ions only
//!
//! Reference: Stewart PA. Can J Physiol Pharmacol. 1983;61:1444-1461

use serde::Serialize;

use super::round_to;
use crate::analysis::{Analyte, Measurement};

/// Status of the basic layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicSidStatus {
    Measured,
    LactateMissing,
}

impl BasicSidStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BasicSidStatus::Measured => "measured",
            BasicSidStatus::LactateMissing => "lactate_missing",
        }
    }
}

/// Completeness of the full layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// No ion missing
    Complete,
    /// One or two ions missing
    Partial,
    /// Three or four ions missing
    Incomplete,
}

impl Completeness {
    pub fn from_missing_count(missing: usize) -> Self {
        match missing {
            0 => Completeness::Complete,
            1 | 2 => Completeness::Partial,
            _ => Completeness::Incomplete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Completeness::Complete => "complete",
            Completeness::Partial => "partial",
            Completeness::Incomplete => "incomplete",
        }
    }
}

/// Basic layer (Na − Cl − Lactate)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BasicSid {
    pub value: Option<f64>,
    pub status: BasicSidStatus,
}

/// Full layer (apparent SID)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullSid {
    pub value: f64,
    pub status: Completeness,
    /// Ions left out of the sum, in K, Ca, Mg, Lactate order
    pub missing: Vec<Analyte>,
}

/// All three SID estimates for one measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidLayers {
    pub simple: f64,
    pub basic: BasicSid,
    pub full: FullSid,
}

/// Na − Cl
pub fn sid_simple(na: f64, cl: f64) -> f64 {
    round_to(na - cl, 1)
}

/// Na − Cl − Lactate, absent without lactate
pub fn sid_basic(na: f64, cl: f64, lactate: Option<f64>) -> BasicSid {
    match lactate {
        Some(lactate) => BasicSid {
            value: Some(round_to(na - cl - lactate, 1)),
            status: BasicSidStatus::Measured,
        },
        None => BasicSid {
            value: None,
            status: BasicSidStatus::LactateMissing,
        },
    }
}

/// (Na + K + Ca + Mg) − (Cl + Lactate) over the ions that were measured
pub fn sid_full(m: &Measurement) -> FullSid {
    let mut missing = Vec::new();
    let mut cations = m.na;
    let mut anions = m.cl;

    for (analyte, value) in [(Analyte::K, m.k), (Analyte::Ca, m.ca), (Analyte::Mg, m.mg)] {
        match value {
            Some(v) => cations += v,
            None => missing.push(analyte),
        }
    }
    match m.lactate {
        Some(v) => anions += v,
        None => missing.push(Analyte::Lactate),
    }

    FullSid {
        value: round_to(cations - anions, 1),
        status: Completeness::from_missing_count(missing.len()),
        missing,
    }
}

/// Compute all three layers
pub fn compute_sid_layers(m: &Measurement) -> SidLayers {
    SidLayers {
        simple: sid_simple(m.na, m.cl),
        basic: sid_basic(m.na, m.cl, m.lactate),
        full: sid_full(m),
    }
}
