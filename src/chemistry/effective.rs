//! Effective SID, strong ion gap and total weak acid.
//!
//! SIDe is the buffer-base side of electroneutrality: bicarbonate plus the
//! charge carried by albumin and phosphate at the measured pH. The gap
//! between SIDa and SIDe is the strong ion gap (SIG).
//!
//! References:
//! - Figge J, Mydosh T, Fencl V. J Lab Clin Med. 1992;120:713-719
//! - Kellum JA, Kramer DJ, Pinsky MR. J Crit Care. 1995;10:51-55

use serde::Serialize;

use super::round_to;
use super::sid::FullSid;
use crate::analysis::{Analyte, Measurement};

/// Albumin charge per g/L per pH unit
pub const ALBUMIN_PH_COEFFICIENT: f64 = 0.123;
/// Albumin charge offset
pub const ALBUMIN_CONSTANT: f64 = 0.631;
/// Phosphate charge per mmol/L per pH unit
pub const PO4_PH_COEFFICIENT: f64 = 0.309;
/// Phosphate charge offset
pub const PO4_CONSTANT: f64 = 0.469;

/// How far SIG can be trusted given what was measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SigReliability {
    Reliable,
    Approximate,
    Underestimated,
    Unreliable,
}

impl SigReliability {
    pub fn as_str(self) -> &'static str {
        match self {
            SigReliability::Reliable => "reliable",
            SigReliability::Approximate => "approximate",
            SigReliability::Underestimated => "underestimated",
            SigReliability::Unreliable => "unreliable",
        }
    }
}

/// Advanced-mode Stewart quantities
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveSid {
    pub sid_effective: f64,
    /// Weak acids left out of SIDe (albumin, phosphate)
    pub missing: Vec<Analyte>,
    pub sig: f64,
    pub sig_reliability: SigReliability,
    pub atot: Option<f64>,
}

/// SIDe = HCO3 + Alb × (0.123 pH − 0.631) + PO4 × (0.309 pH − 0.469)
pub fn sid_effective(
    ph: f64,
    hco3: f64,
    albumin_gl: Option<f64>,
    po4: Option<f64>,
) -> (f64, Vec<Analyte>) {
    let mut missing = Vec::new();
    let mut sid_e = hco3;

    match albumin_gl {
        Some(alb) => sid_e += alb * (ALBUMIN_PH_COEFFICIENT * ph - ALBUMIN_CONSTANT),
        None => missing.push(Analyte::AlbuminGl),
    }
    match po4 {
        Some(po4) => sid_e += po4 * (PO4_PH_COEFFICIENT * ph - PO4_CONSTANT),
        None => missing.push(Analyte::Po4),
    }

    (round_to(sid_e, 1), missing)
}

/// SIG = SIDa − SIDe
pub fn strong_ion_gap(sid_apparent: f64, sid_effective: f64) -> f64 {
    round_to(sid_apparent - sid_effective, 1)
}

/// Reliability in strict priority order: lactate, then albumin, then Ca/Mg
pub fn assess_sig_reliability(
    lactate: Option<f64>,
    albumin_gl: Option<f64>,
    ca: Option<f64>,
    mg: Option<f64>,
) -> SigReliability {
    if lactate.is_none() {
        SigReliability::Underestimated
    } else if albumin_gl.is_none() {
        SigReliability::Unreliable
    } else if ca.is_none() || mg.is_none() {
        SigReliability::Approximate
    } else {
        SigReliability::Reliable
    }
}

/// Atot = 0.123 × Alb + 0.309 × PO4; albumin is required
pub fn atot(albumin_gl: Option<f64>, po4: Option<f64>) -> Option<f64> {
    let albumin_gl = albumin_gl?;
    let total = ALBUMIN_PH_COEFFICIENT * albumin_gl + po4.map_or(0.0, |p| PO4_PH_COEFFICIENT * p);
    Some(round_to(total, 1))
}

/// Compute SIDe, SIG and Atot for a measurement
pub fn compute_effective_sid(m: &Measurement, hco3_used: f64, full: &FullSid) -> EffectiveSid {
    let (sid_e, missing) = sid_effective(m.ph, hco3_used, m.albumin_gl, m.po4);
    EffectiveSid {
        sid_effective: sid_e,
        missing,
        sig: strong_ion_gap(full.value, sid_e),
        sig_reliability: assess_sig_reliability(m.lactate, m.albumin_gl, m.ca, m.mg),
        atot: atot(m.albumin_gl, m.po4),
    }
}
