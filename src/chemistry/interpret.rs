//! Per-parameter readings.
//!
//! Each reading pairs a short description with a severity for display. The
//! one-line `interpretations` summary only lists readings that are not normal.

use serde::Serialize;

use super::components::ComponentEffects;
use crate::analysis::Measurement;
use crate::config::{ClinicalThresholds, ReferenceValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Info,
    Warning,
    Critical,
}

/// Reading of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reading {
    pub text: &'static str,
    pub severity: Severity,
}

impl Reading {
    const NORMAL: Reading = Reading {
        text: "Normal",
        severity: Severity::Normal,
    };

    const fn new(text: &'static str, severity: Severity) -> Self {
        Self { text, severity }
    }

    pub fn is_normal(&self) -> bool {
        self.severity == Severity::Normal
    }
}

pub fn interpret_ph(ph: f64, reference: &ReferenceValues) -> Reading {
    if ph < reference.ph_normal.min {
        Reading::new("Acidemia", Severity::Critical)
    } else if ph > reference.ph_normal.max {
        Reading::new("Alkalemia", Severity::Critical)
    } else {
        Reading::NORMAL
    }
}

pub fn interpret_pco2(pco2_mmHg: f64, reference: &ReferenceValues) -> Reading {
    if pco2_mmHg > reference.pco2_normal_mmHg.max {
        Reading::new("Respiratory acidosis", Severity::Warning)
    } else if pco2_mmHg < reference.pco2_normal_mmHg.min {
        Reading::new("Respiratory alkalosis", Severity::Warning)
    } else {
        Reading::NORMAL
    }
}

pub fn interpret_sid_effect(sid_effect: f64, thresholds: &ClinicalThresholds) -> Reading {
    if sid_effect < -thresholds.materiality_mEq {
        Reading::new("SID acidosis (normal anion gap)", Severity::Warning)
    } else if sid_effect > thresholds.materiality_mEq {
        Reading::new("SID alkalosis", Severity::Info)
    } else {
        Reading::NORMAL
    }
}

pub fn interpret_albumin_effect(albumin_effect: f64, thresholds: &ClinicalThresholds) -> Reading {
    if albumin_effect > thresholds.materiality_mEq {
        Reading::new("Hypoalbuminemic alkalosis", Severity::Info)
    } else if albumin_effect < -thresholds.materiality_mEq {
        Reading::new("Hyperalbuminemic acidosis", Severity::Warning)
    } else {
        Reading::NORMAL
    }
}

pub fn interpret_lactate(lactate_mM: f64, thresholds: &ClinicalThresholds) -> Reading {
    if lactate_mM > thresholds.lactate_mM {
        Reading::new("Lactic acidosis", Severity::Warning)
    } else {
        Reading::NORMAL
    }
}

pub fn interpret_sig(sig: f64, thresholds: &ClinicalThresholds) -> Reading {
    if sig > thresholds.sig_mEq {
        Reading::new("Unmeasured anions present", Severity::Warning)
    } else if sig < -thresholds.sig_mEq {
        Reading::new("Unmeasured cations present (uncommon)", Severity::Info)
    } else {
        Reading::NORMAL
    }
}

pub fn interpret_residual(residual: f64, thresholds: &ClinicalThresholds) -> Reading {
    if residual < -thresholds.materiality_mEq {
        Reading::new("Unexplained acidosis (unmeasured anions?)", Severity::Warning)
    } else if residual > thresholds.materiality_mEq {
        Reading::new("Unexplained alkalosis", Severity::Info)
    } else {
        Reading::NORMAL
    }
}

/// Values a summary is built from
#[derive(Debug, Clone, Copy)]
pub struct SummaryInputs<'a> {
    pub measurement: &'a Measurement,
    pub effects: &'a ComponentEffects,
    pub sid_full: f64,
    /// Present in advanced mode
    pub sig: Option<f64>,
    pub advanced: bool,
}

/// Non-normal readings as display lines.
///
/// Quick mode lists the component readings; advanced mode replaces them with
/// SIG and the SIDa tendency.
pub fn summarize(
    inputs: SummaryInputs<'_>,
    reference: &ReferenceValues,
    thresholds: &ClinicalThresholds,
) -> Vec<String> {
    let m = inputs.measurement;
    let mut lines = Vec::new();

    let ph = interpret_ph(m.ph, reference);
    if !ph.is_normal() {
        lines.push(format!("pH: {}", ph.text));
    }
    let pco2 = interpret_pco2(m.pco2, reference);
    if !pco2.is_normal() {
        lines.push(format!("pCO₂: {}", pco2.text));
    }

    if !inputs.advanced {
        let effects = inputs.effects;
        let sid = interpret_sid_effect(effects.sid_effect, thresholds);
        if !sid.is_normal() {
            lines.push(format!("{:.1} mEq/L {}", effects.sid_effect.abs(), sid.text));
        }
        if let Some(albumin) = effects.albumin_effect {
            let reading = interpret_albumin_effect(albumin, thresholds);
            if !reading.is_normal() {
                lines.push(format!("{:.1} mEq/L {}", albumin.abs(), reading.text));
            }
        }
        if let Some(lactate) = m.lactate {
            let reading = interpret_lactate(lactate, thresholds);
            if !reading.is_normal() {
                lines.push(format!("{lactate:.1} mEq/L {}", reading.text));
            }
        }
        let residual = interpret_residual(effects.residual_effect, thresholds);
        if !residual.is_normal() {
            lines.push(format!(
                "{:.1} mEq/L {}",
                effects.residual_effect.abs(),
                residual.text
            ));
        }
        return lines;
    }

    if let Some(sig) = inputs.sig {
        let reading = interpret_sig(sig, thresholds);
        if !reading.is_normal() {
            lines.push(format!("SIG: {sig:.1} mEq/L - {}", reading.text));
        }
    }
    let sid_full = inputs.sid_full;
    if sid_full < reference.sid_full_mEq - thresholds.sid_tolerance_mEq {
        lines.push(format!("SIDa low ({sid_full:.1}): metabolic acidosis tendency"));
    } else if sid_full > reference.sid_full_mEq + thresholds.sid_tolerance_mEq {
        lines.push(format!("SIDa high ({sid_full:.1}): metabolic alkalosis tendency"));
    }
    lines
}
