//! Structured findings attached to an analysis.
//!
//! Rejections stop an analysis; findings never do. Both carry the data that
//! triggered them and only become text through `Display`.

use serde::Serialize;
use std::fmt;

use super::input::Analyte;
use crate::chemistry::SigReliability;

/// Why an input panel was not analysed
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    #[error("{field} is required but was not supplied")]
    Missing { field: Analyte },

    #[error("{field} = {value} is outside the accepted range ({min}-{max} {unit})", unit = .field.unit())]
    OutOfRange {
        field: Analyte,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl Rejection {
    pub fn field(&self) -> Analyte {
        match self {
            Rejection::Missing { field } | Rejection::OutOfRange { field, .. } => *field,
        }
    }
}

/// Taxonomy of non-fatal findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Manual value disagrees with the calculated one
    Consistency,
    /// An optional value is absent
    IncompleteData,
    /// SIG carries a reliability annotation other than reliable
    ReliabilityDowngrade,
    /// The Na/Cl pair looks like an entry error
    Plausibility,
    /// An accepted value lies in a critical or severe band
    ExtremeValue,
}

/// How strongly a Na/Cl pair suggests the two were entered the wrong way round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapConfidence {
    /// Informational only
    Low,
    Medium,
    High,
}

impl SwapConfidence {
    pub fn as_str(self) -> &'static str {
        match self {
            SwapConfidence::Low => "low",
            SwapConfidence::Medium => "medium",
            SwapConfidence::High => "high",
        }
    }
}

/// Which Na/Cl pattern matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPattern {
    /// Na in a typical Cl range and Cl in a typical Na range
    ReversedRanges,
    /// Very low Na with very high Cl, more than 35 apart
    WideInversion,
    /// Low Na with high Cl, more than 20 apart
    LowNaHighCl,
    /// Cl above Na with Cl above 120
    ClAboveNa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeSeverity {
    Severe,
    Critical,
}

impl ExtremeSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtremeSeverity::Severe => "severe",
            ExtremeSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeSide {
    Low,
    High,
}

impl ExtremeSide {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtremeSide::Low => "low",
            ExtremeSide::High => "high",
        }
    }
}

/// Non-fatal finding accumulated while the pipeline runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    Hco3Mismatch {
        manual: f64,
        calculated: f64,
        difference: f64,
        threshold: f64,
    },
    BeMismatch {
        manual: f64,
        calculated: f64,
        difference: f64,
        threshold: f64,
    },
    MissingParameter {
        field: Analyte,
    },
    SigReliability {
        reliability: SigReliability,
    },
    /// Flag only; the values are analysed as entered
    SwapSuspicion {
        na: f64,
        cl: f64,
        confidence: SwapConfidence,
        pattern: SwapPattern,
    },
    ExtremeValue {
        field: Analyte,
        value: f64,
        severity: ExtremeSeverity,
        side: ExtremeSide,
        bound: f64,
    },
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::Hco3Mismatch { .. } | Finding::BeMismatch { .. } => FindingKind::Consistency,
            Finding::MissingParameter { .. } => FindingKind::IncompleteData,
            Finding::SigReliability { .. } => FindingKind::ReliabilityDowngrade,
            Finding::SwapSuspicion { .. } => FindingKind::Plausibility,
            Finding::ExtremeValue { .. } => FindingKind::ExtremeValue,
        }
    }

    /// Whether the entered data itself should be checked before use
    pub fn needs_review(&self) -> bool {
        matches!(self.kind(), FindingKind::Plausibility | FindingKind::ExtremeValue)
    }

    /// Short machine code, stable across releases
    pub fn code(&self) -> String {
        match self {
            Finding::Hco3Mismatch { .. } => "HCO3_MISMATCH".to_string(),
            Finding::BeMismatch { .. } => "BE_MISMATCH".to_string(),
            Finding::MissingParameter { field } => {
                format!("MISSING_{}", field.key().trim_end_matches("_input").to_uppercase())
            }
            Finding::SigReliability { reliability } => {
                format!("SIG_{}", reliability.as_str().to_uppercase())
            }
            Finding::SwapSuspicion { confidence, .. } => {
                format!("NA_CL_SWAP_{}", confidence.as_str().to_uppercase())
            }
            Finding::ExtremeValue {
                field,
                severity,
                side,
                ..
            } => format!(
                "{}_{}_{}",
                severity.as_str().to_uppercase(),
                field.key().trim_end_matches("_input").to_uppercase(),
                side.as_str().to_uppercase()
            ),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Hco3Mismatch {
                manual,
                calculated,
                difference,
                threshold,
            } => write!(
                f,
                "Entered HCO₃⁻ ({manual:.1}) differs from the Henderson-Hasselbalch value \
                 ({calculated:.1}) by {difference:.1} mEq/L (> {threshold:.0}). The entered value is used."
            ),
            Finding::BeMismatch {
                manual,
                calculated,
                difference,
                threshold,
            } => write!(
                f,
                "Entered BE ({manual:+.1}) differs from the calculated BE ({calculated:+.1}) \
                 by {difference:.1} mEq/L (> {threshold:.0}). The entered value is used."
            ),
            Finding::MissingParameter { field } => match field {
                Analyte::AlbuminGl => f.write_str(
                    "Albumin was not entered. A low albumin can raise BE and hide an acidifying process.",
                ),
                Analyte::Lactate => {
                    f.write_str("Lactate was not entered, so its contribution cannot be separated.")
                }
                Analyte::K => f.write_str("K⁺ was not entered; SIDa is computed without it."),
                Analyte::Ca | Analyte::Mg => {
                    write!(f, "{field} was not entered; SIDa is an approximation.")
                }
                Analyte::Po4 => {
                    f.write_str("Phosphate was not entered; SIDeffective is an approximation.")
                }
                other => write!(f, "{other} was not entered."),
            },
            Finding::SigReliability { reliability } => match reliability {
                SigReliability::Underestimated => {
                    f.write_str("Without lactate, SIG is probably underestimated.")
                }
                SigReliability::Unreliable => {
                    f.write_str("Without albumin, SIG cannot be relied on.")
                }
                SigReliability::Approximate => {
                    f.write_str("Ca²⁺ or Mg²⁺ is missing, so SIG is an approximation.")
                }
                SigReliability::Reliable => f.write_str("SIG is computed from a complete panel."),
            },
            Finding::SwapSuspicion {
                na, cl, confidence, ..
            } => match confidence {
                SwapConfidence::High => write!(
                    f,
                    "Na⁺ {na:.0} with Cl⁻ {cl:.0} looks like the two values were entered in each \
                     other's place. Check the source; the values were analysed as entered."
                ),
                SwapConfidence::Medium => write!(
                    f,
                    "Cl⁻ {cl:.0} is unusually high against Na⁺ {na:.0}; check whether the values \
                     were swapped."
                ),
                SwapConfidence::Low => write!(
                    f,
                    "Cl⁻ {cl:.0} is above Na⁺ {na:.0}. Unusual, but not necessarily an entry error."
                ),
            },
            Finding::ExtremeValue {
                field,
                value,
                severity,
                side,
                bound,
            } => {
                let comparison = match (severity, side) {
                    (ExtremeSeverity::Critical, ExtremeSide::Low) => "≤",
                    (ExtremeSeverity::Critical, ExtremeSide::High) => "≥",
                    (ExtremeSeverity::Severe, ExtremeSide::Low) => "<",
                    (ExtremeSeverity::Severe, ExtremeSide::High) => ">",
                };
                let reading = match field.unit() {
                    "" => value.to_string(),
                    unit => format!("{value} {unit}"),
                };
                write!(
                    f,
                    "{field} {reading} is {severity} {side} ({comparison} {bound}). \
                     The value was accepted; confirm it before acting on the analysis.",
                    severity = severity.as_str(),
                    side = side.as_str(),
                )
            }
        }
    }
}
