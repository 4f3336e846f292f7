//! Plausibility screening of entered values.
//!
//! Runs beside validation but never rejects and never edits a value. A
//! Na/Cl pair that looks transposed is flagged; accepted values in a
//! critical or severe band raise a warning.

use super::findings::{ExtremeSeverity, ExtremeSide, Finding, SwapConfidence, SwapPattern};
use super::input::{Analyte, Measurement};
use crate::config::{ExtremeBand, ExtremeThresholds};

/// Check whether Na and Cl look entered in each other's place.
///
/// Patterns are tried from most to least specific and the first match wins.
/// Returns `None` when either value is absent.
pub fn na_cl_swap_suspicion(na: Option<f64>, cl: Option<f64>) -> Option<Finding> {
    let (na, cl) = (na?, cl?);
    let gap = cl - na;

    let (confidence, pattern) = if (95.0..=110.0).contains(&na) && (135.0..=145.0).contains(&cl) {
        (SwapConfidence::High, SwapPattern::ReversedRanges)
    } else if na < 100.0 && cl > 135.0 && gap > 35.0 {
        (SwapConfidence::High, SwapPattern::WideInversion)
    } else if na < 115.0 && cl > 125.0 && gap > 20.0 {
        (SwapConfidence::Medium, SwapPattern::LowNaHighCl)
    } else if na < cl && cl > 120.0 {
        (SwapConfidence::Low, SwapPattern::ClAboveNa)
    } else {
        return None;
    };

    Some(Finding::SwapSuspicion {
        na,
        cl,
        confidence,
        pattern,
    })
}

fn band_for(extremes: &ExtremeThresholds, analyte: Analyte) -> Option<&ExtremeBand> {
    match analyte {
        Analyte::Ph => Some(&extremes.ph),
        Analyte::Pco2 => Some(&extremes.pco2_mmHg),
        Analyte::Na => Some(&extremes.na_mM),
        Analyte::Cl => Some(&extremes.cl_mM),
        Analyte::Hco3 => Some(&extremes.hco3_mEq),
        Analyte::K => Some(&extremes.k_mM),
        Analyte::Ca => Some(&extremes.ca_mM),
        Analyte::Mg => Some(&extremes.mg_mM),
        Analyte::Lactate => Some(&extremes.lactate_mM),
        Analyte::AlbuminGl => Some(&extremes.albumin_g_per_L),
        Analyte::Po4 => Some(&extremes.po4_mM),
        Analyte::Be => None,
    }
}

/// Critical bounds are inclusive, severe bounds strict
pub fn assess_band(band: &ExtremeBand, value: f64) -> Option<(ExtremeSeverity, ExtremeSide, f64)> {
    if let Some(bound) = band.critical_low.filter(|b| value <= *b) {
        return Some((ExtremeSeverity::Critical, ExtremeSide::Low, bound));
    }
    if let Some(bound) = band.critical_high.filter(|b| value >= *b) {
        return Some((ExtremeSeverity::Critical, ExtremeSide::High, bound));
    }
    if let Some(bound) = band.severe_low.filter(|b| value < *b) {
        return Some((ExtremeSeverity::Severe, ExtremeSide::Low, bound));
    }
    if let Some(bound) = band.severe_high.filter(|b| value > *b) {
        return Some((ExtremeSeverity::Severe, ExtremeSide::High, bound));
    }
    None
}

const SCREEN_ORDER: [Analyte; 11] = [
    Analyte::Ph,
    Analyte::Pco2,
    Analyte::Na,
    Analyte::Cl,
    Analyte::Hco3,
    Analyte::K,
    Analyte::Ca,
    Analyte::Mg,
    Analyte::Lactate,
    Analyte::AlbuminGl,
    Analyte::Po4,
];

/// Warnings for accepted values in an extreme band.
///
/// Critical warnings come first, then severe ones, each in field order.
pub fn extreme_values(m: &Measurement, extremes: &ExtremeThresholds) -> Vec<Finding> {
    let (critical, severe): (Vec<Finding>, Vec<Finding>) = SCREEN_ORDER
        .into_iter()
        .filter_map(|field| {
            let value = m.get(field)?;
            let band = band_for(extremes, field)?;
            let (severity, side, bound) = assess_band(band, value)?;
            Some(Finding::ExtremeValue {
                field,
                value,
                severity,
                side,
                bound,
            })
        })
        .partition(|f| {
            matches!(
                f,
                Finding::ExtremeValue {
                    severity: ExtremeSeverity::Critical,
                    ..
                }
            )
        });
    critical.into_iter().chain(severe).collect()
}
