//! Presence and hard-limit checks.
//!
//! This is the only stage that can stop an analysis. It checks that the
//! required values exist and that every supplied value lies inside the hard
//! physiologic limits; it never corrects or swaps values.

use super::findings::Rejection;
use super::input::{Analyte, Measurement, MeasurementInput};
use crate::config::{PhysiologicLimits, Range};

fn limit_for(limits: &PhysiologicLimits, analyte: Analyte) -> Range {
    match analyte {
        Analyte::Ph => limits.ph,
        Analyte::Pco2 => limits.pco2_mmHg,
        Analyte::Na => limits.na_mM,
        Analyte::Cl => limits.cl_mM,
        Analyte::Hco3 => limits.hco3_mEq,
        Analyte::Be => limits.be_mEq,
        Analyte::K => limits.k_mM,
        Analyte::Ca => limits.ca_mM,
        Analyte::Mg => limits.mg_mM,
        Analyte::Lactate => limits.lactate_mM,
        Analyte::AlbuminGl => limits.albumin_g_per_L,
        Analyte::Po4 => limits.po4_mM,
    }
}

/// Order in which fields are checked and rejections reported
const CHECK_ORDER: [Analyte; 12] = [
    Analyte::Ph,
    Analyte::Pco2,
    Analyte::Na,
    Analyte::Cl,
    Analyte::Hco3,
    Analyte::Be,
    Analyte::K,
    Analyte::Ca,
    Analyte::Mg,
    Analyte::Lactate,
    Analyte::AlbuminGl,
    Analyte::Po4,
];

/// Validate a raw panel.
///
/// Returns the validated measurement, or one rejection per violated field.
/// A manual base deficit is compared against the BE limits after negation.
pub fn validate(
    input: &MeasurementInput,
    limits: &PhysiologicLimits,
) -> Result<Measurement, Vec<Rejection>> {
    let mut rejections = Vec::new();

    for analyte in CHECK_ORDER {
        let value = match input.get(analyte) {
            Some(v) if analyte == Analyte::Be && input.is_base_deficit => Some(-v),
            other => other,
        };

        match value {
            None if Analyte::REQUIRED.contains(&analyte) => {
                rejections.push(Rejection::Missing { field: analyte });
            }
            None => {}
            Some(v) => {
                let range = limit_for(limits, analyte);
                if !v.is_finite() || !range.contains(v) {
                    rejections.push(Rejection::OutOfRange {
                        field: analyte,
                        value: v,
                        min: range.min,
                        max: range.max,
                    });
                }
            }
        }
    }

    match (input.ph, input.pco2, input.na, input.cl) {
        (Some(ph), Some(pco2), Some(na), Some(cl)) if rejections.is_empty() => Ok(Measurement {
            ph,
            pco2,
            na,
            cl,
            hco3: input.hco3,
            be: input.be.map(|be| if input.is_base_deficit { -be } else { be }),
            k: input.k,
            ca: input.ca,
            mg: input.mg,
            lactate: input.lactate,
            albumin_gl: input.albumin_gl,
            po4: input.po4,
        }),
        _ => Err(rejections),
    }
}
