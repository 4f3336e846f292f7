//! Analysis orchestrator.
//!
//! Runs the stages once per call:
//! screen → validate → derive → SID → (SIDe/SIG) → components →
//! compensation → ranking → classification → narrative.
//! Nothing is cached between calls; the analyzer only holds parameters.

use super::findings::Finding;
use super::input::{Analyte, Measurement, MeasurementInput};
use super::result::{AcidBaseReport, AnalysisMode, AnalysisResult};
use super::screening::{extreme_values, na_cl_swap_suspicion};
use super::validation::validate;
use crate::chemistry::components::{anion_gap, decompose};
use crate::chemistry::effective::compute_effective_sid;
use crate::chemistry::interpret::{summarize, SummaryInputs};
use crate::chemistry::sid::compute_sid_layers;
use crate::chemistry::{
    assess_compensation, cl_na_ratio, classify, derive_values, rank_mechanisms, DerivedValues,
    EffectiveSid, SidLayers, SigReliability,
};
use crate::config::{ClinicalThresholds, Parameters};
use crate::narrative::{self, NarrativeContext};

/// Stewart acid-base analyzer
#[derive(Debug, Clone, Default)]
pub struct StewartAnalyzer {
    params: Parameters,
}

impl StewartAnalyzer {
    pub fn new(params: Parameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Analyse one panel.
    ///
    /// Never fails: an invalid panel comes back with `errors` set and no
    /// report.
    pub fn analyze(&self, input: &MeasurementInput, mode: AnalysisMode) -> AnalysisResult {
        // Screened on the raw pair, so a rejected panel still carries it
        let swap = na_cl_swap_suspicion(input.na, input.cl);
        if let Some(finding) = &swap {
            log::debug!("{}", finding.code());
        }

        let measurement = match validate(input, &self.params.limits) {
            Ok(m) => m,
            Err(errors) => {
                log::debug!("Rejected panel: {} field(s) failed validation", errors.len());
                return AnalysisResult {
                    input: input.clone(),
                    mode,
                    errors,
                    findings: swap.into_iter().collect(),
                    report: None,
                };
            }
        };

        let (report, stage_findings) = self.run_stages(&measurement, mode);
        let findings: Vec<Finding> = swap
            .into_iter()
            .chain(extreme_values(&measurement, &self.params.extremes))
            .chain(stage_findings)
            .collect();
        log::debug!(
            "Analysis complete ({}): {}",
            mode.as_str(),
            report.classification.dominant_disorder
        );

        AnalysisResult {
            input: input.clone(),
            mode,
            errors: Vec::new(),
            findings,
            report: Some(report),
        }
    }

    fn run_stages(&self, m: &Measurement, mode: AnalysisMode) -> (AcidBaseReport, Vec<Finding>) {
        let params = &self.params;
        let advanced = mode == AnalysisMode::Advanced;

        let derived = derive_values(m, params.base_excess_preset, &params.thresholds);
        let sid = compute_sid_layers(m);
        let effective = advanced.then(|| compute_effective_sid(m, derived.hco3.used, &sid.full));

        let effects = decompose(m, sid.simple, derived.be.used, &params.reference);
        let gap = anion_gap(m, derived.hco3.used, &params.reference);
        let ratio = cl_na_ratio(m.na, m.cl);
        let sig = effective.as_ref().map(|e| e.sig);

        let compensation = assess_compensation(
            m.ph,
            m.pco2,
            derived.hco3.used,
            derived.be.used,
            &params.reference,
            &params.thresholds,
        );
        let ranking = rank_mechanisms(&effects, derived.be.used, sig, &params.thresholds);
        let classification = classify(
            m.pco2,
            m.lactate,
            &effects,
            sig,
            &params.reference,
            &params.thresholds,
        );

        let interpretations = summarize(
            SummaryInputs {
                measurement: m,
                effects: &effects,
                sid_full: sid.full.value,
                sig,
                advanced,
            },
            &params.reference,
            &params.thresholds,
        );
        let missing_params = missing_params(m, &sid, effective.as_ref());
        let findings = collect_findings(
            m,
            &derived,
            &missing_params,
            effective.as_ref(),
            &params.thresholds,
        );

        let narrative = narrative::generate(&NarrativeContext {
            measurement: m,
            derived: &derived,
            sid: &sid,
            effective: effective.as_ref(),
            effects: &effects,
            anion_gap: &gap,
            cl_na_ratio: ratio,
            compensation: &compensation,
            ranking: &ranking,
            classification: &classification,
            params,
        });

        let report = AcidBaseReport {
            derived,
            sid,
            effective,
            effects,
            anion_gap: gap,
            cl_na_ratio: ratio,
            compensation,
            ranking,
            classification,
            interpretations,
            missing_params,
            narrative,
        };
        (report, findings)
    }
}

/// Albumin and lactate always; advanced mode adds the SIDa and SIDe gaps
fn missing_params(m: &Measurement, sid: &SidLayers, effective: Option<&EffectiveSid>) -> Vec<Analyte> {
    let mut missing = Vec::new();
    if m.albumin_gl.is_none() {
        missing.push(Analyte::AlbuminGl);
    }
    if m.lactate.is_none() {
        missing.push(Analyte::Lactate);
    }
    if let Some(effective) = effective {
        for analyte in sid.full.missing.iter().chain(effective.missing.iter()) {
            if !missing.contains(analyte) {
                missing.push(*analyte);
            }
        }
    }
    missing
}

fn collect_findings(
    m: &Measurement,
    derived: &DerivedValues,
    missing: &[Analyte],
    effective: Option<&EffectiveSid>,
    thresholds: &ClinicalThresholds,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    // Albumin and lactate lead, as on the input form
    for field in [Analyte::AlbuminGl, Analyte::Lactate] {
        if missing.contains(&field) {
            findings.push(Finding::MissingParameter { field });
        }
    }

    if let (Some(manual), Some(difference)) = (m.hco3, derived.hco3.mismatch_mEq) {
        findings.push(Finding::Hco3Mismatch {
            manual,
            calculated: derived.hco3.calculated,
            difference,
            threshold: thresholds.hco3_mismatch_mEq,
        });
    }
    if let (Some(manual), Some(difference)) = (m.be, derived.be.mismatch_mEq) {
        findings.push(Finding::BeMismatch {
            manual,
            calculated: derived.be.calculated,
            difference,
            threshold: thresholds.be_mismatch_mEq,
        });
    }

    for field in missing {
        if !matches!(field, Analyte::AlbuminGl | Analyte::Lactate) {
            findings.push(Finding::MissingParameter { field: *field });
        }
    }

    if let Some(effective) = effective {
        if effective.sig_reliability != SigReliability::Reliable {
            findings.push(Finding::SigReliability {
                reliability: effective.sig_reliability,
            });
        }
    }

    findings
}

/// Analyse with default parameters
pub fn analyze(input: &MeasurementInput, mode: AnalysisMode) -> AnalysisResult {
    StewartAnalyzer::default().analyze(input, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Rejection;
    use crate::chemistry::{DisorderTag, DominantDisorder};

    #[test]
    fn test_normal_panel() {
        let input = MeasurementInput::new(7.40, 40.0, 140.0, 100.0)
            .with_lactate(1.0)
            .with_albumin_gl(40.0);
        let result = analyze(&input, AnalysisMode::Quick);
        assert!(result.is_valid());
        assert!(result.findings.is_empty());
        let report = result.report.unwrap();
        assert_eq!(report.sid.simple, 40.0);
        assert_eq!(report.dominant_disorder(), DominantDisorder::Normal);
        assert!(report.effective.is_none());
    }

    #[test]
    fn test_rejection_has_no_report() {
        let mut input = MeasurementInput::new(7.40, 40.0, 140.0, 100.0);
        input.cl = None;
        let result = analyze(&input, AnalysisMode::Advanced);
        assert!(!result.is_valid());
        assert!(result.report.is_none());
        assert!(result.findings.is_empty());
        assert_eq!(result.errors, vec![Rejection::Missing { field: Analyte::Cl }]);
    }

    #[test]
    fn test_finding_order() {
        let input = MeasurementInput::new(7.40, 40.0, 140.0, 100.0).with_hco3(30.0);
        let result = analyze(&input, AnalysisMode::Advanced);
        let codes: Vec<_> = result.findings.iter().map(|f| f.code()).collect();
        assert_eq!(
            codes,
            vec![
                "MISSING_ALBUMIN_GL",
                "MISSING_LACTATE",
                "HCO3_MISMATCH",
                "MISSING_K",
                "MISSING_CA",
                "MISSING_MG",
                "MISSING_PO4",
                "SIG_UNDERESTIMATED",
            ]
        );
    }

    #[test]
    fn test_screening_findings_lead() {
        // Na and Cl look transposed; lactate is high but accepted
        let input = MeasurementInput::new(7.40, 40.0, 102.0, 140.0)
            .with_lactate(8.0)
            .with_albumin_gl(40.0);
        let result = analyze(&input, AnalysisMode::Quick);
        assert!(result.is_valid());
        let codes: Vec<_> = result.findings.iter().map(|f| f.code()).collect();
        assert_eq!(
            codes,
            vec!["NA_CL_SWAP_HIGH", "CRITICAL_NA_LOW", "CRITICAL_CL_HIGH", "SEVERE_LACTATE_HIGH"]
        );
        // Never swapped
        assert_eq!(result.input.na, Some(102.0));
        assert_eq!(result.report.unwrap().sid.simple, -38.0);
    }

    #[test]
    fn test_rejected_panel_keeps_swap_suspicion() {
        // Na 90 fails the hard limit but the pair is still flagged
        let input = MeasurementInput::new(7.40, 40.0, 90.0, 136.0);
        let result = analyze(&input, AnalysisMode::Quick);
        assert!(!result.is_valid());
        let codes: Vec<_> = result.findings.iter().map(|f| f.code()).collect();
        assert_eq!(codes, vec!["NA_CL_SWAP_HIGH"]);
    }

    #[test]
    fn test_advanced_adds_effective_layer() {
        let input = MeasurementInput::new(7.40, 40.0, 140.0, 100.0)
            .with_k(4.0)
            .with_ca(1.2)
            .with_mg(0.8)
            .with_lactate(1.0)
            .with_albumin_gl(40.0)
            .with_po4(1.0);
        let result = analyze(&input, AnalysisMode::Advanced);
        let report = result.report.unwrap();
        let effective = report.effective.as_ref().unwrap();
        assert_eq!(effective.sig_reliability, SigReliability::Reliable);
        assert!(report.missing_params.is_empty());
        assert!(result.findings.is_empty());
        // SIDa 45.0 against SIDe 36.9
        assert_eq!(report.sig(), Some(8.1));
        assert!(report.classification.contains(DisorderTag::Hagma));
    }
}
