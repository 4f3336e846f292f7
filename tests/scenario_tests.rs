//! Clinical scenario tests for the full analysis pipeline
//!
//! Each case runs a complete panel through `StewartAnalyzer` and checks the
//! values a clinician would read off the report.
//!
//! Reference anchors:
//! - Normal Na - Cl = 38 mEq/L (Story 2004)
//! - Albumin effect = 2.5 × (4.2 - albumin g/dL) (Fencl 2000)
//! - Winters' formula: expected pCO2 = 1.5 × HCO3 + 8 ± 2

use stewart_analyzer::analysis::{
    ExtremeSeverity, ExtremeSide, Finding, FindingKind, Rejection, SwapConfidence,
};
use stewart_analyzer::chemistry::{
    CompensationStatus, ComponentKind, ContributionLevel, Direction, PrimaryDisorder,
    SigReliability, ValueSource,
};
use stewart_analyzer::{
    analyze, AcidBaseReport, AnalysisMode, AnalysisResult, Analyte, BaseExcessPreset,
    DisorderTag, DominantDisorder, MeasurementInput, Parameters, StewartAnalyzer,
};

fn report(result: &AnalysisResult) -> &AcidBaseReport {
    result
        .report
        .as_ref()
        .unwrap_or_else(|| panic!("expected a report, got errors {:?}", result.errors))
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{}: {:.2} (expected {:.2})",
        what,
        actual,
        expected
    );
}

fn normal_panel() -> MeasurementInput {
    MeasurementInput::new(7.40, 40.0, 140.0, 100.0)
        .with_lactate(1.0)
        .with_albumin_gl(40.0)
}

// ============================================================================
// Scenario 1: Normal panel
// ============================================================================

#[test]
fn test_normal_panel_is_normal() {
    let result = analyze(&normal_panel(), AnalysisMode::Quick);
    assert!(result.is_valid());

    let r = report(&result);
    assert_close(r.sid.simple, 40.0, "SID simple");
    assert_eq!(r.dominant_disorder(), DominantDisorder::Normal);
    assert!(r.classification.disorder_components.is_empty());
    assert!(r.ranking.dominant.is_none());
    assert_eq!(r.compensation.primary, PrimaryDisorder::None);
    assert_eq!(r.compensation.status, CompensationStatus::None);
}

#[test]
fn test_normal_panel_derived_values() {
    let result = analyze(&normal_panel(), AnalysisMode::Quick);
    let r = report(&result);

    assert_close(r.hco3_used(), 23.9, "HCO3");
    assert_eq!(r.derived.hco3.source, ValueSource::Calculated);
    assert_close(r.be_used(), -0.5, "BE");
    assert_close(r.effects.sid_effect, 2.0, "SID effect");
    assert_eq!(r.effects.albumin_effect, Some(0.5));
    assert_eq!(r.effects.lactate_effect, Some(-1.0));
    assert_close(r.effects.residual_effect, -2.0, "residual");
    assert!(r.missing_params.is_empty());
}

// ============================================================================
// Scenario 2: Hyperchloremic acidosis
// ============================================================================

#[test]
fn test_hyperchloremic_acidosis() {
    let input = MeasurementInput::new(7.28, 30.0, 138.0, 115.0)
        .with_lactate(1.5)
        .with_albumin_gl(40.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let r = report(&result);

    assert_close(r.sid.simple, 23.0, "SID simple");
    assert_close(r.effects.sid_effect, -15.0, "SID effect");
    assert!(r.classification.contains(DisorderTag::HyperchloremicAcidosis));

    let dominant = r.ranking.dominant.expect("a dominant mechanism");
    assert_eq!(dominant.component.kind, ComponentKind::StrongIon);
    assert_eq!(dominant.component.direction, Direction::Acidosis);
    assert!(r.ranking.flags.hyperchloremic_pattern);
}

#[test]
fn test_hyperchloremic_acidosis_high_cl_na_ratio() {
    let input = MeasurementInput::new(7.28, 30.0, 138.0, 115.0).with_albumin_gl(40.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let r = report(&result);

    // 115 / 138
    assert_close(r.cl_na_ratio, 0.833, "Cl/Na");
}

// ============================================================================
// Scenario 3: Lactic acidosis with respiratory compensation
// ============================================================================

#[test]
fn test_lactic_acidosis() {
    let input = MeasurementInput::new(7.25, 28.0, 140.0, 100.0)
        .with_lactate(8.0)
        .with_albumin_gl(40.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let r = report(&result);

    assert_eq!(r.effects.lactate_effect, Some(-8.0));
    assert!(r.classification.contains(DisorderTag::LacticAcidosis));

    let lactate = r
        .ranking
        .level_of(ComponentKind::Lactate)
        .expect("lactate is material");
    assert!(lactate >= ContributionLevel::Significant, "lactate level {:?}", lactate);
    assert!(r.ranking.flags.lactate_significant);
}

#[test]
fn test_lactic_acidosis_shares_and_classification() {
    let input = MeasurementInput::new(7.25, 28.0, 140.0, 100.0)
        .with_lactate(8.0)
        .with_albumin_gl(40.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let r = report(&result);

    assert_close(r.hco3_used(), 11.9, "HCO3");
    assert_close(r.be_used(), -13.8, "BE");
    assert_close(r.effects.residual_effect, -8.3, "residual");
    assert_close(r.ranking.total_reference_mEq, 16.3, "total reference");

    // Unexplained anions edge out lactate: 8.3 of 16.3 against 8.0
    let dominant = r.ranking.dominant.expect("a dominant mechanism");
    assert_eq!(dominant.component.kind, ComponentKind::Unmeasured);
    assert_eq!(dominant.component.direction, Direction::Acidosis);
    assert_close(dominant.contribution_percent, 50.9, "residual share");
    assert_eq!(
        r.ranking.level_of(ComponentKind::Lactate),
        Some(ContributionLevel::Significant)
    );

    assert_eq!(
        r.classification.disorder_components,
        vec![
            DisorderTag::RespiratoryAlkalosis,
            DisorderTag::LacticAcidosis,
            DisorderTag::Hagma
        ]
    );
    assert_eq!(r.dominant_disorder(), DominantDisorder::Triple);
    assert_eq!(r.compensation.primary, PrimaryDisorder::MetabolicAcidosis);
}

// ============================================================================
// Scenario 4: Hypoalbuminemia
// ============================================================================

#[test]
fn test_hypoalbuminemic_alkalosis() {
    let input = MeasurementInput::new(7.40, 40.0, 140.0, 100.0)
        .with_lactate(1.0)
        .with_albumin_gl(20.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let r = report(&result);

    assert_eq!(r.effects.albumin_effect, Some(5.5));
    assert!(r.classification.contains(DisorderTag::HypoalbuminemicAlkalosis));
    assert!(r.anion_gap.corrected.is_some());
}

#[test]
fn test_hypoalbuminemia_hides_unmeasured_anions() {
    // Normal BE, but albumin is pushing it up by 5.5 mEq/L
    let input = MeasurementInput::new(7.40, 40.0, 140.0, 100.0)
        .with_lactate(1.0)
        .with_albumin_gl(20.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let r = report(&result);

    assert_close(r.effects.residual_effect, -7.0, "residual");
    assert!(r.classification.contains(DisorderTag::Hagma));
    assert!(r.ranking.flags.masking_present);
    assert!(r.narrative.headline.pattern_note.is_some());
}

// ============================================================================
// Scenario 5: Rejected input
// ============================================================================

#[test]
fn test_missing_chloride_is_rejected() {
    let mut input = normal_panel();
    input.cl = None;
    let result = analyze(&input, AnalysisMode::Advanced);

    assert!(!result.is_valid());
    assert_eq!(result.errors, vec![Rejection::Missing { field: Analyte::Cl }]);
    assert!(result.report.is_none());
    assert!(result.findings.is_empty());
    assert!(!result.error_messages()[0].is_empty());
}

#[test]
fn test_every_violation_is_reported() {
    let mut input = MeasurementInput::new(8.20, 40.0, 140.0, 100.0).with_k(12.0);
    input.na = None;
    let result = analyze(&input, AnalysisMode::Quick);

    let fields: Vec<Analyte> = result.errors.iter().map(Rejection::field).collect();
    assert_eq!(fields.len(), 3, "errors: {:?}", result.error_messages());
    assert!(fields.contains(&Analyte::Ph));
    assert!(fields.contains(&Analyte::Na));
    assert!(fields.contains(&Analyte::K));
}

// ============================================================================
// Scenario 6: Manual HCO3 disagrees with Henderson-Hasselbalch
// ============================================================================

#[test]
fn test_manual_hco3_mismatch() {
    let input = normal_panel().with_hco3(30.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let r = report(&result);

    assert_close(r.hco3_used(), 30.0, "HCO3 used");
    assert_eq!(r.derived.hco3.source, ValueSource::Manual);
    assert_close(r.derived.hco3.calculated, 23.9, "HCO3 calculated");

    let mismatch = result
        .findings
        .iter()
        .find(|f| matches!(f, Finding::Hco3Mismatch { .. }))
        .expect("HCO3 mismatch finding");
    assert_eq!(mismatch.code(), "HCO3_MISMATCH");
}

#[test]
fn test_manual_hco3_within_threshold() {
    let input = normal_panel().with_hco3(25.0);
    let result = analyze(&input, AnalysisMode::Quick);
    assert!(result
        .findings
        .iter()
        .all(|f| !matches!(f, Finding::Hco3Mismatch { .. })));
}

// ============================================================================
// Data review: suspected Na/Cl swap and extreme values
// ============================================================================

#[test]
fn test_suspected_swap_is_flagged_not_swapped() {
    for (na, cl) in [(102.0, 140.0), (100.0, 140.0)] {
        let result = analyze(&MeasurementInput::new(7.40, 40.0, na, cl), AnalysisMode::Quick);
        assert!(result.is_valid(), "Na {na} / Cl {cl} should still be analysed");
        assert_eq!(result.input.na, Some(na));
        assert_eq!(result.input.cl, Some(cl));
        assert_close(report(&result).sid.simple, na - cl, "SID simple");

        match result.findings.first() {
            Some(Finding::SwapSuspicion { confidence, .. }) => {
                assert_eq!(*confidence, SwapConfidence::High)
            }
            other => panic!("expected a swap suspicion first, got {:?}", other),
        }
    }
}

#[test]
fn test_medium_and_low_swap_confidence() {
    let medium = analyze(&MeasurementInput::new(7.40, 40.0, 112.0, 133.0), AnalysisMode::Quick);
    assert!(medium.findings.iter().any(|f| f.code() == "NA_CL_SWAP_MEDIUM"));

    let low = analyze(&MeasurementInput::new(7.40, 40.0, 121.0, 124.0), AnalysisMode::Quick);
    assert!(low.findings.iter().any(|f| f.code() == "NA_CL_SWAP_LOW"));

    let plain = analyze(&normal_panel(), AnalysisMode::Quick);
    assert!(plain.findings.iter().all(|f| f.kind() != FindingKind::Plausibility));
}

#[test]
fn test_extreme_values_are_accepted_with_warnings() {
    let input = MeasurementInput::new(7.05, 40.0, 140.0, 100.0)
        .with_lactate(12.0)
        .with_albumin_gl(18.0)
        .with_k(2.9);
    let result = analyze(&input, AnalysisMode::Quick);
    assert!(result.is_valid());

    let extremes: Vec<(Analyte, ExtremeSeverity, ExtremeSide)> = result
        .findings
        .iter()
        .filter_map(|f| match f {
            Finding::ExtremeValue {
                field,
                severity,
                side,
                ..
            } => Some((*field, *severity, *side)),
            _ => None,
        })
        .collect();
    assert_eq!(
        extremes,
        vec![
            (Analyte::Ph, ExtremeSeverity::Critical, ExtremeSide::Low),
            (Analyte::Lactate, ExtremeSeverity::Critical, ExtremeSide::High),
            (Analyte::K, ExtremeSeverity::Severe, ExtremeSide::Low),
            (Analyte::AlbuminGl, ExtremeSeverity::Severe, ExtremeSide::Low),
        ]
    );
}

#[test]
fn test_hard_limit_still_rejects_beyond_extreme_bands() {
    let result = analyze(&MeasurementInput::new(6.70, 40.0, 140.0, 100.0), AnalysisMode::Quick);
    assert!(!result.is_valid());
    assert!(result.findings.iter().all(|f| f.kind() != FindingKind::ExtremeValue));
}

// ============================================================================
// Advanced mode
// ============================================================================

#[test]
fn test_advanced_full_panel() {
    let input = normal_panel().with_k(4.0).with_ca(1.2).with_mg(0.8).with_po4(1.0);
    let result = analyze(&input, AnalysisMode::Advanced);
    let r = report(&result);

    let effective = r.effective.as_ref().expect("advanced mode computes SIDe");
    assert_close(r.sid.full.value, 45.0, "SIDa");
    assert_close(effective.sid_effective, 36.9, "SIDe");
    assert_eq!(r.sig(), Some(8.1));
    assert_eq!(effective.sig_reliability, SigReliability::Reliable);
    assert!(r.classification.contains(DisorderTag::Hagma));
}

#[test]
fn test_quick_mode_has_no_effective_sid() {
    let result = analyze(&normal_panel(), AnalysisMode::Quick);
    let r = report(&result);
    assert!(r.effective.is_none());
    assert_eq!(r.sig(), None);
}

#[test]
fn test_missing_lactate_marks_sig_underestimated() {
    let input = MeasurementInput::new(7.40, 40.0, 140.0, 100.0).with_albumin_gl(40.0);
    let result = analyze(&input, AnalysisMode::Advanced);
    let r = report(&result);

    let effective = r.effective.as_ref().expect("SIDe");
    assert_eq!(effective.sig_reliability, SigReliability::Underestimated);
    assert!(r.missing_params.contains(&Analyte::Lactate));
    assert!(result
        .findings
        .iter()
        .any(|f| f.code() == "SIG_UNDERESTIMATED"));
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_base_excess_preset_changes_be() {
    let input = MeasurementInput::new(7.25, 28.0, 140.0, 100.0).with_lactate(8.0);

    let sa = analyze(&input, AnalysisMode::Quick);
    let vs = StewartAnalyzer::new(
        Parameters::default().with_base_excess_preset(BaseExcessPreset::VanSlyke),
    )
    .analyze(&input, AnalysisMode::Quick);

    let be_sa = report(&sa).be_used();
    let be_vs = report(&vs).be_used();
    assert!(be_vs < be_sa, "Van Slyke BE {:.1} vs Siggaard-Andersen {:.1}", be_vs, be_sa);
}

#[test]
fn test_repeated_calls_are_identical() {
    let input = normal_panel().with_hco3(30.0).with_k(4.0);
    let analyzer = StewartAnalyzer::default();
    let first = analyzer.analyze(&input, AnalysisMode::Advanced);
    let second = analyzer.analyze(&input, AnalysisMode::Advanced);
    assert_eq!(first, second);
}
