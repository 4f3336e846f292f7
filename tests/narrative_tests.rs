//! Narrative tests: headline, classic comparison and decision-support notes
//!
//! Each panel is chosen so a known set of catalog rules fires. Worked values
//! (SID effect, residual, SIG) are noted beside the panel.
//!
//! Reference anchors:
//! - Normal anion gap upper bound 12 mEq/L
//! - SIG above 2 mEq/L points to unmeasured anions (Kellum 1995)
//! - Albumin effect = 2.5 × (4.2 - albumin g/dL) (Fencl 2000)

use stewart_analyzer::narrative::catalog::CLASSIC_AGREES;
use stewart_analyzer::narrative::{MissedByClassic, NoteCategory, NO_DOMINANT_MECHANISM};
use stewart_analyzer::{analyze, AcidBaseReport, AnalysisMode, AnalysisResult, MeasurementInput};

fn report(result: &AnalysisResult) -> &AcidBaseReport {
    result
        .report
        .as_ref()
        .unwrap_or_else(|| panic!("expected a report, got errors {:?}", result.errors))
}

fn missed(input: &MeasurementInput, mode: AnalysisMode) -> Vec<MissedByClassic> {
    report(&analyze(input, mode))
        .narrative
        .classic
        .missed_by_classic
        .clone()
}

fn conditions(r: &AcidBaseReport) -> Vec<&'static str> {
    r.narrative.cds_notes.iter().map(|n| n.condition).collect()
}

fn categories(r: &AcidBaseReport) -> Vec<NoteCategory> {
    r.narrative.cds_notes.iter().map(|n| n.category).collect()
}

fn normal_panel() -> MeasurementInput {
    MeasurementInput::new(7.40, 40.0, 140.0, 100.0)
        .with_lactate(1.0)
        .with_albumin_gl(40.0)
}

/// SID effect -15.0, residual +4.2
fn hyperchloremic_panel() -> MeasurementInput {
    MeasurementInput::new(7.28, 30.0, 138.0, 115.0)
        .with_lactate(1.5)
        .with_albumin_gl(40.0)
}

/// BE -13.8, lactate -8.0, residual -8.3
fn lactic_panel() -> MeasurementInput {
    MeasurementInput::new(7.25, 28.0, 140.0, 100.0)
        .with_lactate(8.0)
        .with_albumin_gl(40.0)
}

/// Albumin effect +5.5, residual -7.0, BE -0.5
fn hypoalbuminemic_panel() -> MeasurementInput {
    MeasurementInput::new(7.40, 40.0, 140.0, 100.0)
        .with_lactate(1.0)
        .with_albumin_gl(20.0)
}

/// Complete advanced panel with a normal anion gap (corrected 11.6) and SIG 3.1
fn normal_gap_high_sig_panel() -> MeasurementInput {
    MeasurementInput::new(7.40, 40.0, 139.0, 104.0)
        .with_lactate(1.0)
        .with_albumin_gl(40.0)
        .with_k(4.0)
        .with_ca(1.2)
        .with_mg(0.8)
        .with_po4(1.0)
}

// ============================================================================
// Headline
// ============================================================================

#[test]
fn test_headline_without_dominant_mechanism() {
    let result = analyze(&normal_panel(), AnalysisMode::Quick);
    let headline = &report(&result).narrative.headline;

    assert_eq!(headline.dominant_mechanism, NO_DOMINANT_MECHANISM);
    assert_eq!(headline.dominant_percent, None);
    assert!(headline.significant_mechanisms.is_empty());
    assert!(headline.contributing_mechanisms.is_empty());
    assert_eq!(headline.pattern_note, None);
    assert!(
        headline.respiratory_status.contains("within the reference range"),
        "respiratory status: {}",
        headline.respiratory_status
    );
}

#[test]
fn test_headline_names_dominant_mechanism() {
    let result = analyze(&hyperchloremic_panel(), AnalysisMode::Quick);
    let headline = &report(&result).narrative.headline;

    assert!(
        headline.dominant_mechanism.starts_with("Reduced SID"),
        "dominant: {}",
        headline.dominant_mechanism
    );
    assert_eq!(headline.dominant_percent, Some(100.0));
    // Residual +4.2 of 15.0 is 28%
    assert_eq!(headline.significant_mechanisms.len(), 1);
}

#[test]
fn test_headline_pattern_note_prefers_masked_acidosis() {
    let result = analyze(&hypoalbuminemic_panel(), AnalysisMode::Quick);
    let note = report(&result).narrative.headline.pattern_note;
    assert_eq!(
        note,
        Some("Low albumin is raising BE; an acidifying process may be partly hidden.")
    );
}

// ============================================================================
// Classic comparison
// ============================================================================

#[test]
fn test_classic_agrees_on_normal_panel() {
    let result = analyze(&normal_panel(), AnalysisMode::Advanced);
    let classic = &report(&result).narrative.classic;
    assert!(classic.missed_by_classic.is_empty());
    assert!(classic.differences.is_empty());
    assert_eq!(classic.summary, CLASSIC_AGREES);
}

#[test]
fn test_low_sid_with_normal_buffers() {
    // HCO3 24 and BE 0 look normal; SID effect is -4.0 and the residual +4.5
    let input = MeasurementInput::new(7.40, 40.0, 140.0, 106.0)
        .with_lactate(1.0)
        .with_albumin_gl(40.0)
        .with_hco3(24.0)
        .with_be(0.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let classic = &report(&result).narrative.classic;

    assert_eq!(
        classic.missed_by_classic,
        vec![
            MissedByClassic::LowSidWithNormalBuffers,
            MissedByClassic::OpposingEffects
        ]
    );
    assert_eq!(classic.differences.len(), 2);
    assert!(classic.differences[0].contains("4.0 mEq/L below normal"));
    assert!(classic.summary.contains("adds 2 findings"));
}

#[test]
fn test_albumin_masking() {
    assert_eq!(
        missed(&hypoalbuminemic_panel(), AnalysisMode::Quick),
        vec![MissedByClassic::AlbuminMasking, MissedByClassic::OpposingEffects]
    );
}

#[test]
fn test_opposing_effects_alone() {
    // SID -15.0 against a +4.2 residual; HCO3 13.6 is clearly abnormal
    assert_eq!(
        missed(&hyperchloremic_panel(), AnalysisMode::Quick),
        vec![MissedByClassic::OpposingEffects]
    );
}

#[test]
fn test_normal_gap_high_sig_needs_advanced_mode() {
    let advanced = analyze(&normal_gap_high_sig_panel(), AnalysisMode::Advanced);
    let r = report(&advanced);
    assert_eq!(r.anion_gap.corrected, Some(11.6));
    assert_eq!(r.sig(), Some(3.1));
    assert!(r
        .narrative
        .classic
        .missed_by_classic
        .contains(&MissedByClassic::NormalAnionGapHighSig));

    let quick = missed(&normal_gap_high_sig_panel(), AnalysisMode::Quick);
    assert!(!quick.contains(&MissedByClassic::NormalAnionGapHighSig));
}

#[test]
fn test_summary_counts_findings() {
    let single = analyze(&hyperchloremic_panel(), AnalysisMode::Quick);
    assert_eq!(
        report(&single).narrative.classic.summary,
        "Stewart analysis adds one finding that classic HCO₃⁻/BE/AG reasoning would miss."
    );

    // SID -3.0 against a +3.0 residual: three rules fire in advanced mode
    let triple = analyze(&normal_gap_high_sig_panel(), AnalysisMode::Advanced);
    let classic = &report(&triple).narrative.classic;
    assert_eq!(
        classic.missed_by_classic,
        vec![
            MissedByClassic::LowSidWithNormalBuffers,
            MissedByClassic::NormalAnionGapHighSig,
            MissedByClassic::OpposingEffects
        ]
    );
    assert!(classic.summary.contains("adds 3 findings"));
}

// ============================================================================
// Decision-support notes: order and categories
// ============================================================================

#[test]
fn test_notes_follow_catalog_order() {
    let result = analyze(&hyperchloremic_panel(), AnalysisMode::Quick);
    let r = report(&result);

    assert_eq!(
        conditions(r),
        vec![
            "SID low",
            "High Cl/Na ratio",
            "Opposing mechanisms",
            "Hyperchloremic pattern"
        ]
    );
    assert_eq!(
        categories(r),
        vec![NoteCategory::A, NoteCategory::A, NoteCategory::B, NoteCategory::C]
    );
}

#[test]
fn test_notes_carry_mechanisms_and_references() {
    let result = analyze(&hyperchloremic_panel(), AnalysisMode::Quick);
    for note in &report(&result).narrative.cds_notes {
        assert!(!note.explanation.is_empty(), "{} has no text", note.condition);
        assert!(!note.candidate_mechanisms.is_empty(), "{}", note.condition);
        assert!(!note.references.is_empty(), "{}", note.condition);
    }
}

#[test]
fn test_normal_panel_has_no_notes() {
    let result = analyze(&normal_panel(), AnalysisMode::Quick);
    assert!(report(&result).narrative.cds_notes.is_empty());
}

// ============================================================================
// Decision-support notes: one panel per trigger family
// ============================================================================

#[test]
fn test_strong_ion_family_low() {
    let result = analyze(&hyperchloremic_panel(), AnalysisMode::Quick);
    let notes = &report(&result).narrative.cds_notes;

    let sid_low = &notes[0];
    assert!(sid_low.explanation.contains("15.0 below the usual 38"), "{}", sid_low.explanation);
    let pattern = notes
        .iter()
        .find(|n| n.condition == "Hyperchloremic pattern")
        .expect("hyperchloremic pattern note");
    assert!(pattern.explanation.contains("100%"), "{}", pattern.explanation);
}

#[test]
fn test_strong_ion_family_high() {
    // Na - Cl = 50: SID effect +12.0 carries the whole alkalosis
    let input = MeasurementInput::new(7.50, 45.0, 145.0, 95.0)
        .with_lactate(1.0)
        .with_albumin_gl(40.0);
    let result = analyze(&input, AnalysisMode::Quick);
    let r = report(&result);

    assert_eq!(conditions(r), vec!["SID high", "Hypochloremic pattern"]);
    assert_eq!(categories(r), vec![NoteCategory::A, NoteCategory::C]);
}

#[test]
fn test_unmeasured_anion_family() {
    let result = analyze(&lactic_panel(), AnalysisMode::Quick);
    let r = report(&result);

    assert_eq!(
        conditions(r),
        vec!["Unmeasured anions", "Lactate pattern", "Unmeasured anion pattern"]
    );
    assert_eq!(
        categories(r),
        vec![NoteCategory::A, NoteCategory::C, NoteCategory::C]
    );

    let notes = &r.narrative.cds_notes;
    // Quick mode: evidence comes from the residual, not SIG
    assert!(notes[0].explanation.starts_with("8.3 mEq/L"), "{}", notes[0].explanation);
    assert!(notes[1].explanation.contains("Lactate 8.0"), "{}", notes[1].explanation);
    assert!(
        notes[2].explanation.contains("largest share") && notes[2].explanation.contains("51%"),
        "{}",
        notes[2].explanation
    );
}

#[test]
fn test_raised_sig_without_unmeasured_dominance() {
    // Lactate 12 dominates (68%); SIG is 10.8 in advanced mode
    let input = MeasurementInput::new(7.20, 30.0, 140.0, 100.0)
        .with_lactate(12.0)
        .with_albumin_gl(40.0)
        .with_k(4.0)
        .with_ca(1.2)
        .with_mg(0.8)
        .with_po4(1.0);
    let result = analyze(&input, AnalysisMode::Advanced);
    let r = report(&result);

    assert_eq!(r.sig(), Some(10.8));
    assert!(r.ranking.flags.lactate_dominant);
    assert!(!r.ranking.flags.unmeasured_anion_dominant);

    // Lactate leads, so the single-parameter unmeasured-anion note stays quiet
    assert!(!conditions(r).contains(&"Unmeasured anions"));
    let pattern = r
        .narrative
        .cds_notes
        .iter()
        .find(|n| n.condition == "Unmeasured anion pattern")
        .expect("raised SIG still reports the pattern");
    assert!(pattern.explanation.contains("SIG is 10.8"), "{}", pattern.explanation);
    assert!(!pattern.explanation.contains("largest share"), "{}", pattern.explanation);
}

#[test]
fn test_negative_sig_family() {
    // SIDa 34.0 against SIDe 36.9
    let input = MeasurementInput::new(7.40, 40.0, 140.0, 111.0)
        .with_lactate(1.0)
        .with_albumin_gl(40.0)
        .with_k(4.0)
        .with_ca(1.2)
        .with_mg(0.8)
        .with_po4(1.0);
    let result = analyze(&input, AnalysisMode::Advanced);
    let r = report(&result);

    assert_eq!(r.sig(), Some(-2.9));
    let note = r
        .narrative
        .cds_notes
        .iter()
        .find(|n| n.condition == "SIG negative")
        .expect("negative SIG note");
    assert_eq!(note.category, NoteCategory::A);

    let quick = analyze(&input, AnalysisMode::Quick);
    assert!(!conditions(report(&quick)).contains(&"SIG negative"));
}

#[test]
fn test_albumin_masking_family() {
    let result = analyze(&hypoalbuminemic_panel(), AnalysisMode::Quick);
    let r = report(&result);

    assert_eq!(
        conditions(r),
        vec![
            "Low albumin",
            "Opposing mechanisms",
            "Acidosis masked by low albumin",
            "Unmeasured anion pattern"
        ]
    );
    assert_eq!(
        categories(r),
        vec![NoteCategory::A, NoteCategory::B, NoteCategory::B, NoteCategory::C]
    );
    let low_albumin = &r.narrative.cds_notes[0];
    assert!(
        low_albumin.explanation.contains("2.0 g/dL") && low_albumin.explanation.contains("5.5"),
        "{}",
        low_albumin.explanation
    );
}
