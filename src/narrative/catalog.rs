//! Rule tables for generated text.
//!
//! Every rule is a predicate over the analysis plus a renderer. Tables are
//! evaluated in the order written here and nothing else decides which text
//! appears, so wording can change without touching the generator.

use super::NarrativeContext;
use crate::chemistry::{ComponentKind, Direction, DisorderTag};

// References
pub const STEWART_1983: &str = "Stewart PA. Can J Physiol Pharmacol. 1983;61:1444-1461";
pub const FIGGE_1992: &str = "Figge J, Mydosh T, Fencl V. J Lab Clin Med. 1992;120:713-719";
pub const KELLUM_1995: &str = "Kellum JA, Kramer DJ, Pinsky MR. J Crit Care. 1995;10:51-55";
pub const FENCL_2000: &str = "Fencl V, et al. Am J Respir Crit Care Med. 2000;162:2246-2251";
pub const STORY_2004: &str = "Story DA, Morimatsu H, Bellomo R. Br J Anaesth. 2004;92:54-60";
pub const KRAUT_2012: &str = "Kraut JA, Madias NE. Nat Rev Nephrol. 2012;8:589-601";

// ---------------------------------------------------------------------------
// Headline pattern notes
// ---------------------------------------------------------------------------

pub struct PatternNoteRule {
    pub applies: fn(&NarrativeContext<'_>) -> bool,
    pub text: &'static str,
}

/// First match becomes the headline pattern note
pub static PATTERN_NOTES: &[PatternNoteRule] = &[
    PatternNoteRule {
        applies: |c| c.ranking.flags.masked_acidosis_risk,
        text: "Low albumin is raising BE; an acidifying process may be partly hidden.",
    },
    PatternNoteRule {
        applies: |c| c.ranking.flags.masking_present,
        text: "Acidifying and alkalinizing mechanisms are present at the same time and partly cancel.",
    },
    PatternNoteRule {
        applies: |c| c.ranking.flags.unmeasured_anion_dominant,
        text: "Most of the change is not explained by the measured ions, pointing to unmeasured anions.",
    },
    PatternNoteRule {
        applies: |c| c.ranking.flags.lactate_dominant,
        text: "Lactate accounts for most of the metabolic change.",
    },
    PatternNoteRule {
        applies: |c| c.ranking.flags.hyperchloremic_pattern,
        text: "The pattern follows a reduced strong ion difference (chloride relative to sodium).",
    },
    PatternNoteRule {
        applies: |c| c.ranking.flags.sig_elevated,
        text: "The strong ion gap is raised, consistent with unmeasured anions.",
    },
];

// ---------------------------------------------------------------------------
// Classic comparison
// ---------------------------------------------------------------------------

/// What classic HCO3/BE/AG reasoning would overlook
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissedByClassic {
    LowSidWithNormalBuffers,
    AlbuminMasking,
    NormalAnionGapHighSig,
    OpposingEffects,
}

impl MissedByClassic {
    pub fn as_str(self) -> &'static str {
        match self {
            MissedByClassic::LowSidWithNormalBuffers => "low_sid_with_normal_buffers",
            MissedByClassic::AlbuminMasking => "albumin_masking",
            MissedByClassic::NormalAnionGapHighSig => "normal_anion_gap_high_sig",
            MissedByClassic::OpposingEffects => "opposing_effects",
        }
    }
}

pub struct ClassicRule {
    pub tag: MissedByClassic,
    /// Needs SIG, so only runs in advanced mode
    pub requires_advanced: bool,
    pub applies: fn(&NarrativeContext<'_>) -> bool,
    pub render: fn(&NarrativeContext<'_>) -> String,
}

pub static CLASSIC_RULES: &[ClassicRule] = &[
    ClassicRule {
        tag: MissedByClassic::LowSidWithNormalBuffers,
        requires_advanced: false,
        applies: |c| {
            let t = &c.params.thresholds;
            c.params.reference.hco3_normal_mEq.contains(c.derived.hco3.used)
                && c.derived.be.used.abs() <= t.materiality_mEq
                && c.effects.sid_effect < -t.materiality_mEq
        },
        render: |c| {
            format!(
                "HCO₃⁻ ({:.1}) and BE ({:+.1}) look normal, but SID is {:.1} mEq/L below normal.",
                c.derived.hco3.used, c.derived.be.used, -c.effects.sid_effect
            )
        },
    },
    ClassicRule {
        tag: MissedByClassic::AlbuminMasking,
        requires_advanced: false,
        applies: |c| {
            let t = &c.params.thresholds;
            c.effects.albumin_effect.is_some_and(|a| a > t.materiality_mEq)
                && c.ranking.acidosis_total_mEq > t.materiality_mEq
        },
        render: |c| {
            format!(
                "Low albumin adds {:+.1} mEq/L to BE and offsets {:.1} mEq/L of acidifying effects.",
                c.effects.albumin_effect.unwrap_or_default(),
                c.ranking.acidosis_total_mEq
            )
        },
    },
    ClassicRule {
        tag: MissedByClassic::NormalAnionGapHighSig,
        requires_advanced: true,
        applies: |c| {
            let gap = c.anion_gap.corrected.unwrap_or(c.anion_gap.value);
            gap <= c.params.reference.anion_gap_upper_mEq
                && c.sig().is_some_and(|s| s > c.params.thresholds.sig_mEq)
        },
        render: |c| {
            format!(
                "The anion gap is within range ({:.1}), yet SIG is {:.1} mEq/L.",
                c.anion_gap.corrected.unwrap_or(c.anion_gap.value),
                c.sig().unwrap_or_default()
            )
        },
    },
    ClassicRule {
        tag: MissedByClassic::OpposingEffects,
        requires_advanced: false,
        applies: |c| c.ranking.flags.masking_present,
        render: |c| {
            format!(
                "Acidifying ({:.1} mEq/L) and alkalinizing ({:.1} mEq/L) effects partly cancel; BE shows only the net.",
                c.ranking.acidosis_total_mEq, c.ranking.alkalosis_total_mEq
            )
        },
    },
];

pub const CLASSIC_AGREES: &str = "Classic and Stewart readings point the same way for this sample.";

pub fn classic_summary(missed: usize) -> String {
    match missed {
        0 => CLASSIC_AGREES.to_string(),
        1 => "Stewart analysis adds one finding that classic HCO₃⁻/BE/AG reasoning would miss.".to_string(),
        n => format!("Stewart analysis adds {n} findings that classic HCO₃⁻/BE/AG reasoning would miss."),
    }
}

// ---------------------------------------------------------------------------
// Clinical decision-support notes
// ---------------------------------------------------------------------------

/// A: single parameter, B: masking, C: pattern cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum NoteCategory {
    A,
    B,
    C,
}

pub struct CdsRule {
    pub category: NoteCategory,
    pub condition: &'static str,
    pub applies: fn(&NarrativeContext<'_>) -> bool,
    pub explanation: fn(&NarrativeContext<'_>) -> String,
    pub mechanisms: &'static [&'static str],
    pub references: &'static [&'static str],
}

fn unmeasured_anion_evidence(c: &NarrativeContext<'_>) -> bool {
    let t = &c.params.thresholds;
    match c.sig() {
        Some(sig) => sig > t.sig_mEq,
        None => c.effects.residual_effect < -t.materiality_mEq,
    }
}

fn has_tag(c: &NarrativeContext<'_>, tag: DisorderTag) -> bool {
    c.classification.contains(tag)
}

pub static CDS_RULES: &[CdsRule] = &[
    CdsRule {
        category: NoteCategory::A,
        condition: "SID low",
        applies: |c| c.effects.sid_effect < -c.params.thresholds.materiality_mEq,
        explanation: |c| {
            format!(
                "Na⁺ − Cl⁻ is {:.1} mEq/L, {:.1} below the usual {:.0}. A smaller strong ion difference acidifies plasma.",
                c.sid.simple,
                -c.effects.sid_effect,
                c.params.reference.sid_simple_mEq
            )
        },
        mechanisms: &["Chloride gain relative to sodium", "Free-water excess"],
        references: &[STEWART_1983, STORY_2004],
    },
    CdsRule {
        category: NoteCategory::A,
        condition: "SID high",
        applies: |c| c.effects.sid_effect > c.params.thresholds.materiality_mEq,
        explanation: |c| {
            format!(
                "Na⁺ − Cl⁻ is {:.1} mEq/L, {:.1} above the usual {:.0}. A larger strong ion difference alkalinizes plasma.",
                c.sid.simple,
                c.effects.sid_effect,
                c.params.reference.sid_simple_mEq
            )
        },
        mechanisms: &["Chloride loss relative to sodium", "Free-water deficit"],
        references: &[STEWART_1983, STORY_2004],
    },
    CdsRule {
        category: NoteCategory::A,
        condition: "Unmeasured anions",
        applies: |c| {
            unmeasured_anion_evidence(c)
                && c.derived.be.used < -c.params.thresholds.materiality_mEq
                && !c.ranking.flags.lactate_dominant
        },
        explanation: |c| match c.sig() {
            Some(sig) => format!(
                "SIG is {sig:.1} mEq/L: measured strong ions leave a charge gap that unmeasured anions would fill."
            ),
            None => format!(
                "{:.1} mEq/L of the base deficit is not explained by SID, albumin or lactate.",
                -c.effects.residual_effect
            ),
        },
        mechanisms: &["Ketoanions", "Uremic anions", "Exogenous organic acids"],
        references: &[KELLUM_1995, FENCL_2000],
    },
    CdsRule {
        category: NoteCategory::A,
        condition: "SIG negative",
        applies: |c| c.sig().is_some_and(|s| s < -c.params.thresholds.sig_mEq),
        explanation: |c| {
            format!(
                "SIG is {:.1} mEq/L. A negative gap suggests unmeasured cations or a measurement offset.",
                c.sig().unwrap_or_default()
            )
        },
        mechanisms: &["Unmeasured cations", "Analyzer offset between electrolytes"],
        references: &[KELLUM_1995],
    },
    CdsRule {
        category: NoteCategory::A,
        condition: "Low albumin",
        applies: |c| {
            c.effects
                .albumin_effect
                .is_some_and(|a| a > c.params.thresholds.materiality_mEq)
        },
        explanation: |c| {
            format!(
                "Albumin {:.1} g/dL lowers the weak-acid load and raises BE by about {:.1} mEq/L.",
                c.measurement.albumin_g_per_dL().unwrap_or_default(),
                c.effects.albumin_effect.unwrap_or_default()
            )
        },
        mechanisms: &["Reduced albumin synthesis", "Albumin loss", "Dilution"],
        references: &[FIGGE_1992, FENCL_2000],
    },
    CdsRule {
        category: NoteCategory::A,
        condition: "High Cl/Na ratio",
        applies: |c| c.cl_na_ratio > c.params.thresholds.cl_na_ratio_high,
        explanation: |c| {
            format!(
                "Cl⁻/Na⁺ is {:.3}, above {:.2}; chloride is high relative to sodium.",
                c.cl_na_ratio, c.params.thresholds.cl_na_ratio_high
            )
        },
        mechanisms: &["Chloride-rich fluids", "Bicarbonate loss with chloride retention"],
        references: &[STORY_2004],
    },
    CdsRule {
        category: NoteCategory::B,
        condition: "Opposing mechanisms",
        applies: |c| c.ranking.flags.masking_present,
        explanation: |c| {
            format!(
                "{:.1} mEq/L of acidifying and {:.1} mEq/L of alkalinizing effects coexist; the net BE understates both.",
                c.ranking.acidosis_total_mEq, c.ranking.alkalosis_total_mEq
            )
        },
        mechanisms: &["Concurrent processes acting in opposite directions"],
        references: &[FENCL_2000],
    },
    CdsRule {
        category: NoteCategory::B,
        condition: "Acidosis masked by low albumin",
        applies: |c| c.ranking.flags.masked_acidosis_risk,
        explanation: |_| {
            "The alkalinizing effect of low albumin can bring BE and HCO₃⁻ toward normal while an acidifying process persists."
                .to_string()
        },
        mechanisms: &["Hypoalbuminemia offsetting a metabolic acidosis"],
        references: &[FIGGE_1992, FENCL_2000],
    },
    CdsRule {
        category: NoteCategory::C,
        condition: "Hyperchloremic pattern",
        applies: |c| {
            c.ranking.flags.hyperchloremic_pattern && has_tag(c, DisorderTag::HyperchloremicAcidosis)
        },
        explanation: |c| {
            format!(
                "A reduced SID carries {} of the metabolic change.",
                share(c, ComponentKind::StrongIon, Direction::Acidosis)
            )
        },
        mechanisms: &[
            "Large-volume chloride-rich fluid",
            "Gastrointestinal bicarbonate loss",
            "Renal tubular acidification defect",
        ],
        references: &[STORY_2004, KRAUT_2012],
    },
    CdsRule {
        category: NoteCategory::C,
        condition: "Lactate pattern",
        applies: |c| c.ranking.flags.lactate_significant,
        explanation: |c| {
            format!(
                "Lactate {:.1} mmol/L carries {} of the metabolic change.",
                c.measurement.lactate.unwrap_or_default(),
                share(c, ComponentKind::Lactate, Direction::Acidosis)
            )
        },
        mechanisms: &[
            "Tissue hypoperfusion",
            "Increased glycolytic production",
            "Reduced hepatic clearance",
        ],
        references: &[KRAUT_2012],
    },
    CdsRule {
        category: NoteCategory::C,
        condition: "Unmeasured anion pattern",
        applies: |c| c.ranking.flags.unmeasured_anion_dominant || c.ranking.flags.sig_elevated,
        explanation: |c| {
            if c.ranking.flags.unmeasured_anion_dominant {
                format!(
                    "Unexplained anions make up the largest share of the acidifying effect ({}).",
                    share(c, ComponentKind::Unmeasured, Direction::Acidosis)
                )
            } else {
                format!(
                    "SIG is {:.1} mEq/L, above {:.1}: unmeasured anions add to the acidifying effect without leading it.",
                    c.sig().unwrap_or_default(),
                    c.params.thresholds.sig_mEq
                )
            }
        },
        mechanisms: &["Ketoacids", "Retained renal anions", "Toxic alcohol metabolites"],
        references: &[KELLUM_1995, FENCL_2000],
    },
    CdsRule {
        category: NoteCategory::C,
        condition: "Hypochloremic pattern",
        applies: |c| has_tag(c, DisorderTag::HypochloremicAlkalosis),
        explanation: |c| {
            format!(
                "An increased SID ({:+.1} mEq/L) alkalinizes plasma.",
                c.effects.sid_effect
            )
        },
        mechanisms: &["Upper gastrointestinal chloride loss", "Chloride-wasting diuretics"],
        references: &[STEWART_1983, KRAUT_2012],
    },
];

fn share(c: &NarrativeContext<'_>, kind: ComponentKind, direction: Direction) -> String {
    c.ranking
        .contributions
        .iter()
        .find(|m| m.component.kind == kind && m.component.direction == direction)
        .map(|m| format!("{:.0}%", m.contribution_percent))
        .unwrap_or_else(|| "part".to_string())
}
