//! Fencl-style decomposition of the metabolic Base Excess.
//!
//! Each measured mechanism gets a signed effect in mEq/L (negative pushes
//! toward acidosis). Whatever BE the measured mechanisms do not explain is
//! left in the residual, which stands in for SIG when SIDa/SIDe are not
//! available.
//!
//! References:
//! - Fencl V, Jabor A, Kazda A, Figge J. Am J Respir Crit Care Med. 2000;162:2246-2251
//! - Story DA, Morimatsu H, Bellomo R. Br J Anaesth. 2004;92:54-60

use serde::Serialize;

use super::round_to;
use crate::analysis::Measurement;
use crate::config::ReferenceValues;

/// mEq/L of albumin charge per g/dL below the reference
pub const ALBUMIN_EFFECT_PER_G_DL: f64 = 2.5;

/// mEq/L of BE per mmHg of pCO2 above the set point (informational)
pub const RESPIRATORY_EFFECT_PER_MMHG: f64 = 0.1;

/// Which way an effect pushes the pH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Acidosis,
    Alkalosis,
}

impl Direction {
    /// Direction of a signed effect; zero counts as alkalosis
    pub fn of(effect: f64) -> Self {
        if effect < 0.0 {
            Direction::Acidosis
        } else {
            Direction::Alkalosis
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Acidosis => "acidosis",
            Direction::Alkalosis => "alkalosis",
        }
    }
}

/// Metabolic mechanisms that can carry part of the BE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    StrongIon,
    Lactate,
    Albumin,
    Unmeasured,
}

impl ComponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::StrongIon => "strong_ion",
            ComponentKind::Lactate => "lactate",
            ComponentKind::Albumin => "albumin",
            ComponentKind::Unmeasured => "unmeasured",
        }
    }

    /// Mechanism description for a given direction
    pub fn describe(self, direction: Direction) -> &'static str {
        match (self, direction) {
            (ComponentKind::StrongIon, Direction::Acidosis) => "Reduced SID (relative chloride excess)",
            (ComponentKind::StrongIon, Direction::Alkalosis) => "Increased SID (relative chloride deficit)",
            (ComponentKind::Lactate, _) => "Lactate accumulation",
            (ComponentKind::Albumin, Direction::Alkalosis) => "Low albumin (reduced weak acid)",
            (ComponentKind::Albumin, Direction::Acidosis) => "High albumin (increased weak acid)",
            (ComponentKind::Unmeasured, Direction::Acidosis) => "Unmeasured anions",
            (ComponentKind::Unmeasured, Direction::Alkalosis) => "Unexplained alkalinizing residual",
        }
    }
}

/// One material mechanism
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentEffect {
    pub kind: ComponentKind,
    pub label: &'static str,
    /// Signed effect on BE (mEq/L)
    pub effect_mEq: f64,
    /// |effect| (mEq/L)
    pub magnitude_mEq: f64,
    pub direction: Direction,
}

impl ComponentEffect {
    pub fn new(kind: ComponentKind, effect_mEq: f64) -> Self {
        let direction = Direction::of(effect_mEq);
        Self {
            kind,
            label: kind.describe(direction),
            effect_mEq,
            magnitude_mEq: effect_mEq.abs(),
            direction,
        }
    }
}

/// Signed effects of every mechanism that could be computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentEffects {
    pub sid_effect: f64,
    pub albumin_effect: Option<f64>,
    pub lactate_effect: Option<f64>,
    pub residual_effect: f64,
    /// Informational; not part of the BE accounting
    pub respiratory_effect: f64,
}

impl ComponentEffects {
    /// Metabolic mechanisms with |effect| > `threshold`, in fixed kind order
    pub fn material(&self, threshold: f64) -> Vec<ComponentEffect> {
        [
            (ComponentKind::StrongIon, Some(self.sid_effect)),
            (ComponentKind::Lactate, self.lactate_effect),
            (ComponentKind::Albumin, self.albumin_effect),
            (ComponentKind::Unmeasured, Some(self.residual_effect)),
        ]
        .into_iter()
        .filter_map(|(kind, effect)| effect.map(|e| ComponentEffect::new(kind, e)))
        .filter(|c| c.magnitude_mEq > threshold)
        .collect()
    }
}

/// Classic anion gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnionGap {
    pub value: f64,
    /// Albumin-corrected gap, when albumin was measured
    pub corrected: Option<f64>,
}

/// SID_simple − normal SID
pub fn sid_effect(sid_simple: f64, reference: &ReferenceValues) -> f64 {
    round_to(sid_simple - reference.sid_simple_mEq, 1)
}

/// 2.5 × (4.2 − albumin g/dL); positive when albumin is low
pub fn albumin_effect(albumin_g_per_dL: f64, reference: &ReferenceValues) -> f64 {
    round_to(
        ALBUMIN_EFFECT_PER_G_DL * (reference.albumin_g_per_dL - albumin_g_per_dL),
        1,
    )
}

/// Each mmol/L of lactate is one mEq/L of acid
pub fn lactate_effect(lactate_mM: f64) -> f64 {
    round_to(-lactate_mM, 1)
}

/// BE left after removing the measured mechanisms that are present
pub fn residual_effect(
    be: f64,
    sid_effect: f64,
    albumin_effect: Option<f64>,
    lactate_effect: Option<f64>,
) -> f64 {
    let mut residual = be - sid_effect;
    if let Some(alb) = albumin_effect {
        residual -= alb;
    }
    if let Some(lac) = lactate_effect {
        residual -= lac;
    }
    round_to(residual, 1)
}

/// −0.1 × (pCO2 − 40)
pub fn respiratory_effect(pco2_mmHg: f64, reference: &ReferenceValues) -> f64 {
    round_to(
        -RESPIRATORY_EFFECT_PER_MMHG * (pco2_mmHg - reference.pco2_set_point_mmHg),
        1,
    )
}

/// Decompose BE for a measurement
pub fn decompose(
    m: &Measurement,
    sid_simple: f64,
    be_used: f64,
    reference: &ReferenceValues,
) -> ComponentEffects {
    let sid = sid_effect(sid_simple, reference);
    let albumin = m
        .albumin_g_per_dL()
        .map(|alb| albumin_effect(alb, reference));
    let lactate = m.lactate.map(lactate_effect);

    ComponentEffects {
        sid_effect: sid,
        albumin_effect: albumin,
        lactate_effect: lactate,
        residual_effect: residual_effect(be_used, sid, albumin, lactate),
        respiratory_effect: respiratory_effect(m.pco2, reference),
    }
}

/// AG = Na − (Cl + HCO3), corrected by 2.5 × (4.2 − albumin g/dL)
pub fn anion_gap(m: &Measurement, hco3_used: f64, reference: &ReferenceValues) -> AnionGap {
    let value = round_to(m.na - (m.cl + hco3_used), 1);
    let corrected = m.albumin_g_per_dL().map(|alb| {
        round_to(
            value + ALBUMIN_EFFECT_PER_G_DL * (reference.albumin_g_per_dL - alb),
            1,
        )
    });
    AnionGap { value, corrected }
}
