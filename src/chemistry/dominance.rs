//! Mechanism dominance ranking.
//!
//! Material components are expressed as a share of the metabolic
//! disturbance they have to explain, then bucketed into levels. Shares are
//! not capped: under masking, opposing mechanisms can each exceed 100 %.

use serde::Serialize;

use super::components::{ComponentEffect, ComponentEffects, ComponentKind, Direction};
use super::round_to;
use crate::config::ClinicalThresholds;

/// Contribution level, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionLevel {
    Minimal,
    Contributing,
    Significant,
    Dominant,
}

impl ContributionLevel {
    /// Generic bar: ≥50 dominant, ≥25 significant, ≥10 contributing
    pub fn generic(percent: f64) -> Self {
        if percent >= 50.0 {
            ContributionLevel::Dominant
        } else if percent >= 25.0 {
            ContributionLevel::Significant
        } else if percent >= 10.0 {
            ContributionLevel::Contributing
        } else {
            ContributionLevel::Minimal
        }
    }

    /// Lactate bar: any measurable share counts as contributing
    pub fn lactate(percent: f64) -> Self {
        if percent >= 50.0 {
            ContributionLevel::Dominant
        } else if percent >= 25.0 {
            ContributionLevel::Significant
        } else if percent > 0.0 {
            ContributionLevel::Contributing
        } else {
            ContributionLevel::Minimal
        }
    }

    pub fn for_kind(kind: ComponentKind, percent: f64) -> Self {
        match kind {
            ComponentKind::Lactate => Self::lactate(percent),
            _ => Self::generic(percent),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContributionLevel::Minimal => "minimal",
            ContributionLevel::Contributing => "contributing",
            ContributionLevel::Significant => "significant",
            ContributionLevel::Dominant => "dominant",
        }
    }
}

/// One ranked component
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MechanismContribution {
    pub component: ComponentEffect,
    pub contribution_percent: f64,
    pub level: ContributionLevel,
}

/// Pattern flags derived from the ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatternFlags {
    pub unmeasured_anion_dominant: bool,
    pub hyperchloremic_pattern: bool,
    pub lactate_dominant: bool,
    pub lactate_significant: bool,
    pub sig_elevated: bool,
    /// Material acidifying and alkalinizing totals at the same time
    pub masking_present: bool,
    /// Low albumin alongside a material acidifying total
    pub masked_acidosis_risk: bool,
}

impl PatternFlags {
    pub fn any(&self) -> bool {
        self.unmeasured_anion_dominant
            || self.hyperchloremic_pattern
            || self.lactate_dominant
            || self.lactate_significant
            || self.sig_elevated
            || self.masking_present
            || self.masked_acidosis_risk
    }
}

/// Ranking of material mechanisms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanismRanking {
    /// Descending contribution; ties keep the component order
    pub contributions: Vec<MechanismContribution>,
    pub dominant: Option<MechanismContribution>,
    pub total_reference_mEq: f64,
    pub acidosis_total_mEq: f64,
    pub alkalosis_total_mEq: f64,
    pub flags: PatternFlags,
}

impl MechanismRanking {
    /// Non-dominant entries at `level`
    pub fn at_level(&self, level: ContributionLevel) -> impl Iterator<Item = &MechanismContribution> {
        let dominant_kind = self.dominant.map(|d| d.component.kind);
        self.contributions
            .iter()
            .filter(move |c| c.level == level && Some(c.component.kind) != dominant_kind)
    }

    pub fn level_of(&self, kind: ComponentKind) -> Option<ContributionLevel> {
        self.contributions
            .iter()
            .find(|c| c.component.kind == kind)
            .map(|c| c.level)
    }
}

fn direction_total(components: &[ComponentEffect], direction: Direction) -> f64 {
    components
        .iter()
        .filter(|c| c.direction == direction)
        .map(|c| c.magnitude_mEq)
        .sum()
}

/// The disturbance the components are measured against
pub fn total_reference(be: f64, acidosis_total: f64, alkalosis_total: f64, materiality: f64) -> f64 {
    if be.abs() < materiality {
        acidosis_total.max(alkalosis_total)
    } else if be < 0.0 {
        be.abs().max(acidosis_total)
    } else {
        be.abs().max(alkalosis_total)
    }
}

/// Rank the material mechanisms of a decomposition.
pub fn rank_mechanisms(
    effects: &ComponentEffects,
    be: f64,
    sig: Option<f64>,
    thresholds: &ClinicalThresholds,
) -> MechanismRanking {
    let materiality = thresholds.materiality_mEq;
    let components = effects.material(materiality);
    let acidosis_total = direction_total(&components, Direction::Acidosis);
    let alkalosis_total = direction_total(&components, Direction::Alkalosis);
    let total = total_reference(be, acidosis_total, alkalosis_total, materiality);

    let mut contributions: Vec<MechanismContribution> = components
        .into_iter()
        .filter(|_| total > 0.0)
        .map(|component| {
            let percent = round_to(component.magnitude_mEq / total * 100.0, 1);
            MechanismContribution {
                component,
                contribution_percent: percent,
                level: ContributionLevel::for_kind(component.kind, percent),
            }
        })
        .collect();
    contributions.sort_by(|a, b| b.contribution_percent.total_cmp(&a.contribution_percent));

    let mut ranking = MechanismRanking {
        contributions,
        dominant: None,
        total_reference_mEq: round_to(total, 1),
        acidosis_total_mEq: round_to(acidosis_total, 1),
        alkalosis_total_mEq: round_to(alkalosis_total, 1),
        flags: PatternFlags::default(),
    };

    if total <= materiality {
        return ranking;
    }

    let mut dominant = ranking
        .contributions
        .iter()
        .find(|c| c.level == ContributionLevel::Dominant)
        .or_else(|| ranking.contributions.first())
        .copied();

    // Net alkaline BE with an acidifying winner means the acidosis is masked
    if be >= 0.0 && dominant.is_some_and(|d| d.component.direction == Direction::Acidosis) {
        if let Some(alkaline) = ranking
            .contributions
            .iter()
            .find(|c| c.component.direction == Direction::Alkalosis)
        {
            dominant = Some(*alkaline);
        }
    }

    let dominant_kind = dominant.map(|d| d.component.kind);
    for c in ranking.contributions.iter_mut() {
        if c.level == ContributionLevel::Dominant && Some(c.component.kind) != dominant_kind {
            c.level = ContributionLevel::Significant;
        }
    }
    ranking.dominant = dominant;
    ranking.flags = pattern_flags(&ranking, sig, thresholds);
    ranking
}

fn pattern_flags(ranking: &MechanismRanking, sig: Option<f64>, thresholds: &ClinicalThresholds) -> PatternFlags {
    let materiality = thresholds.materiality_mEq;
    let dominant = ranking.dominant.map(|d| d.component);
    let is_dominant = |kind: ComponentKind, direction: Direction| {
        dominant.is_some_and(|d| d.kind == kind && d.direction == direction)
    };
    let at_least_significant = |kind: ComponentKind, direction: Direction| {
        ranking.contributions.iter().any(|c| {
            c.component.kind == kind
                && c.component.direction == direction
                && c.level >= ContributionLevel::Significant
        })
    };
    let albumin_alkalosis = ranking
        .contributions
        .iter()
        .any(|c| c.component.kind == ComponentKind::Albumin && c.component.direction == Direction::Alkalosis);

    PatternFlags {
        unmeasured_anion_dominant: is_dominant(ComponentKind::Unmeasured, Direction::Acidosis),
        hyperchloremic_pattern: at_least_significant(ComponentKind::StrongIon, Direction::Acidosis),
        lactate_dominant: is_dominant(ComponentKind::Lactate, Direction::Acidosis),
        lactate_significant: at_least_significant(ComponentKind::Lactate, Direction::Acidosis),
        sig_elevated: sig.is_some_and(|s| s > thresholds.sig_mEq),
        masking_present: ranking.acidosis_total_mEq > materiality && ranking.alkalosis_total_mEq > materiality,
        masked_acidosis_risk: albumin_alkalosis && ranking.acidosis_total_mEq > materiality,
    }
}
