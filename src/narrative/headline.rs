use serde::Serialize;

use super::catalog::PATTERN_NOTES;
use super::NarrativeContext;
use crate::chemistry::compensation::PrimaryDisorder;
use crate::chemistry::interpret::interpret_pco2;
use crate::chemistry::{ContributionLevel, MechanismContribution};

pub const NO_DOMINANT_MECHANISM: &str = "No material metabolic mechanism";

/// One-glance summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub dominant_mechanism: String,
    pub dominant_percent: Option<f64>,
    pub significant_mechanisms: Vec<String>,
    pub contributing_mechanisms: Vec<String>,
    pub respiratory_status: String,
    pub pattern_note: Option<&'static str>,
}

fn describe(m: &MechanismContribution) -> String {
    format!(
        "{} ({:+.1} mEq/L, {:.0}%)",
        m.component.label, m.component.effect_mEq, m.contribution_percent
    )
}

fn respiratory_status(ctx: &NarrativeContext<'_>) -> String {
    if ctx.compensation.primary != PrimaryDisorder::None {
        return ctx.compensation.to_string();
    }
    let pco2 = ctx.measurement.pco2;
    let reading = interpret_pco2(pco2, &ctx.params.reference);
    if reading.is_normal() {
        format!("pCO₂ {pco2:.0} mmHg, within the reference range")
    } else {
        format!("pCO₂ {pco2:.0} mmHg: {}", reading.text.to_lowercase())
    }
}

pub fn headline(ctx: &NarrativeContext<'_>) -> Headline {
    let ranking = ctx.ranking;
    let (dominant_mechanism, dominant_percent) = match &ranking.dominant {
        Some(d) => (describe(d), Some(d.contribution_percent)),
        None => (NO_DOMINANT_MECHANISM.to_string(), None),
    };

    Headline {
        dominant_mechanism,
        dominant_percent,
        significant_mechanisms: ranking
            .at_level(ContributionLevel::Significant)
            .map(describe)
            .collect(),
        contributing_mechanisms: ranking
            .at_level(ContributionLevel::Contributing)
            .map(describe)
            .collect(),
        respiratory_status: respiratory_status(ctx),
        pattern_note: PATTERN_NOTES
            .iter()
            .find(|rule| (rule.applies)(ctx))
            .map(|rule| rule.text),
    }
}
