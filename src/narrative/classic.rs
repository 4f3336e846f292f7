use serde::Serialize;

use super::catalog::{classic_summary, MissedByClassic, CLASSIC_RULES};
use super::NarrativeContext;

/// What the Stewart reading adds over classic HCO3/BE/AG reasoning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassicComparison {
    pub differences: Vec<String>,
    pub missed_by_classic: Vec<MissedByClassic>,
    pub summary: String,
}

pub fn classic_comparison(ctx: &NarrativeContext<'_>) -> ClassicComparison {
    let advanced = ctx.advanced();
    let matched: Vec<_> = CLASSIC_RULES
        .iter()
        .filter(|rule| advanced || !rule.requires_advanced)
        .filter(|rule| (rule.applies)(ctx))
        .collect();

    ClassicComparison {
        differences: matched.iter().map(|rule| (rule.render)(ctx)).collect(),
        missed_by_classic: matched.iter().map(|rule| rule.tag).collect(),
        summary: classic_summary(matched.len()),
    }
}
