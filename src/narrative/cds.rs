use serde::Serialize;

use super::catalog::{NoteCategory, CDS_RULES};
use super::NarrativeContext;

/// One decision-support note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CdsNote {
    pub category: NoteCategory,
    pub condition: &'static str,
    pub explanation: String,
    pub candidate_mechanisms: Vec<&'static str>,
    pub references: Vec<&'static str>,
}

/// Evaluate the note catalog; notes come out in catalog order
pub fn cds_notes(ctx: &NarrativeContext<'_>) -> Vec<CdsNote> {
    CDS_RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .map(|rule| CdsNote {
            category: rule.category,
            condition: rule.condition,
            explanation: (rule.explanation)(ctx),
            candidate_mechanisms: rule.mechanisms.to_vec(),
            references: rule.references.to_vec(),
        })
        .collect()
}
