//! Non-diagnostic explanatory text.
//!
//! Generated last, from the finished stage outputs. The wording lives in
//! `catalog`; the generators only evaluate the tables in order.

pub mod catalog;
mod cds;
mod classic;
mod headline;

pub use catalog::{MissedByClassic, NoteCategory};
pub use cds::{cds_notes, CdsNote};
pub use classic::{classic_comparison, ClassicComparison};
pub use headline::{headline, Headline, NO_DOMINANT_MECHANISM};

use serde::Serialize;

use crate::analysis::Measurement;
use crate::chemistry::{
    AnionGap, CompensationAssessment, ComponentEffects, DerivedValues, DisorderClassification,
    EffectiveSid, MechanismRanking, SidLayers,
};
use crate::config::Parameters;

/// Borrowed view of every stage the generators may read
#[derive(Debug, Clone, Copy)]
pub struct NarrativeContext<'a> {
    pub measurement: &'a Measurement,
    pub derived: &'a DerivedValues,
    pub sid: &'a SidLayers,
    /// Present in advanced mode only
    pub effective: Option<&'a EffectiveSid>,
    pub effects: &'a ComponentEffects,
    pub anion_gap: &'a AnionGap,
    pub cl_na_ratio: f64,
    pub compensation: &'a CompensationAssessment,
    pub ranking: &'a MechanismRanking,
    pub classification: &'a DisorderClassification,
    pub params: &'a Parameters,
}

impl NarrativeContext<'_> {
    pub fn advanced(&self) -> bool {
        self.effective.is_some()
    }

    pub fn sig(&self) -> Option<f64> {
        self.effective.map(|e| e.sig)
    }
}

/// All generated text for one analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub headline: Headline,
    pub classic: ClassicComparison,
    pub cds_notes: Vec<CdsNote>,
}

pub fn generate(ctx: &NarrativeContext<'_>) -> Narrative {
    Narrative {
        headline: headline(ctx),
        classic: classic_comparison(ctx),
        cds_notes: cds_notes(ctx),
    }
}
