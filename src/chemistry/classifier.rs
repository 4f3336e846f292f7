//! Rule-based disorder classification.

use serde::{Serialize, Serializer};
use std::fmt;

use super::components::ComponentEffects;
use crate::config::{ClinicalThresholds, ReferenceValues};

/// Component disorders, in detection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisorderTag {
    RespiratoryAcidosis,
    RespiratoryAlkalosis,
    HyperchloremicAcidosis,
    HypochloremicAlkalosis,
    HypoalbuminemicAlkalosis,
    LacticAcidosis,
    Hagma,
}

impl DisorderTag {
    pub const ALL: [DisorderTag; 7] = [
        DisorderTag::RespiratoryAcidosis,
        DisorderTag::RespiratoryAlkalosis,
        DisorderTag::HyperchloremicAcidosis,
        DisorderTag::HypochloremicAlkalosis,
        DisorderTag::HypoalbuminemicAlkalosis,
        DisorderTag::LacticAcidosis,
        DisorderTag::Hagma,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DisorderTag::RespiratoryAcidosis => "respiratory_acidosis",
            DisorderTag::RespiratoryAlkalosis => "respiratory_alkalosis",
            DisorderTag::HyperchloremicAcidosis => "hyperchloremic_acidosis",
            DisorderTag::HypochloremicAlkalosis => "hypochloremic_alkalosis",
            DisorderTag::HypoalbuminemicAlkalosis => "hypoalbuminemic_alkalosis",
            DisorderTag::LacticAcidosis => "lactic_acidosis",
            DisorderTag::Hagma => "hagma",
        }
    }

    pub fn from_key(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for DisorderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall disorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominantDisorder {
    Normal,
    Single(DisorderTag),
    Mixed,
    Triple,
}

impl DominantDisorder {
    pub fn as_str(self) -> &'static str {
        match self {
            DominantDisorder::Normal => "normal",
            DominantDisorder::Single(tag) => tag.as_str(),
            DominantDisorder::Mixed => "mixed_disorder",
            DominantDisorder::Triple => "triple_disorder",
        }
    }
}

impl fmt::Display for DominantDisorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DominantDisorder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Classification output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisorderClassification {
    pub dominant_disorder: DominantDisorder,
    /// Triggering tags in detection order
    pub disorder_components: Vec<DisorderTag>,
}

impl DisorderClassification {
    pub fn contains(&self, tag: DisorderTag) -> bool {
        self.disorder_components.contains(&tag)
    }
}

/// Map component flags to the closed taxonomy.
///
/// Thresholds are strict: an effect of exactly 2 mEq/L raises no flag.
pub fn classify(
    pco2_mmHg: f64,
    lactate_mM: Option<f64>,
    effects: &ComponentEffects,
    sig: Option<f64>,
    reference: &ReferenceValues,
    thresholds: &ClinicalThresholds,
) -> DisorderClassification {
    let materiality = thresholds.materiality_mEq;
    let raised = |tag: DisorderTag| match tag {
        DisorderTag::RespiratoryAcidosis => pco2_mmHg > reference.pco2_normal_mmHg.max,
        DisorderTag::RespiratoryAlkalosis => pco2_mmHg < reference.pco2_normal_mmHg.min,
        DisorderTag::HyperchloremicAcidosis => effects.sid_effect < -materiality,
        DisorderTag::HypochloremicAlkalosis => effects.sid_effect > materiality,
        DisorderTag::HypoalbuminemicAlkalosis => {
            effects.albumin_effect.is_some_and(|a| a > materiality)
        }
        DisorderTag::LacticAcidosis => lactate_mM.is_some_and(|l| l > thresholds.lactate_mM),
        DisorderTag::Hagma => {
            effects.residual_effect < -materiality || sig.is_some_and(|s| s > thresholds.sig_mEq)
        }
    };

    let disorder_components: Vec<DisorderTag> =
        DisorderTag::ALL.into_iter().filter(|t| raised(*t)).collect();
    let dominant_disorder = match disorder_components.as_slice() {
        [] => DominantDisorder::Normal,
        [single] => DominantDisorder::Single(*single),
        [_, _] => DominantDisorder::Mixed,
        _ => DominantDisorder::Triple,
    };

    DisorderClassification {
        dominant_disorder,
        disorder_components,
    }
}
