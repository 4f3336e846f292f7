//! Acid-base chemistry stages.
//!
//! Each submodule is a pure function of the previous stage's output. Nothing
//! here reads configuration files or logs; thresholds come in as arguments.

pub mod classifier;
pub mod compensation;
pub mod components;
pub mod derived;
pub mod dominance;
pub mod effective;
pub mod interpret;
pub mod sid;

pub use classifier::{classify, DisorderClassification, DisorderTag, DominantDisorder};
pub use compensation::{assess_compensation, CompensationAssessment, CompensationStatus, PrimaryDisorder};
pub use components::{AnionGap, ComponentEffect, ComponentEffects, ComponentKind, Direction};
pub use derived::{derive_values, DerivedPair, DerivedValues, ValueSource};
pub use dominance::{rank_mechanisms, ContributionLevel, MechanismContribution, MechanismRanking, PatternFlags};
pub use effective::{EffectiveSid, SigReliability};
pub use interpret::{Reading, Severity};
pub use sid::{BasicSid, BasicSidStatus, Completeness, FullSid, SidLayers};

/// Round half away from zero to `decimals` places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    // Adding 0.0 turns -0.0 into 0.0
    (value * factor).round() / factor + 0.0
}

/// Cl/Na ratio to three decimals
pub fn cl_na_ratio(na: f64, cl: f64) -> f64 {
    round_to(cl / na, 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(23.94, 1), 23.9);
        assert_eq!(round_to(-7.35, 0), -7.0);
        assert_eq!(round_to(36.9856, 1), 37.0);
    }

    #[test]
    fn test_round_to_never_returns_negative_zero() {
        assert!(round_to(-0.0, 1).is_sign_positive());
        assert!(round_to(-0.04, 1).is_sign_positive());
        assert_eq!(round_to(-0.04, 1).to_string(), "0");
    }

    #[test]
    fn test_cl_na_ratio() {
        assert_eq!(cl_na_ratio(140.0, 100.0), 0.714);
        assert_eq!(cl_na_ratio(138.0, 115.0), 0.833);
    }
}
