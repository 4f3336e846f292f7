//! Parameter structures with citation metadata.
//!
//! Every clinical threshold and reference value carries its source.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the parameter file, relative to the working directory.
pub const DEFAULT_PARAMETER_PATH: &str = "data/parameters/analysis.json";

/// Top-level parameters container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Parameters {
    /// Hard limits outside which an input is rejected
    pub limits: PhysiologicLimits,
    /// Accepted-but-extreme bands that raise a warning finding
    pub extremes: ExtremeThresholds,
    /// Materiality and mismatch thresholds
    pub thresholds: ClinicalThresholds,
    /// Normal reference values used as "zero effect" anchors
    pub reference: ReferenceValues,
    /// Coefficient pair used for the Base Excess estimate
    pub base_excess_preset: BaseExcessPreset,
}

impl Parameters {
    /// Load parameters from the default JSON file, or use defaults if it doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_path(DEFAULT_PARAMETER_PATH)
    }

    /// Load parameters from a specific JSON file, falling back to defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("Loaded analysis parameters from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("Failed to parse analysis parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Analysis parameters file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Same parameters with a different Base Excess preset
    pub fn with_base_excess_preset(mut self, preset: BaseExcessPreset) -> Self {
        self.base_excess_preset = preset;
        self
    }
}

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Hard physiologic limits
///
/// Values outside these limits are treated as entry errors, not as
/// extreme physiology, and stop the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysiologicLimits {
    /// Arterial pH
    /// Source: survivable range, Kellum JA. Crit Care 2000;4:6-14
    pub ph: Range,
    /// pCO2 (mmHg)
    pub pco2_mmHg: Range,
    /// Sodium (mmol/L)
    pub na_mM: Range,
    /// Chloride (mmol/L)
    pub cl_mM: Range,
    /// Potassium (mmol/L)
    pub k_mM: Range,
    /// Ionized calcium (mmol/L)
    pub ca_mM: Range,
    /// Magnesium (mmol/L)
    pub mg_mM: Range,
    /// Lactate (mmol/L)
    pub lactate_mM: Range,
    /// Albumin (g/L)
    pub albumin_g_per_L: Range,
    /// Phosphate (mmol/L)
    pub po4_mM: Range,
    /// Manually entered bicarbonate (mEq/L)
    pub hco3_mEq: Range,
    /// Manually entered base excess (mEq/L)
    pub be_mEq: Range,
}

impl Default for PhysiologicLimits {
    fn default() -> Self {
        Self {
            ph: Range::new(6.80, 7.80),
            pco2_mmHg: Range::new(10.0, 120.0),
            na_mM: Range::new(100.0, 180.0),
            cl_mM: Range::new(70.0, 140.0),
            k_mM: Range::new(2.0, 8.0),
            ca_mM: Range::new(0.5, 2.5),
            mg_mM: Range::new(0.3, 3.0),
            lactate_mM: Range::new(0.0, 25.0),
            albumin_g_per_L: Range::new(5.0, 60.0),
            po4_mM: Range::new(0.3, 4.0),
            hco3_mEq: Range::new(5.0, 50.0),
            be_mEq: Range::new(-30.0, 30.0),
        }
    }
}

/// Warning bounds inside the hard limits
///
/// A value at or beyond a critical bound, or strictly beyond a severe bound,
/// is still analysed but raises a warning. `None` means no bound on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtremeBand {
    pub critical_low: Option<f64>,
    pub severe_low: Option<f64>,
    pub severe_high: Option<f64>,
    pub critical_high: Option<f64>,
}

impl ExtremeBand {
    pub const fn new(critical_low: f64, severe_low: f64, severe_high: f64, critical_high: f64) -> Self {
        Self {
            critical_low: Some(critical_low),
            severe_low: Some(severe_low),
            severe_high: Some(severe_high),
            critical_high: Some(critical_high),
        }
    }

    pub const fn high_only(severe_high: f64, critical_high: f64) -> Self {
        Self {
            critical_low: None,
            severe_low: None,
            severe_high: Some(severe_high),
            critical_high: Some(critical_high),
        }
    }

    pub const fn low_only(critical_low: f64, severe_low: f64) -> Self {
        Self {
            critical_low: Some(critical_low),
            severe_low: Some(severe_low),
            severe_high: None,
            critical_high: None,
        }
    }
}

/// Extreme-value warning bands per analyte
///
/// Critical bounds follow the laboratory critical-value lists surveyed in
/// Kost GJ. JAMA 1990;263:704-707, rounded to the units used here. Severe
/// bounds sit one step inside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtremeThresholds {
    pub ph: ExtremeBand,
    pub pco2_mmHg: ExtremeBand,
    pub na_mM: ExtremeBand,
    pub cl_mM: ExtremeBand,
    pub k_mM: ExtremeBand,
    /// Ionized calcium
    pub ca_mM: ExtremeBand,
    pub mg_mM: ExtremeBand,
    /// Source: lactate > 4 mmol/L as the septic shock marker,
    /// Rhodes A et al. Intensive Care Med 2017;43:304-377
    pub lactate_mM: ExtremeBand,
    pub albumin_g_per_L: ExtremeBand,
    pub po4_mM: ExtremeBand,
    /// Manually entered bicarbonate
    pub hco3_mEq: ExtremeBand,
}

impl Default for ExtremeThresholds {
    fn default() -> Self {
        Self {
            ph: ExtremeBand::new(7.10, 7.20, 7.60, 7.65),
            pco2_mmHg: ExtremeBand::new(20.0, 25.0, 60.0, 70.0),
            na_mM: ExtremeBand::new(120.0, 125.0, 155.0, 160.0),
            cl_mM: ExtremeBand::new(75.0, 85.0, 120.0, 130.0),
            k_mM: ExtremeBand::new(2.8, 3.0, 6.0, 6.2),
            ca_mM: ExtremeBand::new(0.78, 0.9, 1.45, 1.58),
            mg_mM: ExtremeBand::new(0.4, 0.5, 1.5, 2.0),
            lactate_mM: ExtremeBand::high_only(4.0, 10.0),
            albumin_g_per_L: ExtremeBand::low_only(15.0, 20.0),
            po4_mM: ExtremeBand::new(0.32, 0.5, 2.5, 2.9),
            hco3_mEq: ExtremeBand::new(10.0, 15.0, 35.0, 40.0),
        }
    }
}

/// Thresholds that decide when a number becomes a finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalThresholds {
    /// Smallest component effect treated as clinically material (mEq/L)
    /// Source: Fencl V et al. Am J Respir Crit Care Med 2000;162:2246-2251
    pub materiality_mEq: f64,

    /// Manual vs Henderson-Hasselbalch HCO3 mismatch (mEq/L)
    pub hco3_mismatch_mEq: f64,

    /// Manual vs calculated BE mismatch (mEq/L)
    pub be_mismatch_mEq: f64,

    /// Lactate above which lactic acidosis is flagged (mmol/L)
    pub lactate_mM: f64,

    /// |SIG| above which unmeasured ions are reported (mEq/L)
    /// Source: Kellum JA et al. J Crit Care 1995;10:51-55
    pub sig_mEq: f64,

    /// Tolerance band around expected compensation (mmHg or mEq/L)
    /// Source: Albert MS, Dell RB, Winters RW. Ann Intern Med 1967;66:312-322
    pub compensation_tolerance: f64,

    /// Cl/Na ratio above which a chloride-driven acidosis is suspected
    /// Source: Durward A et al. Pediatr Crit Care Med 2005;6:281-285
    pub cl_na_ratio_high: f64,

    /// Tolerance around the normal SIDa when reading its tendency (mEq/L)
    pub sid_tolerance_mEq: f64,
}

impl Default for ClinicalThresholds {
    fn default() -> Self {
        Self {
            materiality_mEq: 2.0,
            hco3_mismatch_mEq: 2.0,
            be_mismatch_mEq: 2.0,
            lactate_mM: 2.0,
            sig_mEq: 2.0,
            compensation_tolerance: 2.0,
            cl_na_ratio_high: 0.75,
            sid_tolerance_mEq: 2.0,
        }
    }
}

/// Normal reference values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceValues {
    /// Normal arterial pH interval
    pub ph_normal: Range,
    /// Normal pCO2 interval (mmHg)
    pub pco2_normal_mmHg: Range,
    /// pCO2 set point for compensation deltas (mmHg)
    pub pco2_set_point_mmHg: f64,
    /// HCO3 set point for respiratory compensation (mEq/L)
    pub hco3_set_point_mEq: f64,
    /// Normal HCO3 interval for the classic reading (mEq/L)
    pub hco3_normal_mEq: Range,
    /// Normal Na - Cl (mEq/L)
    /// Source: Story DA et al. Br J Anaesth 2004;92:54-60
    pub sid_simple_mEq: f64,
    /// Normal apparent SID (mEq/L)
    /// Source: Figge J et al. J Lab Clin Med 1992;120:713-719
    pub sid_full_mEq: f64,
    /// Albumin at which the albumin effect is zero (g/dL)
    /// Source: Fencl V et al. 2000
    pub albumin_g_per_dL: f64,
    /// Upper normal anion gap (mEq/L)
    pub anion_gap_upper_mEq: f64,
}

impl Default for ReferenceValues {
    fn default() -> Self {
        Self {
            ph_normal: Range::new(7.35, 7.45),
            pco2_normal_mmHg: Range::new(35.0, 45.0),
            pco2_set_point_mmHg: 40.0,
            hco3_set_point_mEq: 24.0,
            hco3_normal_mEq: Range::new(22.0, 26.0),
            // Story et al. 2004
            sid_simple_mEq: 38.0,
            // Figge et al. 1992
            sid_full_mEq: 40.0,
            // Fencl et al. 2000
            albumin_g_per_dL: 4.2,
            anion_gap_upper_mEq: 12.0,
        }
    }
}

/// Coefficient preset for `BE = c1 * (HCO3 - 24.4) + c2 * (pH - 7.40)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BaseExcessPreset {
    /// Van Slyke style pair {1.1, 32}
    VanSlyke,
    /// Siggaard-Andersen style pair {0.9287, 14.83}
    /// Source: Siggaard-Andersen O. Scand J Clin Lab Invest 1977;37(S146):15-20
    #[default]
    SiggaardAndersen,
}

impl BaseExcessPreset {
    /// (HCO3 coefficient, pH coefficient)
    pub fn coefficients(self) -> (f64, f64) {
        match self {
            BaseExcessPreset::VanSlyke => (1.1, 32.0),
            BaseExcessPreset::SiggaardAndersen => (0.9287, 14.83),
        }
    }
}
