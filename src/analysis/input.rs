//! Measurement records at the input boundary.
//!
//! `MeasurementInput` is what callers hand in: every numeric field may be
//! absent so that a missing required value can be reported instead of
//! guessed. `Measurement` is the validated form the chemistry stages work on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every quantity that can appear on an input panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyte {
    Ph,
    Pco2,
    Na,
    Cl,
    Hco3,
    Be,
    K,
    Ca,
    Mg,
    Lactate,
    AlbuminGl,
    Po4,
}

impl Analyte {
    /// Fields without which no analysis is attempted
    pub const REQUIRED: [Analyte; 4] = [Analyte::Ph, Analyte::Pco2, Analyte::Na, Analyte::Cl];

    /// Flat-record key
    pub fn key(self) -> &'static str {
        match self {
            Analyte::Ph => "ph",
            Analyte::Pco2 => "pco2",
            Analyte::Na => "na",
            Analyte::Cl => "cl",
            Analyte::Hco3 => "hco3_input",
            Analyte::Be => "be_input",
            Analyte::K => "k",
            Analyte::Ca => "ca",
            Analyte::Mg => "mg",
            Analyte::Lactate => "lactate",
            Analyte::AlbuminGl => "albumin_gl",
            Analyte::Po4 => "po4",
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Analyte::Ph => "pH",
            Analyte::Pco2 => "pCO₂",
            Analyte::Na => "Na⁺",
            Analyte::Cl => "Cl⁻",
            Analyte::Hco3 => "HCO₃⁻",
            Analyte::Be => "BE",
            Analyte::K => "K⁺",
            Analyte::Ca => "Ca²⁺",
            Analyte::Mg => "Mg²⁺",
            Analyte::Lactate => "Lactate",
            Analyte::AlbuminGl => "Albumin",
            Analyte::Po4 => "Phosphate",
        }
    }

    /// Unit the value is expected in
    pub fn unit(self) -> &'static str {
        match self {
            Analyte::Ph => "",
            Analyte::Pco2 => "mmHg",
            Analyte::Hco3 | Analyte::Be => "mEq/L",
            Analyte::AlbuminGl => "g/L",
            _ => "mmol/L",
        }
    }
}

impl fmt::Display for Analyte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw measurement panel as supplied by the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementInput {
    pub ph: Option<f64>,
    /// mmHg
    pub pco2: Option<f64>,
    /// mmol/L
    pub na: Option<f64>,
    /// mmol/L
    pub cl: Option<f64>,
    /// Manually entered bicarbonate (mEq/L)
    pub hco3: Option<f64>,
    /// Manually entered base excess (mEq/L)
    pub be: Option<f64>,
    /// `be` was entered as a base deficit (positive number meaning negative BE)
    pub is_base_deficit: bool,
    pub k: Option<f64>,
    pub ca: Option<f64>,
    pub mg: Option<f64>,
    pub lactate: Option<f64>,
    /// g/L
    pub albumin_gl: Option<f64>,
    pub po4: Option<f64>,
}

impl MeasurementInput {
    /// Panel with the four required values set
    pub fn new(ph: f64, pco2: f64, na: f64, cl: f64) -> Self {
        Self {
            ph: Some(ph),
            pco2: Some(pco2),
            na: Some(na),
            cl: Some(cl),
            ..Default::default()
        }
    }

    pub fn with_hco3(mut self, hco3: f64) -> Self {
        self.hco3 = Some(hco3);
        self
    }

    pub fn with_be(mut self, be: f64) -> Self {
        self.be = Some(be);
        self.is_base_deficit = false;
        self
    }

    /// Base deficit entered as a positive number
    pub fn with_base_deficit(mut self, deficit: f64) -> Self {
        self.be = Some(deficit);
        self.is_base_deficit = true;
        self
    }

    pub fn with_k(mut self, k: f64) -> Self {
        self.k = Some(k);
        self
    }

    pub fn with_ca(mut self, ca: f64) -> Self {
        self.ca = Some(ca);
        self
    }

    pub fn with_mg(mut self, mg: f64) -> Self {
        self.mg = Some(mg);
        self
    }

    pub fn with_lactate(mut self, lactate: f64) -> Self {
        self.lactate = Some(lactate);
        self
    }

    pub fn with_albumin_gl(mut self, albumin_gl: f64) -> Self {
        self.albumin_gl = Some(albumin_gl);
        self
    }

    pub fn with_po4(mut self, po4: f64) -> Self {
        self.po4 = Some(po4);
        self
    }

    /// Value of a field, if present
    pub fn get(&self, analyte: Analyte) -> Option<f64> {
        match analyte {
            Analyte::Ph => self.ph,
            Analyte::Pco2 => self.pco2,
            Analyte::Na => self.na,
            Analyte::Cl => self.cl,
            Analyte::Hco3 => self.hco3,
            Analyte::Be => self.be,
            Analyte::K => self.k,
            Analyte::Ca => self.ca,
            Analyte::Mg => self.mg,
            Analyte::Lactate => self.lactate,
            Analyte::AlbuminGl => self.albumin_gl,
            Analyte::Po4 => self.po4,
        }
    }

    /// Set or clear a field
    pub fn set(&mut self, analyte: Analyte, value: Option<f64>) {
        let slot = match analyte {
            Analyte::Ph => &mut self.ph,
            Analyte::Pco2 => &mut self.pco2,
            Analyte::Na => &mut self.na,
            Analyte::Cl => &mut self.cl,
            Analyte::Hco3 => &mut self.hco3,
            Analyte::Be => &mut self.be,
            Analyte::K => &mut self.k,
            Analyte::Ca => &mut self.ca,
            Analyte::Mg => &mut self.mg,
            Analyte::Lactate => &mut self.lactate,
            Analyte::AlbuminGl => &mut self.albumin_gl,
            Analyte::Po4 => &mut self.po4,
        };
        *slot = value;
    }
}

/// Validated panel: required values are guaranteed present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub ph: f64,
    pub pco2: f64,
    pub na: f64,
    pub cl: f64,
    pub hco3: Option<f64>,
    /// Signed base excess; a base deficit has already been negated
    pub be: Option<f64>,
    pub k: Option<f64>,
    pub ca: Option<f64>,
    pub mg: Option<f64>,
    pub lactate: Option<f64>,
    pub albumin_gl: Option<f64>,
    pub po4: Option<f64>,
}

impl Measurement {
    /// Value of one analyte; BE is signed
    pub fn get(&self, analyte: Analyte) -> Option<f64> {
        match analyte {
            Analyte::Ph => Some(self.ph),
            Analyte::Pco2 => Some(self.pco2),
            Analyte::Na => Some(self.na),
            Analyte::Cl => Some(self.cl),
            Analyte::Hco3 => self.hco3,
            Analyte::Be => self.be,
            Analyte::K => self.k,
            Analyte::Ca => self.ca,
            Analyte::Mg => self.mg,
            Analyte::Lactate => self.lactate,
            Analyte::AlbuminGl => self.albumin_gl,
            Analyte::Po4 => self.po4,
        }
    }

    /// Albumin converted to g/dL
    pub fn albumin_g_per_dL(&self) -> Option<f64> {
        self.albumin_gl.map(|g_per_L| g_per_L / 10.0)
    }
}
