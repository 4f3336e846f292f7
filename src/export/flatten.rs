//! Flat key/value view of an analysis.
//!
//! Every result field maps to exactly one key, absent values become empty
//! strings and lists are joined with `|`. The input keys can be read back into
//! a `MeasurementInput`; derived keys are never re-imported.

use crate::analysis::{Analyte, AnalysisResult, MeasurementInput};

/// Separator for list-valued fields
pub const LIST_DELIMITER: &str = "|";

/// Input keys in column order
pub const INPUT_KEYS: &[&str] = &[
    "ph",
    "pco2",
    "na",
    "cl",
    "hco3_input",
    "be_input",
    "be_is_base_deficit",
    "k",
    "ca",
    "mg",
    "lactate",
    "albumin_gl",
    "po4",
];

/// Every key `flatten` emits, in column order
pub const FLAT_KEYS: &[&str] = &[
    "ph",
    "pco2",
    "na",
    "cl",
    "hco3_input",
    "be_input",
    "be_is_base_deficit",
    "k",
    "ca",
    "mg",
    "lactate",
    "albumin_gl",
    "po4",
    "mode",
    "is_valid",
    "errors",
    "hco3_calculated",
    "hco3_used",
    "hco3_source",
    "be_calculated",
    "be_used",
    "be_source",
    "sid_simple",
    "sid_basic",
    "sid_basic_status",
    "sid_full",
    "sid_full_status",
    "sid_full_missing",
    "sid_effective",
    "sid_effective_missing",
    "sig",
    "sig_reliability",
    "atot",
    "sid_effect",
    "albumin_effect",
    "lactate_effect",
    "residual_effect",
    "respiratory_effect",
    "anion_gap",
    "anion_gap_corrected",
    "cl_na_ratio",
    "primary_disorder",
    "compensation_status",
    "expected_pco2",
    "expected_hco3",
    "observed_expected_diff",
    "dominant_mechanism",
    "dominant_percent",
    "mechanism_contributions",
    "pattern_flags",
    "dominant_disorder",
    "disorder_components",
    "findings",
    "missing_params",
    "interpretations",
    "headline",
    "missed_by_classic",
    "classic_summary",
    "cds_conditions",
];

/// Error reading a flat record back into an input panel
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlatRecordError {
    #[error("{key}: '{value}' is not a number")]
    InvalidNumber { key: String, value: String },

    #[error("{key}: '{value}' is not a yes/no value")]
    InvalidFlag { key: String, value: String },
}

/// Ordered key/value record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    fields: Vec<(String, String)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record with every flat key present and empty
    pub fn blank() -> Self {
        let mut record = Self::new();
        for key in FLAT_KEYS {
            record.push(*key, String::new());
        }
        record
    }

    /// Append a field; a repeated key replaces the earlier value
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build from parallel header and value rows
    pub fn from_pairs<'a>(
        keys: impl IntoIterator<Item = &'a str>,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut record = Self::new();
        for (k, v) in keys.into_iter().zip(values) {
            record.push(k.trim(), v);
        }
        record
    }
}

fn num(value: f64) -> String {
    // `{}` prints the shortest representation that parses back to the same f64
    format!("{value}")
}

fn opt(value: Option<f64>) -> String {
    value.map(num).unwrap_or_default()
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(LIST_DELIMITER)
}

fn analytes(items: &[Analyte]) -> String {
    join(items.iter().map(|a| a.key()))
}

/// Flatten an analysis result
pub fn flatten(result: &AnalysisResult) -> FlatRecord {
    let mut r = FlatRecord::blank();
    let input = &result.input;

    for analyte in [Analyte::Ph, Analyte::Pco2, Analyte::Na, Analyte::Cl, Analyte::Hco3, Analyte::Be] {
        r.push(analyte.key(), opt(input.get(analyte)));
    }
    r.push("be_is_base_deficit", input.is_base_deficit.to_string());
    for analyte in [Analyte::K, Analyte::Ca, Analyte::Mg, Analyte::Lactate, Analyte::AlbuminGl, Analyte::Po4] {
        r.push(analyte.key(), opt(input.get(analyte)));
    }

    r.push("mode", result.mode.as_str());
    r.push("is_valid", result.is_valid().to_string());
    r.push("errors", join(result.error_messages()));
    r.push("findings", join(result.findings.iter().map(|f| f.code())));

    let Some(report) = &result.report else {
        return r;
    };

    let d = &report.derived;
    r.push("hco3_calculated", num(d.hco3.calculated));
    r.push("hco3_used", num(d.hco3.used));
    r.push("hco3_source", d.hco3.source.as_str());
    r.push("be_calculated", num(d.be.calculated));
    r.push("be_used", num(d.be.used));
    r.push("be_source", d.be.source.as_str());

    let sid = &report.sid;
    r.push("sid_simple", num(sid.simple));
    r.push("sid_basic", opt(sid.basic.value));
    r.push("sid_basic_status", sid.basic.status.as_str());
    r.push("sid_full", num(sid.full.value));
    r.push("sid_full_status", sid.full.status.as_str());
    r.push("sid_full_missing", analytes(&sid.full.missing));

    if let Some(e) = &report.effective {
        r.push("sid_effective", num(e.sid_effective));
        r.push("sid_effective_missing", analytes(&e.missing));
        r.push("sig", num(e.sig));
        r.push("sig_reliability", e.sig_reliability.as_str());
        r.push("atot", opt(e.atot));
    }

    let fx = &report.effects;
    r.push("sid_effect", num(fx.sid_effect));
    r.push("albumin_effect", opt(fx.albumin_effect));
    r.push("lactate_effect", opt(fx.lactate_effect));
    r.push("residual_effect", num(fx.residual_effect));
    r.push("respiratory_effect", num(fx.respiratory_effect));

    r.push("anion_gap", num(report.anion_gap.value));
    r.push("anion_gap_corrected", opt(report.anion_gap.corrected));
    r.push("cl_na_ratio", num(report.cl_na_ratio));

    let c = &report.compensation;
    r.push("primary_disorder", c.primary.as_str());
    r.push("compensation_status", c.status.as_str());
    r.push("expected_pco2", opt(c.expected_pco2_mmHg));
    r.push("expected_hco3", opt(c.expected_hco3_mEq));
    r.push("observed_expected_diff", opt(c.delta));

    let ranking = &report.ranking;
    if let Some(dominant) = &ranking.dominant {
        r.push("dominant_mechanism", dominant.component.kind.as_str());
        r.push("dominant_percent", num(dominant.contribution_percent));
    }
    r.push(
        "mechanism_contributions",
        join(ranking.contributions.iter().map(|m| {
            format!(
                "{}:{}:{}:{}",
                m.component.kind.as_str(),
                num(m.component.effect_mEq),
                num(m.contribution_percent),
                m.level.as_str()
            )
        })),
    );
    let flags = ranking.flags;
    r.push(
        "pattern_flags",
        join(
            [
                ("unmeasured_anion_dominant", flags.unmeasured_anion_dominant),
                ("hyperchloremic_pattern", flags.hyperchloremic_pattern),
                ("lactate_dominant", flags.lactate_dominant),
                ("lactate_significant", flags.lactate_significant),
                ("sig_elevated", flags.sig_elevated),
                ("masking_present", flags.masking_present),
                ("masked_acidosis_risk", flags.masked_acidosis_risk),
            ]
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| name),
        ),
    );

    r.push("dominant_disorder", report.classification.dominant_disorder.as_str());
    r.push(
        "disorder_components",
        join(report.classification.disorder_components.iter().map(|t| t.as_str())),
    );
    r.push("missing_params", analytes(&report.missing_params));
    r.push("interpretations", join(&report.interpretations));

    let n = &report.narrative;
    r.push("headline", n.headline.dominant_mechanism.as_str());
    r.push(
        "missed_by_classic",
        join(n.classic.missed_by_classic.iter().map(|m| m.as_str())),
    );
    r.push("classic_summary", n.classic.summary.as_str());
    r.push("cds_conditions", join(n.cds_notes.iter().map(|note| note.condition)));
    r
}

const ABSENT_MARKERS: &[&str] = &["", "nan", "none", "null", "-", "n/a"];

/// Parse a possibly messy numeric cell.
///
/// Whitespace is trimmed, a comma decimal separator is accepted and the usual
/// "no value" markers read as absent.
pub fn parse_number(key: &str, raw: &str) -> Result<Option<f64>, FlatRecordError> {
    let trimmed = raw.trim();
    if ABSENT_MARKERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(FlatRecordError::InvalidNumber {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, FlatRecordError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        _ => Err(FlatRecordError::InvalidFlag {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

impl MeasurementInput {
    /// Rebuild the input panel from a flat record.
    ///
    /// Missing keys read as absent values. `hco3` and `be` are accepted as
    /// aliases for the `_input` keys.
    pub fn from_flat(record: &FlatRecord) -> Result<Self, FlatRecordError> {
        let mut input = MeasurementInput::default();
        for analyte in [
            Analyte::Ph,
            Analyte::Pco2,
            Analyte::Na,
            Analyte::Cl,
            Analyte::Hco3,
            Analyte::Be,
            Analyte::K,
            Analyte::Ca,
            Analyte::Mg,
            Analyte::Lactate,
            Analyte::AlbuminGl,
            Analyte::Po4,
        ] {
            let key = analyte.key();
            let raw = record
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| record.get(key.trim_end_matches("_input")));
            if let Some(raw) = raw {
                input.set(analyte, parse_number(key, raw)?);
            }
        }
        if let Some(raw) = record.get("be_is_base_deficit") {
            input.is_base_deficit = parse_flag("be_is_base_deficit", raw)?;
        }
        Ok(input)
    }
}

impl TryFrom<&FlatRecord> for MeasurementInput {
    type Error = FlatRecordError;

    fn try_from(record: &FlatRecord) -> Result<Self, Self::Error> {
        Self::from_flat(record)
    }
}
