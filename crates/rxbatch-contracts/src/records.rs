//! Spreadsheet-derived record types.
//!
//! Records are built once by a `RecordSource` and never mutated afterwards.
//! Every field a spreadsheet may omit is an `Option`; downstream code decides
//! what an absent field means for its own step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A loosely typed cell value.
///
/// Spreadsheets mix numeric and textual keys freely (`1`, `"1"`, `1.0`), so
/// formula references and formula ids keep whichever shape the cell had and
/// compare with [`CellValue::loosely_equals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Compare two values by string/number equivalence rather than by type.
    ///
    /// - text vs text: exact byte equality
    /// - number vs number: numeric equality
    /// - text vs number: the trimmed text is parsed as a number first; text
    ///   that is empty or not numeric never equals a number
    pub fn loosely_equals(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Number(a), CellValue::Number(b)) => a == b,
            (CellValue::Text(t), CellValue::Number(n)) | (CellValue::Number(n), CellValue::Text(t)) => {
                parse_loose_number(t).is_some_and(|parsed| parsed == *n)
            }
        }
    }

    /// Numeric view of the value, parsing text when it looks like a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(t) => parse_loose_number(t),
        }
    }
}

impl fmt::Display for CellValue {
    /// Integral numbers render without a decimal point (`12`, not `12.0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(t) => f.write_str(t),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

fn parse_loose_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// One row of the patients sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// 1-based spreadsheet row the record was read from (the header is row 1).
    pub row: usize,
    /// Free-text patient name, used as the remote search query.
    pub identity: Option<String>,
    /// Key into the formulas sheet.
    pub formula_ref: Option<CellValue>,
    /// Number of units, rendered as `X<quantity>` in the composed text.
    pub quantity: Option<u32>,
    /// Number of vials; only values above zero affect the composed text.
    pub vial_count: Option<u32>,
    /// Prescription type selected on the form (A, B, C, ...), if any.
    pub prescription_type: Option<String>,
}

impl PatientRecord {
    /// Name used in logs and reports; falls back to the row number.
    pub fn display_name(&self) -> String {
        match &self.identity {
            Some(name) => name.clone(),
            None => format!("<row {}>", self.row),
        }
    }
}

/// One row of the formulas sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaRecord {
    pub row: usize,
    /// Lookup key. Not guaranteed unique; the first occurrence wins.
    pub id: Option<CellValue>,
    /// Prescription body the composed text starts with.
    pub detail: Option<String>,
}

/// Everything a `RecordSource` produced for one run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedRecords {
    pub patients: Vec<PatientRecord>,
    pub formulas: Vec<FormulaRecord>,
}

/// The prescription text built for one patient. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrescription<'a> {
    pub composed_text: String,
    pub patient: &'a PatientRecord,
    pub formula: Option<&'a FormulaRecord>,
}

/// Login credentials for the remote application.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
