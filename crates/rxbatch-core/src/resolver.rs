//! Formula lookup and prescription text composition.

use rxbatch_contracts::{
    error::{RxError, RxResult},
    records::{CellValue, FormulaRecord, PatientRecord, ResolvedPrescription},
};

/// Maps a patient's formula reference onto the loaded formulas.
///
/// Lookup is a linear scan in load order and the first loosely equal id wins.
/// Spreadsheets routinely carry duplicate ids, so later duplicates are never
/// consulted.
#[derive(Debug, Clone, Copy)]
pub struct FormulaResolver<'a> {
    formulas: &'a [FormulaRecord],
}

impl<'a> FormulaResolver<'a> {
    pub fn new(formulas: &'a [FormulaRecord]) -> Self {
        Self { formulas }
    }

    /// Return the first formula whose id loosely equals `reference`.
    ///
    /// An absent reference, or a formula without an id, never matches.
    pub fn resolve(&self, reference: Option<&CellValue>) -> Option<&'a FormulaRecord> {
        let reference = reference?;
        self.formulas.iter().find(|formula| {
            formula
                .id
                .as_ref()
                .is_some_and(|id| id.loosely_equals(reference))
        })
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}

/// Build the prescription body: `"<detail> X<quantity>"`, followed by
/// `" <vials>)"` when `vial_count` is above zero.
///
/// The closing parenthesis without an opening one is what the remote form
/// expects operators to type, so it is reproduced as is.
pub fn compose_text(detail: &str, quantity: u32, vial_count: Option<u32>) -> String {
    let mut text = format!("{} X{}", detail, quantity);
    if let Some(vials) = vial_count.filter(|v| *v > 0) {
        text.push_str(&format!(" {})", vials));
    }
    text
}

/// Compose the prescription for `patient` from `formula`.
///
/// Fails with `MissingField` when the patient has no quantity or the formula
/// has no detail text.
pub fn compose_prescription<'a>(
    patient: &'a PatientRecord,
    formula: &'a FormulaRecord,
) -> RxResult<ResolvedPrescription<'a>> {
    let quantity = patient.quantity.ok_or_else(|| RxError::MissingField {
        row: patient.row,
        field: "quantity".to_string(),
    })?;
    let detail = formula.detail.as_deref().ok_or_else(|| RxError::MissingField {
        row: formula.row,
        field: "detail".to_string(),
    })?;

    Ok(ResolvedPrescription {
        composed_text: compose_text(detail, quantity, patient.vial_count),
        patient,
        formula: Some(formula),
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
