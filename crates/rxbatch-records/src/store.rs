//! Spreadsheet-backed `RecordSource`.
//!
//! Each workbook's first worksheet is read as a table: the first row of the
//! used range is the header, every following non-empty row is a record.
//! Columns are looked up by header name, so column order does not matter and
//! unknown columns are ignored. A missing column simply leaves that field
//! unset on every record.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{debug, warn};

use rxbatch_contracts::{
    error::{RxError, RxResult},
    records::{FormulaRecord, LoadedRecords, PatientRecord},
    settings::{FormulaColumns, PatientColumns},
};
use rxbatch_core::traits::RecordSource;

use crate::cell::{cell_count, cell_text, cell_value};

/// Reads patients and formulas from xlsx/xls/xlsb/ods workbooks.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetStore {
    patient_columns: PatientColumns,
    formula_columns: FormulaColumns,
}

impl SpreadsheetStore {
    pub fn new(patient_columns: PatientColumns, formula_columns: FormulaColumns) -> Self {
        Self {
            patient_columns,
            formula_columns,
        }
    }

    /// Read the patients workbook at `path`.
    pub fn load_patients(&self, path: &Path) -> RxResult<Vec<PatientRecord>> {
        let table = Table::from_range(&first_sheet(path)?);
        debug!(path = %path.display(), rows = table.len(), "patients sheet read");
        Ok(project_patients(&table, &self.patient_columns))
    }

    /// Read the formulas workbook at `path`.
    pub fn load_formulas(&self, path: &Path) -> RxResult<Vec<FormulaRecord>> {
        let table = Table::from_range(&first_sheet(path)?);
        debug!(path = %path.display(), rows = table.len(), "formulas sheet read");
        Ok(project_formulas(&table, &self.formula_columns))
    }
}

impl RecordSource for SpreadsheetStore {
    fn load(&self, patients: &Path, formulas: &Path) -> RxResult<LoadedRecords> {
        Ok(LoadedRecords {
            patients: self.load_patients(patients)?,
            formulas: self.load_formulas(formulas)?,
        })
    }
}

/// Open `path` and return the used range of its first worksheet.
fn first_sheet(path: &Path) -> RxResult<Range<Data>> {
    let unreadable = |reason: String| RxError::SourceUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| unreadable("workbook has no worksheets".to_string()))?;

    debug!(path = %path.display(), sheet = %name, "reading worksheet");
    workbook
        .worksheet_range(&name)
        .map_err(|e| unreadable(format!("worksheet '{}': {}", name, e)))
}

/// A header plus data rows, each tagged with its 1-based sheet row number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: HashMap<String, usize>,
    rows: Vec<(usize, Vec<Data>)>,
}

impl Table {
    /// Build a table from raw rows. `first_row` is the sheet row number of
    /// `raw[0]` (the header).
    pub fn from_rows(first_row: usize, raw: Vec<Vec<Data>>) -> Self {
        let mut iter = raw.into_iter();
        let Some(header) = iter.next() else {
            return Self::default();
        };

        let mut columns = HashMap::new();
        for (index, cell) in header.iter().enumerate() {
            if let Some(name) = cell_text(cell) {
                // First column wins when a header is repeated.
                columns.entry(name.trim().to_string()).or_insert(index);
            }
        }

        let rows = iter
            .enumerate()
            .map(|(offset, cells)| (first_row + 1 + offset, cells))
            .filter(|(_, cells)| cells.iter().any(|c| cell_value(c).is_some()))
            .collect();

        Self { columns, rows }
    }

    fn from_range(range: &Range<Data>) -> Self {
        let first_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
        let raw = range.rows().map(|r| r.to_vec()).collect();
        Self::from_rows(first_row, raw)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the header `name`. Surrounding whitespace is ignored on both
    /// sides.
    fn column(&self, name: &str) -> Option<usize> {
        let index = self.columns.get(name.trim()).copied();
        if index.is_none() {
            warn!(column = %name, "column not found in header; field will be empty");
        }
        index
    }
}

static EMPTY: Data = Data::Empty;

fn cell(cells: &[Data], index: Option<usize>) -> &Data {
    index.and_then(|i| cells.get(i)).unwrap_or(&EMPTY)
}

/// Project table rows onto `PatientRecord`s, preserving order.
pub fn project_patients(table: &Table, columns: &PatientColumns) -> Vec<PatientRecord> {
    let identity = table.column(&columns.identity);
    let formula_ref = table.column(&columns.formula_ref);
    let quantity = table.column(&columns.quantity);
    let vial_count = table.column(&columns.vial_count);
    let prescription_type = table.column(&columns.prescription_type);

    table
        .rows
        .iter()
        .map(|(row, cells)| PatientRecord {
            row: *row,
            identity: cell_text(cell(cells, identity)),
            formula_ref: cell_value(cell(cells, formula_ref)),
            quantity: cell_count(cell(cells, quantity), &columns.quantity, *row),
            vial_count: cell_count(cell(cells, vial_count), &columns.vial_count, *row),
            prescription_type: cell_text(cell(cells, prescription_type)),
        })
        .collect()
}

/// Project table rows onto `FormulaRecord`s, preserving order.
pub fn project_formulas(table: &Table, columns: &FormulaColumns) -> Vec<FormulaRecord> {
    let id = table.column(&columns.id);
    let detail = table.column(&columns.detail);

    table
        .rows
        .iter()
        .map(|(row, cells)| FormulaRecord {
            row: *row,
            id: cell_value(cell(cells, id)),
            detail: cell_text(cell(cells, detail)),
        })
        .collect()
}
